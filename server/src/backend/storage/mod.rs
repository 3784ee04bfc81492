//! # Storage Module
//!
//! The record store for students, transactions, daily logs and parent accounts.
//!
//! - **traits**: storage abstractions the domain layer is written against
//! - **connection**: the SQLite pool, schema setup and repository factories
//! - **repositories**: one repository per collection plus the ledger, which owns
//!   every write that changes a balance
//! - **events**: the real-time change feed published after each committed write

pub mod connection;
pub mod events;
pub mod repositories;
pub mod traits;

pub use connection::DbConnection;
pub use events::{Collection, EventHub, Record, RecordAction, RecordEvent, Subscription, SubscriptionError};
pub use traits::*;
