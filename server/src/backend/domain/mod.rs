//! # Domain Module
//!
//! Business logic of the meal-credit system, independent of HTTP and of the
//! concrete record store.
//!
//! ## Module Organization
//!
//! - **kiosk_service**: PIN redemption at the dining hall
//! - **kiosk_flow**: PIN pad buffer and kiosk screen outcomes
//! - **top_up_service**: parent top-ups and amount validation
//! - **pin_service**: unique PIN issuance
//! - **student_service**: enrolment, medical notes, children summary, meal history
//! - **auth_service** / **session**: parent accounts and explicit session context
//! - **redemption_feed**: admin dashboard state and the live feed reducer
//!
//! ## Business Rules
//!
//! - A balance is a whole number of meals and never goes below zero
//! - Every redemption spends exactly one meal and writes exactly one daily log
//! - Every top-up writes exactly one immutable transaction
//! - A PIN identifies at most one student
//! - Parents only see and change their own children

pub mod auth_service;
pub mod commands;
pub mod errors;
pub mod kiosk_flow;
pub mod kiosk_service;
pub mod models;
pub mod pin_service;
pub mod redemption_feed;
pub mod session;
pub mod student_service;
pub mod top_up_service;

pub use auth_service::AuthService;
pub use errors::{DomainError, DomainResult};
pub use kiosk_flow::{KioskOutcome, OutcomeStatus, PadAction, PinPad};
pub use kiosk_service::KioskService;
pub use pin_service::{PinGenerator, PinService, RandomPinGenerator};
pub use redemption_feed::{AdminService, LiveFeed, SharedLiveFeed};
pub use session::{SessionContext, SessionStore};
pub use student_service::StudentService;
pub use top_up_service::{TopUpAmount, TopUpService};
