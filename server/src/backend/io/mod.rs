//! # IO Module
//!
//! Adapter layer between HTTP clients (kiosk, parent portal, admin screen) and the
//! domain services. Translates JSON DTOs from the `shared` crate into domain
//! commands and domain results and errors back into HTTP responses.

pub mod rest;
