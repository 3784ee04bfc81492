//! # REST API Interface Layer
//!
//! HTTP endpoints for the kiosk, the parent portal and the admin dashboard.
//!
//! - **error**: domain error to status code and JSON body
//! - **auth**: bearer-token session extractor for parent-scoped routes
//! - **\*_apis**: one router per resource, nested under `/api`
//! - **mappers**: domain models to `shared` DTOs

pub mod admin_apis;
pub mod auth;
pub mod error;
pub mod kiosk_apis;
pub mod logging_apis;
pub mod mappers;
pub mod parent_apis;
pub mod student_apis;
pub mod top_up_apis;
