//! Middleware for the loans API
//!
//! Request tracing and the role-checking auth extractors.

pub mod auth;
mod tracing;

pub use auth::{AuthenticatedUser, StaffUser, BORROWER_ROLES, STAFF_ROLES};
pub use self::tracing::request_tracing;
