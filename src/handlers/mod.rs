//! API handlers for the loans service

pub mod catalogue;
pub mod health;
pub mod loans;

pub use catalogue::list_devices;
pub use health::health_check;
pub use loans::*;

// Re-export the auth extractors for handler use
pub use crate::middleware::auth::{AuthenticatedUser, StaffUser};
