//! Campus device loans service
//!
//! Reservation, collection and return of campus devices, with a per-device
//! guard against double booking and role-checked staff transitions.

pub mod auth;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod handlers;
pub mod loan;
pub mod middleware;
pub mod routes;
pub mod state;
