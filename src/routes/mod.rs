//! Route definitions for the loans API

mod catalogue;
mod loan;

use axum::{routing::get, Router};

use crate::handlers::health_check;
use crate::middleware;
use crate::state::AppState;

pub use catalogue::catalogue_routes;
pub use loan::loan_routes;

/// Assemble the full application router
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(loan_routes())
        .merge(catalogue_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}
