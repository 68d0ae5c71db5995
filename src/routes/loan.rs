//! Loan route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/loans", get(list_loans))
        .route("/api/reservations", post(create_reservation))
        .route("/api/loans/:loan_id/collected", post(mark_collected))
        .route("/api/loans/:loan_id/returned", post(mark_returned))
}
