//! Catalogue route definitions

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::state::AppState;

pub fn catalogue_routes() -> Router<AppState> {
    Router::new().route("/api/devices", get(list_devices))
}
