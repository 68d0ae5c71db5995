//! Device catalogue handlers

use axum::{extract::State, Json};

use crate::catalogue::DevicesResponse;
use crate::state::AppState;

/// GET /api/devices - List lendable devices
pub async fn list_devices(State(state): State<AppState>) -> Json<DevicesResponse> {
    Json(DevicesResponse {
        devices: state.catalogue.devices().to_vec(),
    })
}
