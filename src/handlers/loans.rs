//! Loan-related API handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{AuthenticatedUser, StaffUser};
use crate::error::ApiResult;
use crate::loan::{AdvanceTarget, LoanId, LoanResponse, LoansResponse, ReserveRequest};
use crate::state::AppState;

/// GET /api/loans - List every loan
pub async fn list_loans(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Json<LoansResponse> {
    Json(LoansResponse {
        loans: state.ledger.list_loans().await,
    })
}

/// POST /api/reservations - Reserve a device
///
/// The body is parsed as JSON whatever `Content-Type` the client sent.
pub async fn create_reservation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<LoanResponse>)> {
    let req: ReserveRequest = serde_json::from_slice(&body)?;

    tracing::debug!(subject = ?user.subject, "Reservation requested");

    let loan = state
        .ledger
        .reserve(
            req.device_id.as_deref().unwrap_or_default(),
            req.student_id.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(LoanResponse { loan, event: None })))
}

/// POST /api/loans/:loan_id/collected - Record that the device was picked up
pub async fn mark_collected(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(loan_id): Path<String>,
) -> ApiResult<Json<LoanResponse>> {
    let outcome = state
        .ledger
        .advance_status(&LoanId::from(loan_id), AdvanceTarget::Collected)
        .await?;

    Ok(Json(outcome.into()))
}

/// POST /api/loans/:loan_id/returned - Record that the device came back
pub async fn mark_returned(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(loan_id): Path<String>,
) -> ApiResult<Json<LoanResponse>> {
    let outcome = state
        .ledger
        .advance_status(&LoanId::from(loan_id), AdvanceTarget::Returned)
        .await?;

    Ok(Json(outcome.into()))
}
