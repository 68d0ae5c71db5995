//! Centralized API error handling for the loans service
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping and JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::loan::{LedgerError, Loan};

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Conflict caused by an open loan on the requested device
    #[error("{message}")]
    DeviceUnavailable {
        message: String,
        existing_loan: Box<Loan>,
    },

    #[error("{0}")]
    InternalError(String),
}

/// JSON error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_loan: Option<Loan>,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "INVALID_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) | ApiError::DeviceUnavailable { .. } => "CONFLICT",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::DeviceUnavailable { .. } => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        // Log server errors
        if status.is_server_error() {
            tracing::error!(error = %message, code = %code, "Server error occurred");
        } else {
            tracing::debug!(error = %message, code = %code, "Client error occurred");
        }

        let existing_loan = match self {
            ApiError::DeviceUnavailable { existing_loan, .. } => Some(*existing_loan),
            _ => None,
        };

        let body = ErrorResponse {
            error: message,
            code,
            existing_loan,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InvalidRequest => ApiError::BadRequest(message),
            LedgerError::NotFound(_) => ApiError::NotFound(message),
            LedgerError::DeviceUnavailable { existing_loan } => ApiError::DeviceUnavailable {
                message,
                existing_loan,
            },
            LedgerError::ReservationInProgress { .. }
            | LedgerError::AlreadyReturned(_)
            | LedgerError::AlreadyCollected(_) => ApiError::Conflict(message),
            LedgerError::InvalidSeed(_) => ApiError::InternalError(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::MissingToken => ApiError::Unauthorized(message),
            AuthError::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "Token rejected");
                ApiError::Unauthorized(message)
            }
            AuthError::Forbidden => ApiError::Forbidden(message),
            AuthError::Misconfigured(reason) => {
                tracing::error!(reason = %reason, "Token verification is not configured");
                ApiError::InternalError(message)
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!(error = %err, "Rejected request body");
        ApiError::BadRequest("Invalid JSON body".to_string())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;
