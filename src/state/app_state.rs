//! Application state shared across handlers

use std::sync::Arc;

use crate::auth::AuthService;
use crate::catalogue::Catalogue;
use crate::loan::LoanLedger;

use axum::extract::FromRef;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LoanLedger>,
    pub auth_service: Arc<AuthService>,
    pub catalogue: Arc<Catalogue>,
}

impl AppState {
    pub fn new(
        ledger: Arc<LoanLedger>,
        auth_service: Arc<AuthService>,
        catalogue: Arc<Catalogue>,
    ) -> Self {
        Self {
            ledger,
            auth_service,
            catalogue,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}
