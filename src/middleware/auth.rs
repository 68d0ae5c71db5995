//! Authentication middleware
//!
//! Extractors that verify the bearer token and enforce the roles a route
//! requires. Handlers take one of them as an argument.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::auth::{AuthError, AuthService, Principal, Role, RoleSet};
use crate::error::ApiError;

/// Roles allowed to browse and reserve
pub const BORROWER_ROLES: &[Role] = &[Role::Student, Role::Staff];

/// Roles allowed to hand devices out and take them back
pub const STAFF_ROLES: &[Role] = &[Role::Staff];

/// Caller holding the student or staff role
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub subject: Option<String>,
    pub roles: RoleSet,
}

impl From<Principal> for AuthenticatedUser {
    fn from(principal: Principal) -> Self {
        Self {
            subject: principal.subject,
            roles: principal.roles,
        }
    }
}

/// Caller holding the staff role
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthenticatedUser);

async fn authorize_request<S>(
    parts: &mut Parts,
    state: &S,
    required: &[Role],
) -> Result<Principal, ApiError>
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthError::MissingToken)?;

    let auth_service = Arc::<AuthService>::from_ref(state);
    let principal = auth_service.authenticate(bearer.token()).await?;

    if let Err(e) = AuthService::authorize(&principal, required) {
        tracing::warn!(
            subject = ?principal.subject,
            roles = %principal.roles,
            path = %parts.uri.path(),
            "Caller lacks required role"
        );
        return Err(e.into());
    }

    Ok(principal)
}

/// Extractor for callers allowed to list loans and reserve devices
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, {:?}", user.subject)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize_request(parts, state, BORROWER_ROLES)
            .await
            .map(AuthenticatedUser::from)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize_request(parts, state, STAFF_ROLES)
            .await
            .map(|p| StaffUser(p.into()))
    }
}
