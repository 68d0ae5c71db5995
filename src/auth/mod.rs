//! Authentication module
//!
//! Bearer token verification for the loans API.
//! - RS256 verification against the identity provider's JWKS
//! - HS256 shared-secret mode for local development
//! - Role claim normalization and role checks

mod jwks;
mod jwt;
mod roles;
mod service;

pub use jwks::{JwksCache, JwksError};
pub use jwt::{build_validation, verify_token, Claims, JwtError};
pub use roles::{Role, RoleSet};
pub use service::{AuthError, AuthService, Principal};
