//! Authentication service
//!
//! Verifies bearer tokens and decides whether the caller holds one of the
//! roles an operation requires.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

use super::jwks::{JwksCache, JwksError};
use super::jwt::{build_validation, key_id, verify_token, JwtError};
use super::roles::{Role, RoleSet};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Auth misconfigured")]
    Misconfigured(String),
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::InvalidToken(e.to_string())
    }
}

impl From<JwksError> for AuthError {
    fn from(e: JwksError) -> Self {
        AuthError::InvalidToken(e.to_string())
    }
}

/// Verified caller identity
#[derive(Debug, Clone)]
pub struct Principal {
    pub subject: Option<String>,
    pub roles: RoleSet,
}

enum KeySource {
    /// RS256 keys published by the identity provider
    Jwks(JwksCache),
    /// HS256 shared secret for local development
    SharedSecret(DecodingKey),
}

/// Authentication service
pub struct AuthService {
    keys: Option<KeySource>,
    validation: Validation,
    role_claim: String,
}

impl AuthService {
    /// Verify tokens against the provider's JWKS
    pub fn with_jwks(
        jwks: JwksCache,
        issuer: &str,
        audience: Option<&str>,
        role_claim: String,
    ) -> Self {
        Self {
            keys: Some(KeySource::Jwks(jwks)),
            validation: build_validation(Algorithm::RS256, Some(issuer), audience),
            role_claim,
        }
    }

    /// Verify tokens with a shared HS256 secret
    pub fn with_shared_secret(
        secret: &str,
        issuer: Option<&str>,
        audience: Option<&str>,
        role_claim: String,
    ) -> Self {
        Self {
            keys: Some(KeySource::SharedSecret(DecodingKey::from_secret(
                secret.as_bytes(),
            ))),
            validation: build_validation(Algorithm::HS256, issuer, audience),
            role_claim,
        }
    }

    /// Every authenticated request fails with [`AuthError::Misconfigured`]
    pub fn unconfigured(role_claim: String) -> Self {
        Self {
            keys: None,
            validation: Validation::default(),
            role_claim,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let role_claim = config.role_claim.clone();

        if let Some(domain) = &config.auth_domain {
            let jwks = JwksCache::new(
                format!("https://{}/.well-known/jwks.json", domain),
                Duration::from_secs(config.jwks_cache_ttl_seconds),
            );
            tracing::info!(jwks_uri = %jwks.jwks_uri(), "Verifying tokens against JWKS");
            return Self::with_jwks(
                jwks,
                &format!("https://{}/", domain),
                config.auth_audience.as_deref(),
                role_claim,
            );
        }

        if let Some(secret) = &config.auth_dev_secret {
            tracing::warn!("AUTH_DOMAIN not set, verifying tokens with the development secret");
            return Self::with_shared_secret(
                secret,
                None,
                config.auth_audience.as_deref(),
                role_claim,
            );
        }

        tracing::warn!("No token verifier configured; authenticated routes will fail");
        Self::unconfigured(role_claim)
    }

    /// Verify a bearer token and normalize its roles
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = match &self.keys {
            None => {
                return Err(AuthError::Misconfigured(
                    "no JWKS domain or development secret".to_string(),
                ))
            }
            Some(KeySource::SharedSecret(key)) => verify_token(token, key, &self.validation)?,
            Some(KeySource::Jwks(jwks)) => {
                let kid = key_id(token)?;
                let key = jwks.decoding_key(&kid).await?;
                verify_token(token, &key, &self.validation)?
            }
        };

        Ok(Principal {
            subject: claims
                .get("sub")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            roles: RoleSet::from_claim(claims.get(&self.role_claim)),
        })
    }

    /// Check that the caller holds at least one of `required`
    pub fn authorize(principal: &Principal, required: &[Role]) -> Result<(), AuthError> {
        if principal.roles.has_any(required) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const ROLE_CLAIM: &str = "https://cnd.example/roles";

    fn service() -> AuthService {
        AuthService::with_shared_secret("dev-secret", None, None, ROLE_CLAIM.to_string())
    }

    fn token(claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap()
    }

    fn exp() -> i64 {
        Utc::now().timestamp() + 600
    }

    #[tokio::test]
    async fn test_authenticate_extracts_roles() {
        let t = token(json!({"sub": "auth0|s1", "exp": exp(), ROLE_CLAIM: ["student"]}));

        let principal = service().authenticate(&t).await.unwrap();
        assert_eq!(principal.subject.as_deref(), Some("auth0|s1"));
        assert!(principal.roles.contains(Role::Student));
        assert!(AuthService::authorize(&principal, &[Role::Student, Role::Staff]).is_ok());
        assert!(matches!(
            AuthService::authorize(&principal, &[Role::Staff]),
            Err(AuthError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_string_role_claim() {
        let t = token(json!({"exp": exp(), ROLE_CLAIM: "staff"}));

        let principal = service().authenticate(&t).await.unwrap();
        assert!(principal.subject.is_none());
        assert!(AuthService::authorize(&principal, &[Role::Staff]).is_ok());
    }

    #[tokio::test]
    async fn test_no_role_claim_is_forbidden() {
        let t = token(json!({"sub": "u", "exp": exp()}));

        let principal = service().authenticate(&t).await.unwrap();
        assert!(principal.roles.is_empty());
        assert!(AuthService::authorize(&principal, &[Role::Student]).is_err());
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let err = service().authenticate("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
        assert_eq!(err.to_string(), "Invalid token");
    }

    #[tokio::test]
    async fn test_blank_token() {
        let err = service().authenticate("   ").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_unconfigured_service() {
        let t = token(json!({"exp": exp(), ROLE_CLAIM: "staff"}));

        let err = AuthService::unconfigured(ROLE_CLAIM.to_string())
            .authenticate(&t)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Misconfigured(_)));
    }

    #[tokio::test]
    async fn test_jwks_requires_key_id() {
        let jwks = JwksCache::new(
            "http://127.0.0.1:9/.well-known/jwks.json".to_string(),
            Duration::from_secs(600),
        );
        let service =
            AuthService::with_jwks(jwks, "https://issuer/", None, ROLE_CLAIM.to_string());

        let t = token(json!({"exp": exp(), ROLE_CLAIM: "staff"}));
        let err = service.authenticate(&t).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
