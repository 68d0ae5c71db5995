//! JWT validation
//!
//! Signature and registered-claim checks. Claims are decoded into an open
//! JSON map because the role claim name is configurable.

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

/// Decoded token claims
pub type Claims = Map<String, Value>;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Malformed token header: {0}")]
    MalformedHeader(String),

    #[error("Token header has no key id")]
    MissingKeyId,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token decoding failed: {0}")]
    DecodingFailed(String),
}

/// Build the validation rules for a key source
pub fn build_validation(
    algorithm: Algorithm,
    issuer: Option<&str>,
    audience: Option<&str>,
) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;

    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }
    match audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    validation
}

/// Read the `kid` from an unverified token header
pub fn key_id(token: &str) -> Result<String, JwtError> {
    let header = decode_header(token).map_err(|e| JwtError::MalformedHeader(e.to_string()))?;
    header.kid.ok_or(JwtError::MissingKeyId)
}

/// Verify and decode a JWT token
///
/// # Returns
/// * `Ok(Claims)` if signature and registered claims are valid
/// * `Err(JwtError)` otherwise
pub fn verify_token(
    token: &str,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<Claims, JwtError> {
    let token_data = decode::<Claims>(token, key, validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::DecodingFailed(e.to_string()),
        }
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token(secret: &str, claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn exp_in(seconds: i64) -> i64 {
        Utc::now().timestamp() + seconds
    }

    #[test]
    fn test_verify_valid_token() {
        let t = token(
            "secret",
            json!({"sub": "u1", "exp": exp_in(600), "iss": "https://issuer/", "aud": "loans"}),
        );
        let validation = build_validation(Algorithm::HS256, Some("https://issuer/"), Some("loans"));

        let claims = verify_token(&t, &DecodingKey::from_secret(b"secret"), &validation).unwrap();
        assert_eq!(claims["sub"], "u1");
    }

    #[test]
    fn test_wrong_secret() {
        let t = token("secret1", json!({"sub": "u1", "exp": exp_in(600)}));
        let validation = build_validation(Algorithm::HS256, None, None);

        let result = verify_token(&t, &DecodingKey::from_secret(b"secret2"), &validation);
        assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
    }

    #[test]
    fn test_expired_token() {
        let t = token("secret", json!({"sub": "u1", "exp": exp_in(-3600)}));
        let validation = build_validation(Algorithm::HS256, None, None);

        let result = verify_token(&t, &DecodingKey::from_secret(b"secret"), &validation);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_wrong_audience() {
        let t = token("secret", json!({"sub": "u1", "exp": exp_in(600), "aud": "other"}));
        let validation = build_validation(Algorithm::HS256, None, Some("loans"));

        assert!(verify_token(&t, &DecodingKey::from_secret(b"secret"), &validation).is_err());
    }

    #[test]
    fn test_key_id() {
        let mut header = Header::default();
        header.kid = Some("key-1".to_string());
        let t = encode(
            &header,
            &json!({"exp": exp_in(600)}),
            &EncodingKey::from_secret(b"s"),
        )
        .unwrap();
        assert_eq!(key_id(&t).unwrap(), "key-1");

        let without = token("s", json!({"exp": exp_in(600)}));
        assert!(matches!(key_id(&without), Err(JwtError::MissingKeyId)));
        assert!(key_id("garbage").is_err());
    }
}
