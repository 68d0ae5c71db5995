//! JWKS key cache
//!
//! Fetches the issuer's published key set and keeps it for a fixed TTL. A
//! lookup for an unknown `kid` forces one refetch so rotated keys are picked
//! up without waiting for expiry. Refetches are serialized and spaced at least
//! [`MIN_REFRESH_INTERVAL`] apart.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Shortest gap between two fetches of the key set
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    Fetch(String),

    #[error("No signing key with kid '{0}'")]
    UnknownKey(String),

    #[error("Unusable signing key: {0}")]
    InvalidKey(String),
}

impl From<reqwest::Error> for JwksError {
    fn from(err: reqwest::Error) -> Self {
        JwksError::Fetch(err.to_string())
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

pub struct JwksCache {
    client: reqwest::Client,
    jwks_uri: String,
    ttl: Duration,
    cached: RwLock<Option<CachedKeys>>,
    /// Held while fetching; records when the last fetch was attempted
    last_attempt: Mutex<Option<Instant>>,
}

impl JwksCache {
    pub fn new(jwks_uri: String, ttl: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            jwks_uri,
            ttl,
            cached: RwLock::new(None),
            last_attempt: Mutex::new(None),
        }
    }

    /// Start with an already known key set
    pub fn with_keys(jwks_uri: String, ttl: Duration, keys: JwkSet) -> Self {
        Self {
            cached: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: Instant::now(),
            })),
            ..Self::new(jwks_uri, ttl)
        }
    }

    pub fn jwks_uri(&self) -> &str {
        &self.jwks_uri
    }

    /// Resolve the decoding key for `kid`
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        if let Some(key) = self.lookup(kid, true).await {
            return key;
        }

        let mut last_attempt = self.last_attempt.lock().await;

        // Another request may have refreshed while this one waited
        if let Some(key) = self.lookup(kid, true).await {
            return key;
        }

        let throttled = last_attempt.is_some_and(|at| at.elapsed() < MIN_REFRESH_INTERVAL);
        if throttled {
            tracing::debug!(kid = %kid, "JWKS refetch skipped, last attempt too recent");
        } else {
            *last_attempt = Some(Instant::now());
            self.refresh().await?;
        }
        drop(last_attempt);

        self.lookup(kid, false)
            .await
            .unwrap_or_else(|| Err(JwksError::UnknownKey(kid.to_string())))
    }

    async fn lookup(&self, kid: &str, fresh_only: bool) -> Option<Result<DecodingKey, JwksError>> {
        let cached = self.cached.read().await;
        let entry = cached.as_ref()?;
        if fresh_only && entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }

        let jwk = entry.keys.find(kid)?;
        Some(DecodingKey::from_jwk(jwk).map_err(|e| JwksError::InvalidKey(e.to_string())))
    }

    async fn refresh(&self) -> Result<(), JwksError> {
        tracing::debug!(uri = %self.jwks_uri, "Fetching JWKS");

        let keys = self
            .client
            .get(&self.jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;

        tracing::info!(keys = keys.keys.len(), "JWKS refreshed");

        *self.cached.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}
