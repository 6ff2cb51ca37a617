//! ID token verification against a Cognito user pool.
//!
//! Tokens must be RS256, signed by a key from the pool's JWKS, issued by the
//! pool, addressed to the app client and carry `token_use = id`. The key set
//! is fetched lazily, cached for the life of the process and refreshed
//! when a token names a `kid` the cache does not hold (key rotation), at most
//! once per [`MIN_REFRESH_INTERVAL`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::CognitoConfig;
use crate::error::AuthError;

/// Claims of a verified ID token that the application cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "cognito:username", default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token_use: Option<String>,
}

impl Claims {
    /// Identity used for every request while verification is disabled.
    pub fn development() -> Self {
        Self {
            sub: "development".to_string(),
            email: None,
            username: Some("development".to_string()),
            token_use: None,
        }
    }
}

/// Verifies a bearer token and returns its claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Unknown key ids do not trigger another JWKS fetch within this window.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
struct KeyCache {
    keys: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn find(&self, kid: &str) -> Option<Jwk> {
        self.keys.as_ref().and_then(|jwks| jwks.find(kid)).cloned()
    }

    fn is_fresh(&self, now: Instant) -> bool {
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) < MIN_REFRESH_INTERVAL)
    }
}

/// [`TokenVerifier`] backed by a Cognito user pool.
pub struct CognitoVerifier {
    client: reqwest::Client,
    config: CognitoConfig,
    cache: RwLock<KeyCache>,
}

impl CognitoVerifier {
    pub fn new(config: CognitoConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            cache: RwLock::new(KeyCache::default()),
        }
    }

    /// Creates a verifier with an already known key set.
    pub fn with_jwks(config: CognitoConfig, jwks: JwkSet) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            cache: RwLock::new(KeyCache {
                keys: Some(jwks),
                fetched_at: Some(Instant::now()),
            }),
        }
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let url = self.config.jwks_url();
        tracing::debug!(%url, "Fetching signing keys");

        let jwks = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(jwks)
    }

    async fn signing_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let unknown = || AuthError::InvalidToken(format!("unknown key id {kid}"));

        if let Some(key) = self.cache.read().await.find(kid) {
            return Ok(key);
        }

        // Refreshes are serialized; a waiter sees the keys its predecessor fetched.
        let mut cache = self.cache.write().await;
        if let Some(key) = cache.find(kid) {
            return Ok(key);
        }
        if cache.is_fresh(Instant::now()) {
            tracing::debug!(kid, "Unknown key id, signing keys refreshed recently");
            return Err(unknown());
        }

        let jwks = self.fetch_jwks().await?;
        cache.keys = Some(jwks);
        cache.fetched_at = Some(Instant::now());
        cache.find(kid).ok_or_else(unknown)
    }
}

#[async_trait]
impl TokenVerifier for CognitoVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing key id".to_string()))?;

        let jwk = self.signing_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[self.config.app_client_id.as_str()]);

        let claims = decode::<Claims>(token, &key, &validation)?.claims;
        if claims.token_use.as_deref() != Some("id") {
            return Err(AuthError::InvalidToken("not an id token".to_string()));
        }

        Ok(claims)
    }
}
