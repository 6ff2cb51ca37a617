//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::{AuthConfig, AuthMode};
use crate::error::AuthError;
use crate::verifier::{Claims, CognitoVerifier, TokenVerifier};

/// Shared state for auth handlers and extractors.
#[derive(Clone)]
pub struct AuthState {
    /// `None` while verification is disabled.
    verifier: Option<Arc<dyn TokenVerifier>>,
    pub config: AuthConfig,
}

impl AuthState {
    /// Creates the state for `config`, building a Cognito verifier when enabled.
    pub fn new(config: AuthConfig) -> Self {
        let verifier: Option<Arc<dyn TokenVerifier>> = match &config.mode {
            AuthMode::Cognito(cognito) => {
                tracing::info!(
                    issuer = %cognito.issuer(),
                    client_id = %cognito.app_client_id,
                    "Token verification enabled"
                );
                Some(Arc::new(CognitoVerifier::new(cognito.clone())))
            }
            AuthMode::Disabled { reason } => {
                tracing::warn!(reason, "Token verification is DISABLED");
                None
            }
        };

        Self { verifier, config }
    }

    /// Creates the state with a custom verifier.
    pub fn with_verifier(config: AuthConfig, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            verifier: Some(verifier),
            config,
        }
    }

    /// State that lets every request through.
    pub fn disabled() -> Self {
        Self {
            verifier: None,
            config: AuthConfig::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.verifier.is_some()
    }

    /// Verifies `token`; any token is accepted while verification is disabled.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        match &self.verifier {
            Some(verifier) => verifier.verify(token).await,
            None => Ok(Claims::development()),
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
