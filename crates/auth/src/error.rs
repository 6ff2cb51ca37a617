use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Auth errors for the feedrecords_auth crate.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer header and no token cookie on the request.
    #[error("no token provided")]
    MissingToken,

    /// Signature, claims or shape of the token are not acceptable.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The signing keys could not be fetched from the identity provider.
    #[error("failed to fetch signing keys: {0}")]
    Jwks(#[from] reqwest::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Unauthorized: No token provided"),
            AuthError::InvalidToken(_) | AuthError::Jwt(_) => {
                tracing::debug!(error = %self, "Rejected token");
                (StatusCode::UNAUTHORIZED, "Unauthorized: Invalid token")
            }
            AuthError::Jwks(_) => {
                tracing::error!(error = %self, "Identity provider error");
                (StatusCode::BAD_GATEWAY, "Authentication provider error")
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
