//! Bearer-token authentication for feedrecords.
//!
//! This crate provides:
//! - Verification of Cognito ID tokens against the user pool's JWKS
//! - An axum extractor reading the token from the `Authorization` header or
//!   the `swagger_token` cookie
//! - Routes to verify a token into that cookie and to clear it

mod config;
mod error;
mod extractors;
mod handlers;
mod state;
mod verifier;

pub use config::{AuthConfig, AuthMode, CognitoConfig, TOKEN_COOKIE_NAME};
pub use error::AuthError;
pub use extractors::CurrentUser;
pub use handlers::auth_routes;
pub use state::AuthState;
pub use verifier::{Claims, CognitoVerifier, TokenVerifier};
