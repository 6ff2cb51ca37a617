//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;

use crate::error::AuthError;
use crate::verifier::Claims;
use crate::AuthState;

/// Reads the token from `Authorization: Bearer`, falling back to the token cookie.
fn request_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Extractor for an authenticated caller. Rejects with 401 otherwise.
///
/// While verification is disabled every request gets [`Claims::development`].
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        if !auth_state.is_enabled() {
            return Ok(CurrentUser(Claims::development()));
        }

        let token =
            request_token(parts, &auth_state.config.cookie_name).ok_or(AuthError::MissingToken)?;

        let claims = auth_state.verify(&token).await.inspect_err(|e| {
            tracing::warn!(error = %e, path = %parts.uri.path(), "Token verification failed");
        })?;

        Ok(CurrentUser(claims))
    }
}
