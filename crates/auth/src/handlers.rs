//! HTTP handlers for auth routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::AuthState;

/// Body of `POST /auth/verify-token`.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyTokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Creates the auth router.
///
/// Routes:
/// - `POST /auth/verify-token` - Verify an ID token and store it in the token cookie
/// - `POST /auth/logout` - Clear the token cookie
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/verify-token", post(verify_token))
        .route("/auth/logout", post(logout))
}

async fn verify_token(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(request): Json<VerifyTokenRequest>,
) -> Response {
    let Some(token) = request.token.filter(|t| !t.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Token is required" })),
        )
            .into_response();
    };

    match state.verify(&token).await {
        Ok(claims) => {
            tracing::info!(sub = %claims.sub, "Token verified");

            let cookie = Cookie::build((state.config.cookie_name.clone(), token))
                .path("/")
                .http_only(true)
                .secure(state.config.cookie_secure)
                .same_site(SameSite::Strict)
                .max_age(time::Duration::seconds(
                    state.config.cookie_max_age.as_secs() as i64,
                ))
                .build();

            (jar.add(cookie), Json(json!({ "success": true }))).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token verification failed");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid token" })),
            )
                .into_response()
        }
    }
}

async fn logout(State(state): State<AuthState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(state.config.cookie_name.clone()).path("/"));
    (
        jar,
        Json(json!({ "success": true, "message": "Successfully logged out" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::AuthConfig;
    use crate::error::AuthError;
    use crate::verifier::{Claims, TokenVerifier};

    struct FixedVerifier;

    #[async_trait]
    impl TokenVerifier for FixedVerifier {
        async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
            match token {
                "good-token" => Ok(Claims::development()),
                _ => Err(AuthError::InvalidToken("unknown".to_string())),
            }
        }
    }

    fn app() -> Router {
        auth_routes().with_state(AuthState::with_verifier(
            AuthConfig::disabled(),
            Arc::new(FixedVerifier),
        ))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_verify_token_sets_cookie() {
        let response = app()
            .oneshot(post_json(
                "/auth/verify-token",
                json!({ "token": "good-token" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("swagger_token=good-token"));
        assert!(cookie.contains("HttpOnly"));
        assert_eq!(json_body(response).await, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_verify_token_requires_token() {
        let response = app()
            .oneshot(post_json("/auth/verify-token", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Token is required");
    }

    #[tokio::test]
    async fn test_verify_token_rejects_invalid_token() {
        let response = app()
            .oneshot(post_json("/auth/verify-token", json!({ "token": "forged" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get("set-cookie").is_none());
        assert_eq!(json_body(response).await["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .header("Cookie", "swagger_token=good-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("swagger_token="));
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(json_body(response).await["success"], true);
    }
}
