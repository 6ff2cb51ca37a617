//! Runtime administration: inspect and change the log level.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feedrecords_auth::CurrentUser;
use serde::Deserialize;
use serde_json::json;

use crate::handlers::AppError;
use crate::logging::LogLevelError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogLevelRequest {
    #[serde(default)]
    pub level: Option<String>,
}

/// GET /api/admin/log-level
#[axum::debug_handler]
pub async fn get_log_level(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> impl IntoResponse {
    Json(json!({ "level": state.log_level.current() }))
}

/// POST /api/admin/log-level - Switch the level without a restart.
#[axum::debug_handler]
pub async fn set_log_level(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<LogLevelRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body?;
    let requested = request.level.unwrap_or_default();

    match state.log_level.set(&requested) {
        Ok(level) => {
            tracing::info!(%level, user = %user.sub, "Log level changed");
            Ok(Json(json!({ "message": format!("Log level changed to {level}") })).into_response())
        }
        Err(e @ LogLevelError::Unknown(_)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "Invalid log level",
                "error": e.to_string(),
            })),
        )
            .into_response()),
        Err(e) => Err(AppError::new("Error changing log level", e)),
    }
}
