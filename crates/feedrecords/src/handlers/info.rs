//! Service metadata endpoints.

use axum::{
    extract::State,
    http::{header::HOST, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::AppState;

/// GET /api/info - Name, version and environment of the running service.
#[axum::debug_handler]
pub async fn info(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "environment": state.config.environment,
        "documentation": format!("{scheme}://{host}/api-docs"),
    }))
}

/// GET /api/environment
#[axum::debug_handler]
pub async fn environment(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "NODE_ENV": state.config.environment }))
}

/// GET /api/config/table-name - 404 when no table is configured.
#[axum::debug_handler]
pub async fn table_name(State(state): State<AppState>) -> Response {
    match &state.config.table_name {
        Some(table_name) => Json(json!({ "tableName": table_name })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "TABLE_NAME environment variable is not set" })),
        )
            .into_response(),
    }
}
