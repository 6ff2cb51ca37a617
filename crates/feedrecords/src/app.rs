use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{delete, get, patch},
    Router,
};
use feedrecords_auth::auth_routes;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        admin::{get_log_level, set_log_level},
        health::livez,
        info::{environment, info, table_name},
        records::{
            batch_delete_records, create_record, delete_record, list_filtered_records,
            list_records, search_records, update_processed_status,
        },
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api_routes = Router::new()
        // Record routes
        .route(
            "/records",
            get(list_records).post(create_record).delete(delete_record),
        )
        .route("/records/filter", get(list_filtered_records))
        .route("/records/search", get(search_records))
        .route("/records/batchdelete", delete(batch_delete_records))
        .route("/records/processed-status", patch(update_processed_status))
        // Service metadata
        .route("/info", get(info))
        .route("/environment", get(environment))
        .route("/config/table-name", get(table_name))
        // Administration
        .route("/admin/log-level", get(get_log_level).post(set_log_level))
        .merge(auth_routes().with_state(state.auth.clone()))
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
