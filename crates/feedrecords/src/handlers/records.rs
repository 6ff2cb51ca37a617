//! Record handlers.
//!
//! Thin adapters between HTTP and [`RecordService`](crate::service::RecordService).
//! Every route requires an authenticated caller.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use feedrecords_auth::CurrentUser;
use feedrecords_core::pagination::{PageLimit, RecordFilter};
use feedrecords_core::record::{
    BatchDeleteRequest, CreateRecordRequest, DeleteRecordRequest, SearchQuery,
    UpdateProcessedStatusRequest,
};
use serde::Deserialize;
use serde_json::json;

use crate::handlers::AppError;
use crate::state::AppState;

/// Query parameters for the sorted listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub limit: Option<String>,
    pub next_token: Option<String>,
}

/// Query parameters for the filtered listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub feed: Option<String>,
    pub operation: Option<String>,
    pub status: Option<String>,
    pub worker: Option<String>,
    pub limit: Option<String>,
    pub next_token: Option<String>,
}

impl FilterQuery {
    fn filter(&self) -> RecordFilter {
        RecordFilter::from_raw(
            self.feed.as_deref(),
            self.operation.as_deref(),
            self.status.as_deref(),
            self.worker.as_deref(),
        )
    }
}

/// POST /api/records - Create a record.
#[axum::debug_handler]
pub async fn create_record(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    body: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;

    let record = state
        .records
        .create_record(request)
        .await
        .map_err(|e| AppError::new("Error creating record", e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Record created successfully",
            "data": record,
        })),
    ))
}

/// GET /api/records - List records, newest first.
#[axum::debug_handler]
pub async fn list_records(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = PageLimit::parse(query.limit.as_deref())?;

    let page = state
        .records
        .list_records(limit, query.next_token.as_deref())
        .await
        .map_err(|e| AppError::new("Error fetching records", e))?;

    Ok(Json(page))
}

/// GET /api/records/filter - List records matching the supplied filters, newest first.
#[axum::debug_handler]
pub async fn list_filtered_records(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = PageLimit::parse(query.limit.as_deref())?;

    let page = state
        .records
        .list_filtered_records(query.filter(), limit, query.next_token.as_deref())
        .await
        .map_err(|e| AppError::new("Error fetching filtered records", e))?;

    Ok(Json(page))
}

/// DELETE /api/records - Delete one record.
#[axum::debug_handler]
pub async fn delete_record(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    body: Result<Json<DeleteRecordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;

    state
        .records
        .delete_record(request)
        .await
        .map_err(|e| AppError::new("Error deleting record", e))?;

    Ok(Json(json!({ "message": "Record deleted successfully" })))
}

/// DELETE /api/records/batchdelete - Delete many records.
#[axum::debug_handler]
pub async fn batch_delete_records(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    body: Result<Json<BatchDeleteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;

    let deleted = state
        .records
        .batch_delete_records(request)
        .await
        .map_err(|e| AppError::new("Error deleting records", e))?;

    Ok(Json(json!({
        "message": format!("{deleted} records deleted successfully"),
    })))
}

/// PATCH /api/records/processed-status - Set the processed flag of a record.
#[axum::debug_handler]
pub async fn update_processed_status(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    body: Result<Json<UpdateProcessedStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;

    let record = state
        .records
        .update_processed_status(request)
        .await
        .map_err(|e| AppError::new("Error updating record processed status", e))?;

    Ok(Json(json!({
        "message": "Record processed status updated successfully",
        "data": record,
    })))
}

/// GET /api/records/search - Find every record of a person.
#[axum::debug_handler]
pub async fn search_records(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = state
        .records
        .search_by_person_id(query)
        .await
        .map_err(|e| AppError::new("Error searching records", e))?;

    Ok(Json(json!({
        "message": format!("Found {} records", records.len()),
        "data": records,
    })))
}
