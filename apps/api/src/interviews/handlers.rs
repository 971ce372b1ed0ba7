//! Axum route handlers for the interview records API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AppError, AppJson, AppQuery};
use crate::interviews::pagination::{ListParams, ListQuery};
use crate::interviews::validation::InterviewFields;
use crate::models::interview::Interview;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response envelopes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: Interview,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub data: Vec<Interview>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Ids that cannot name a record are reported exactly like missing ones.
fn parse_record_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::record_not_found())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/interviews
pub async fn handle_create(
    State(state): State<AppState>,
    AppJson(body): AppJson<InterviewFields>,
) -> Result<(StatusCode, Json<RecordResponse>), AppError> {
    let new = body.into_new()?;
    let record = state.store.insert(new).await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            success: true,
            message: Some("Interview record added successfully!"),
            data: record,
        }),
    ))
}

/// GET /api/interviews
pub async fn handle_list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<ListResponse>, AppError> {
    let query = ListQuery::from_params(params, state.config.max_page_limit);
    if query.is_filtered() {
        debug!("Listing interviews with filters {query:?}");
    }
    let page = state.store.list_page(&query).await?;
    Ok(Json(ListResponse {
        success: true,
        total: page.total,
        page: query.page,
        limit: query.limit,
        data: page.items,
    }))
}

/// GET /api/interviews/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordResponse>, AppError> {
    let id = parse_record_id(&id)?;
    let record = state
        .store
        .get_by_id(id)
        .await?
        .ok_or_else(AppError::record_not_found)?;
    Ok(Json(RecordResponse {
        success: true,
        message: None,
        data: record,
    }))
}

/// PUT /api/interviews/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<InterviewFields>,
) -> Result<Json<RecordResponse>, AppError> {
    let id = parse_record_id(&id)?;
    let patch = body.into_patch()?;
    if patch.is_empty() {
        debug!("Empty update for {id}; only updatedAt changes");
    }
    let record = state
        .store
        .update_by_id(id, patch)
        .await?
        .ok_or_else(AppError::record_not_found)?;
    Ok(Json(RecordResponse {
        success: true,
        message: Some("Interview record updated successfully!"),
        data: record,
    }))
}

/// DELETE /api/interviews/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_record_id(&id)?;
    state
        .store
        .delete_by_id(id)
        .await?
        .ok_or_else(AppError::record_not_found)?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Interview record deleted successfully!",
    }))
}
