use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tourbook_core::{Caller, ContactMessage};

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageFilter {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetReadRequest {
    pub is_read: bool,
}

#[derive(Debug, Deserialize)]
pub struct BulkReadRequest {
    pub ids: Vec<Uuid>,
    pub is_read: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkReadResponse {
    pub updated: u64,
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(filter): Query<MessageFilter>,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    caller.require_admin()?;
    Ok(Json(state.messages.list_messages(filter.unread_only).await?))
}

pub async fn set_read(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SetReadRequest>,
) -> Result<Json<ContactMessage>, AppError> {
    caller.require_admin()?;
    Ok(Json(state.messages.set_read(id, payload.is_read).await?))
}

pub async fn bulk_read(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(payload): ApiJson<BulkReadRequest>,
) -> Result<Json<BulkReadResponse>, AppError> {
    caller.require_admin()?;
    if payload.ids.is_empty() {
        return Err(AppError::ValidationError("At least one message id is required".to_string()));
    }
    let updated = state.messages.set_read_many(&payload.ids, payload.is_read).await?;
    Ok(Json(BulkReadResponse { updated }))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    caller.require_admin()?;
    state.messages.delete_message(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
