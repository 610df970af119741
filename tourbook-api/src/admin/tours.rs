use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use tourbook_catalog::{Category, NewCategory, PriceAction, Tour, TourDraft};
use tourbook_core::pricing::{bulk_adjust_prices, BulkPriceReport};
use tourbook_core::{Caller, CoreError};
use tourbook_shared::models::events::{record, TourPricesAdjustedEvent};

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPriceRequest {
    pub tour_ids: Vec<Uuid>,
    pub action: String,
    pub amount: f64,
}

/// GET /admin/tours, hidden tours included.
pub async fn list_tours(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Tour>>, AppError> {
    caller.require_admin()?;
    Ok(Json(state.tours.list_tours(false).await?))
}

pub async fn create_tour(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(draft): ApiJson<TourDraft>,
) -> Result<(StatusCode, Json<Tour>), AppError> {
    caller.require_admin()?;
    let tour = state.tours.create_tour(draft).await?;
    tracing::info!("Tour {} created by {}", tour.id, caller.id);
    Ok((StatusCode::CREATED, Json(tour)))
}

pub async fn update_tour(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<TourDraft>,
) -> Result<Json<Tour>, AppError> {
    caller.require_admin()?;
    let tour = state.tours.update_tour(id, draft).await?;
    tracing::info!("Tour {} updated by {}", tour.id, caller.id);
    Ok(Json(tour))
}

pub async fn set_active(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SetActiveRequest>,
) -> Result<Json<Tour>, AppError> {
    caller.require_admin()?;
    Ok(Json(state.tours.set_active(id, payload.active).await?))
}

pub async fn delete_tour(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    caller.require_admin()?;
    state.tours.delete_tour(id).await?;
    tracing::info!("Tour {} deleted by {}", id, caller.id);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /admin/bulk-price
pub async fn bulk_price(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(payload): ApiJson<BulkPriceRequest>,
) -> Result<Json<BulkPriceReport>, AppError> {
    caller.require_admin()?;
    let action: PriceAction = payload.action.parse().map_err(CoreError::from)?;

    let report =
        bulk_adjust_prices(state.tours.as_ref(), &payload.tour_ids, action, payload.amount).await?;

    if report.is_partial() {
        tracing::warn!(
            "Bulk {} applied to {} tours, {} failed",
            action,
            report.updated.len(),
            report.failed.len()
        );
    }
    record(&TourPricesAdjustedEvent {
        action: action.to_string(),
        amount: payload.amount,
        updated: report.updated.len(),
        failed: report.failed.len(),
        actor_id: caller.id,
        timestamp: Utc::now().timestamp(),
    });

    Ok(Json(report))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(payload): ApiJson<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    caller.require_admin()?;
    let category = state.tours.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
