use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use tourbook_catalog::{Category, Tour};

use crate::error::AppError;
use crate::extract::ApiPath;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tours", get(list_tours))
        .route("/tours/{id}", get(get_tour))
        .route("/categories", get(list_categories))
}

async fn list_tours(State(state): State<AppState>) -> Result<Json<Vec<Tour>>, AppError> {
    Ok(Json(state.tours.list_tours(true).await?))
}

/// Hidden tours are only visible through the admin routes.
async fn get_tour(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Tour>, AppError> {
    match state.tours.get_tour(id).await? {
        Some(tour) if tour.is_active => Ok(Json(tour)),
        _ => Err(AppError::NotFoundError("Tour not found".to_string())),
    }
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.tours.list_categories().await?))
}
