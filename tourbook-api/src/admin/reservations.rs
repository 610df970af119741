use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use tourbook_core::{Caller, CoreError};
use tourbook_order::{ReservationStatus, ReservationWithTour};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReservationFilter {
    pub status: Option<String>,
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(filter): Query<ReservationFilter>,
) -> Result<Json<Vec<ReservationWithTour>>, AppError> {
    caller.require_admin()?;
    let status = filter
        .status
        .as_deref()
        .map(str::parse::<ReservationStatus>)
        .transpose()
        .map_err(CoreError::from)?;

    Ok(Json(state.reservations.list_reservations(status).await?))
}
