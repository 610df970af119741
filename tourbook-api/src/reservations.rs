use axum::{
    extract::State,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use tourbook_core::reservations::{self, StatusChange};
use tourbook_core::Caller;
use tourbook_order::ReservationWithTour;
use tourbook_shared::models::events::{record, ReservationStatusChangedEvent};

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub(crate) fn record_status_change(caller: &Caller, change: &StatusChange) {
    let plan = &change.plan;
    if plan.from == plan.to {
        return;
    }
    tracing::info!(
        "Reservation {} moved {} -> {} by {}, released {} seats",
        change.reservation.reservation.id,
        plan.from,
        plan.to,
        caller.id,
        plan.release_seats
    );
    record(&ReservationStatusChangedEvent {
        reservation_id: change.reservation.reservation.id,
        tour_id: change.reservation.tour.id,
        from_status: plan.from.to_string(),
        to_status: plan.to.to_string(),
        released_seats: plan.release_seats,
        actor_id: caller.id,
        timestamp: Utc::now().timestamp(),
    });
}

/// PUT /reservations/{id}
pub async fn update_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<Json<ReservationWithTour>, AppError> {
    let change =
        reservations::change_status(state.reservations.as_ref(), &caller, id, &payload.status).await?;
    record_status_change(&caller, &change);
    Ok(Json(change.reservation))
}
