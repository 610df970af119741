use axum::{
    extract::State,
    Extension, Json,
};
use uuid::Uuid;

use tourbook_core::reservations;
use tourbook_core::Caller;
use tourbook_order::ReservationWithTour;

use crate::error::AppError;
use crate::extract::ApiPath;
use crate::reservations::record_status_change;
use crate::state::AppState;

/// GET /user/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<ReservationWithTour>>, AppError> {
    let bookings = state
        .reservations
        .list_for_requester(caller.id, &caller.email)
        .await?;
    Ok(Json(bookings))
}

/// DELETE /user/bookings/{id}
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ReservationWithTour>, AppError> {
    let change = reservations::cancel_booking(state.reservations.as_ref(), &caller, id).await?;
    record_status_change(&caller, &change);
    Ok(Json(change.reservation))
}
