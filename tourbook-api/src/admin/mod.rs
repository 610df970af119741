//! Privileged routes. Every handler begins with `Caller::require_admin`,
//! so a signed-in non-admin gets 403 and an anonymous request gets 401
//! from the session middleware.

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::state::AppState;

pub mod mail;
pub mod messages;
pub mod reservations;
pub mod tours;
pub mod users;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/tours", get(tours::list_tours).post(tours::create_tour))
        .route("/admin/tours/{id}", put(tours::update_tour).delete(tours::delete_tour))
        .route("/admin/tours/{id}/active", patch(tours::set_active))
        .route("/admin/bulk-price", put(tours::bulk_price))
        .route("/admin/categories", post(tours::create_category))
        .route("/admin/reservations", get(reservations::list_reservations))
        .route("/admin/users", get(users::list_users))
        .route("/admin/users/{id}", put(users::update_role))
        .route("/admin/messages", get(messages::list_messages))
        .route("/admin/messages/bulk-read", put(messages::bulk_read))
        .route(
            "/admin/messages/{id}",
            patch(messages::set_read).delete(messages::delete_message),
        )
        .route("/admin/bulk-email", post(mail::bulk_email))
}
