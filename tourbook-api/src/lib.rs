use axum::{
    http::Method,
    middleware::from_fn_with_state,
    routing::{delete, get, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod contact;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod reservations;
pub mod state;
pub mod tours;

pub use state::AppState;

use crate::middleware::{rate_limit_middleware, session_middleware};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Everything below requires a session; admin handlers check the role.
    let protected = Router::new()
        .route("/reservations/{id}", put(reservations::update_status))
        .route("/user/bookings", get(bookings::list_bookings))
        .route("/user/bookings/{id}", delete(bookings::cancel_booking))
        .merge(admin::routes())
        .route_layer(from_fn_with_state(state.clone(), session_middleware));

    Router::new()
        .merge(auth::routes(state.clone()))
        .merge(tours::routes())
        .merge(contact::routes())
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}
