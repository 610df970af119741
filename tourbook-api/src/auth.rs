use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use tourbook_core::{users, Caller, Registration, User};

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::{issue_token, session_middleware};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let session = Router::new()
        .route("/auth/session", get(session))
        .route_layer(middleware::from_fn_with_state(state, session_middleware));

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(session)
}

async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<Registration>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = users::register(state.users.as_ref(), payload).await?;
    let token = issue_token(&state.auth, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = users::authenticate(state.users.as_ref(), &payload.email, &payload.password).await?;
    let token = issue_token(&state.auth, &user)?;
    Ok(Json(AuthResponse { token, user }))
}

async fn session(Extension(caller): Extension<Caller>) -> Json<Caller> {
    Json(caller)
}
