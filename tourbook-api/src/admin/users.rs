use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use tourbook_core::{users, Caller, Role, User};
use tourbook_shared::models::events::{record, UserRoleChangedEvent};

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserFilter {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>, AppError> {
    caller.require_admin()?;
    let role = filter.role.as_deref().map(str::parse::<Role>).transpose()?;
    Ok(Json(state.users.list_users(role).await?))
}

/// PUT /admin/users/{id}
pub async fn update_role(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateRoleRequest>,
) -> Result<Json<User>, AppError> {
    let user = users::change_role(state.users.as_ref(), &caller, id, &payload.role).await?;

    record(&UserRoleChangedEvent {
        user_id: user.id,
        role: user.role.to_string(),
        actor_id: caller.id,
        timestamp: Utc::now().timestamp(),
    });

    Ok(Json(user))
}
