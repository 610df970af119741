use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use tourbook_core::{ContactMessage, NewContactMessage};
use tourbook_shared::Masked;

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit))
}

async fn submit(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewContactMessage>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    let message = state.messages.create_message(payload).await?;
    tracing::info!("Contact message {} from {}", message.id, Masked(message.email.as_str()));
    Ok((StatusCode::CREATED, Json(message)))
}
