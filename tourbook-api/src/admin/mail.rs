use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Deserialize;

use tourbook_core::mail::{send_bulk_email, BulkEmailReport};
use tourbook_core::{Caller, Role};
use tourbook_shared::models::events::{record, BulkEmailDispatchedEvent};

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RecipientFilters {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkEmailRequest {
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub filters: Option<RecipientFilters>,
}

/// POST /admin/bulk-email
pub async fn bulk_email(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(payload): ApiJson<BulkEmailRequest>,
) -> Result<Json<BulkEmailReport>, AppError> {
    caller.require_admin()?;
    let role = payload
        .filters
        .and_then(|f| f.role)
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()?;

    let report = send_bulk_email(
        state.users.as_ref(),
        state.mailer.as_ref(),
        &payload.subject,
        &payload.content,
        role,
    )
    .await?;

    tracing::info!(
        "Bulk email sent to {}/{} recipients",
        report.sent.len(),
        report.total
    );
    record(&BulkEmailDispatchedEvent {
        subject: payload.subject,
        total: report.total,
        sent: report.sent.len(),
        failed: report.failed.len(),
        actor_id: caller.id,
        timestamp: Utc::now().timestamp(),
    });

    Ok(Json(report))
}
