use axum::{extract::State, Json};
use tracing::info;

use crate::dto::WelcomeEmailsRequest;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::response::{ok, ApiResult};
use crate::state::AppState;
use crm_core::services::WelcomeReport;

/// POST /api/v1/admin/welcome-emails
pub async fn send_welcome_emails(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<WelcomeEmailsRequest>,
) -> ApiResult<WelcomeReport> {
    if payload.salesperson_ids.is_empty() {
        return Err(ApiError::BadRequest("Select at least one salesperson".to_string()));
    }
    let report = state
        .onboarding
        .send_welcome_emails(&principal, &payload.salesperson_ids)
        .await?;
    info!(
        requested_by = %principal.user_id,
        sent = report.sent.len(),
        failed = report.failures.len(),
        "Welcome emails processed"
    );
    ok(report)
}
