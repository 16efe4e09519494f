// ============================================================================
// CRM API - Auth Handlers
// File: crates/crm-api/src/handlers/auth.rs
// ============================================================================
//! Signup, login and password-set link redemption

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::dto::{LoginRequest, MessageResponse, SetPasswordRequest};
use crate::error::ApiError;
use crate::response::{ok, ApiResponse, ApiResult};
use crate::state::AppState;
use crm_core::domain::UserAccount;
use crm_core::services::{LoginResult, SignupInput};

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupInput>,
) -> Result<(StatusCode, Json<ApiResponse<UserAccount>>), ApiError> {
    let user = state.auth.signup(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// POST /api/v1/auth/login
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> ApiResult<LoginResult> {
    if payload.login.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("Login and password are required".to_string()));
    }

    let key = payload.login.trim().to_lowercase();
    if state.login_limiter.check_key(&key).is_err() {
        return Err(ApiError::TooManyRequests);
    }

    ok(state.auth.login(payload.login.trim(), &payload.password).await?)
}

/// POST /api/v1/auth/password
pub async fn set_password(
    State(state): State<AppState>,
    Json(payload): Json<SetPasswordRequest>,
) -> ApiResult<MessageResponse> {
    state.onboarding.set_password(&payload.token, &payload.password).await?;
    info!("Password set through one-time link");
    ok(MessageResponse {
        message: "Password updated. You can now log in.".to_string(),
    })
}
