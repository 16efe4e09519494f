// ============================================================================
// CRM API - Gift Workflow Handlers
// File: crates/crm-api/src/handlers/gifts.rs
// ============================================================================

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::response::{ok, ApiResponse, ApiResult};
use crate::state::AppState;
use crm_core::domain::{Gift, GiftAssignment, GiftInput, GiftSeason, GiftSeasonInput};
use crm_core::services::{AssignmentUpdate, GiftPlan};

/// GET /api/v1/gifts
pub async fn list_gifts(State(state): State<AppState>, CurrentUser(_): CurrentUser) -> ApiResult<Vec<Gift>> {
    ok(state.gifts.list_gifts().await?)
}

/// POST /api/v1/gifts
pub async fn create_gift(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<GiftInput>,
) -> Result<(StatusCode, Json<ApiResponse<Gift>>), ApiError> {
    let gift = state.gifts.create_gift(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(gift))))
}

/// GET /api/v1/gift-seasons
pub async fn list_seasons(State(state): State<AppState>, CurrentUser(_): CurrentUser) -> ApiResult<Vec<GiftSeason>> {
    ok(state.gifts.list_seasons().await?)
}

/// POST /api/v1/gift-seasons
pub async fn create_season(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<GiftSeasonInput>,
) -> Result<(StatusCode, Json<ApiResponse<GiftSeason>>), ApiError> {
    let season = state.gifts.create_season(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(season))))
}

/// GET /api/v1/gift-seasons/{id}/plan
///
/// Opening a plan creates the caller's missing assignments for the season.
pub async fn open_plan(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(season_id): Path<Uuid>,
) -> ApiResult<GiftPlan> {
    ok(state.gifts.open_plan(&principal, &season_id).await?)
}

/// PUT /api/v1/gift-assignments/{id}
pub async fn update_assignment(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignmentUpdate>,
) -> ApiResult<GiftAssignment> {
    ok(state.gifts.update_assignment(&principal, &id, payload).await?)
}
