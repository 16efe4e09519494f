// ============================================================================
// CRM API - Customer Handlers
// File: crates/crm-api/src/handlers/customers.rs
// ============================================================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::{CustomerQuery, CustomerRequest};
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::response::{ok, ApiResponse, ApiResult};
use crate::state::AppState;
use crm_core::domain::{Customer, CustomerInput, CustomerListItem};
use crm_core::services::CustomerDetail;
use crm_shared::Page;

/// GET /api/v1/customers
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Page<CustomerListItem>> {
    ok(state
        .customers
        .list(&principal, &query.filter(), query.pagination())
        .await?)
}

/// POST /api/v1/customers
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Customer>>), ApiError> {
    let input = CustomerInput::try_from(payload)?;
    let customer = state.customers.create(&principal, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(customer))))
}

/// GET /api/v1/customers/{id}
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<CustomerDetail> {
    ok(state.customers.get(&principal, &id).await?)
}

/// PUT /api/v1/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerRequest>,
) -> ApiResult<Customer> {
    let input = CustomerInput::try_from(payload)?;
    ok(state.customers.update(&principal, &id, input).await?)
}
