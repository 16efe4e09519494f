use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::dto::{ContactListing, ContactQuery};
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::response::{ok, ApiResponse, ApiResult};
use crate::state::AppState;
use crm_core::domain::{Contact, ContactInput};

/// GET /api/v1/contacts
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<ContactQuery>,
) -> ApiResult<ContactListing> {
    let filter = query.filter();
    let listing = if query.grouped {
        ContactListing::Grouped(state.contacts.list_grouped(&principal, &filter).await?)
    } else {
        ContactListing::Flat(state.contacts.list(&principal, &filter).await?)
    };
    ok(listing)
}

/// POST /api/v1/contacts
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<ContactInput>,
) -> Result<(StatusCode, Json<ApiResponse<Contact>>), ApiError> {
    let contact = state.contacts.create(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(contact))))
}

/// PUT /api/v1/contacts/{id}
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContactInput>,
) -> ApiResult<Contact> {
    ok(state.contacts.update(&principal, &id, payload).await?)
}
