use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::dto::ChangeRoleRequest;
use crate::extract::CurrentUser;
use crate::response::{ok, ApiResult};
use crate::state::AppState;
use crm_core::domain::Profile;

/// PUT /api/v1/users/{id}/role
pub async fn change_role(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ChangeRoleRequest>,
) -> ApiResult<Profile> {
    ok(state.users.change_role(&principal, &user_id, &payload.role).await?)
}
