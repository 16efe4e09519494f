//! Sales, executive and manager dashboards

use axum::extract::{Query, State};

use crate::dto::CustomerQuery;
use crate::extract::CurrentUser;
use crate::response::{ok, ApiResult};
use crate::state::AppState;
use crm_core::domain::{Dashboard, PerformanceRow};
use crm_core::services::ManagerDashboard;

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Dashboard> {
    let today = state.today();
    ok(state.dashboard.dashboard(&principal, &query.filter(), today).await?)
}

/// GET /api/v1/dashboard/executive
pub async fn executive(State(state): State<AppState>, CurrentUser(principal): CurrentUser) -> ApiResult<Vec<PerformanceRow>> {
    ok(state.dashboard.executive(&principal).await?)
}

/// GET /api/v1/dashboard/manager
pub async fn manager(State(state): State<AppState>, CurrentUser(principal): CurrentUser) -> ApiResult<ManagerDashboard> {
    ok(state.dashboard.manager(&principal).await?)
}
