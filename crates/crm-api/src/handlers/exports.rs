//! CSV downloads of the caller's visible contacts and customers

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::dto::{ContactQuery, CustomerQuery};
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
        .into_response()
}

/// GET /api/v1/export/contacts.csv
pub async fn contacts_csv(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<ContactQuery>,
) -> Result<Response, ApiError> {
    let body = state.exports.contacts_csv(&principal, &query.filter()).await?;
    Ok(csv_attachment("contacts.csv", body))
}

/// GET /api/v1/export/customers.csv
pub async fn customers_csv(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<CustomerQuery>,
) -> Result<Response, ApiError> {
    let body = state.exports.customers_csv(&principal, &query.filter()).await?;
    Ok(csv_attachment("customers.csv", body))
}
