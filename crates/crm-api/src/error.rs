// ============================================================================
// CRM API - Error Responses
// File: crates/crm-api/src/error.rs
// ============================================================================
//! HTTP-facing error type. Every failure leaves the API as an `ApiResponse`
//! envelope with `success: false`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;
use crm_core::error::DomainError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::TooManyRequests => "RATE_LIMITED",
            ApiError::BadGateway(_) => "NOTIFICATION_FAILED",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => {
                tracing::warn!("{}", self);
                msg.clone()
            }
            ApiError::TooManyRequests => {
                tracing::warn!("Rate limit exceeded");
                "Too many attempts, try again later".to_string()
            }
            ApiError::BadGateway(msg) => {
                tracing::error!("Notification failure: {}", msg);
                msg.clone()
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        let body = Json(ApiResponse::<()>::error(self.code(), &message));
        (self.status(), body).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        let message = error.to_string();
        match error {
            DomainError::ValidationError(_)
            | DomainError::PasswordTooShort
            | DomainError::PasswordTooLong
            | DomainError::PasswordTooWeak
            | DomainError::SalespersonReassignmentForbidden
            | DomainError::InvalidPasswordToken => ApiError::BadRequest(message),

            DomainError::InvalidCredentials | DomainError::InvalidToken | DomainError::UserNotActive => {
                ApiError::Unauthorized(message)
            }

            DomainError::AccessDenied(_) => ApiError::Forbidden(message),

            DomainError::UserNotFound
            | DomainError::SalespersonNotFound(_)
            | DomainError::CustomerNotFound(_)
            | DomainError::ContactNotFound(_)
            | DomainError::GiftNotFound(_)
            | DomainError::GiftSeasonNotFound(_)
            | DomainError::GiftAssignmentNotFound(_) => ApiError::NotFound(message),

            DomainError::UsernameAlreadyExists(_)
            | DomainError::EmailAlreadyExists(_)
            | DomainError::CustomerNameAlreadyExists(_)
            | DomainError::GiftSeasonNameAlreadyExists(_) => ApiError::Conflict(message),

            DomainError::NotificationError(_) => ApiError::BadGateway(message),

            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::TemplateError(_)
            | DomainError::ExportError(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ApiError::InternalError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::ValidationError("bad".into()), StatusCode::BAD_REQUEST),
            (DomainError::SalespersonReassignmentForbidden, StatusCode::BAD_REQUEST),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (DomainError::AccessDenied("no".into()), StatusCode::FORBIDDEN),
            (DomainError::CustomerNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (DomainError::CustomerNameAlreadyExists("Rose".into()), StatusCode::CONFLICT),
            (DomainError::NotificationError("smtp".into()), StatusCode::BAD_GATEWAY),
            (DomainError::DatabaseError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (domain, status) in cases {
            assert_eq!(ApiError::from(domain).status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::InternalError("connection refused on 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().contains("10.0.0.3"));
    }
}
