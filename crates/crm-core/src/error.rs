//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("User not active")]
    UserNotActive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Salesperson not found: {0}")]
    SalespersonNotFound(Uuid),

    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("Customer name already exists: {0}")]
    CustomerNameAlreadyExists(String),

    #[error("Contact not found: {0}")]
    ContactNotFound(Uuid),

    #[error("Gift not found: {0}")]
    GiftNotFound(Uuid),

    #[error("Gift season not found: {0}")]
    GiftSeasonNotFound(Uuid),

    #[error("Gift season name already exists: {0}")]
    GiftSeasonNameAlreadyExists(String),

    #[error("Gift assignment not found: {0}")]
    GiftAssignmentNotFound(Uuid),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Salespersons cannot change the salesperson assigned to a customer")]
    SalespersonReassignmentForbidden,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid or expired password link")]
    InvalidPasswordToken,

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Password too long")]
    PasswordTooLong,

    #[error("Password too weak")]
    PasswordTooWeak,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

impl From<crm_security::password::PasswordError> for DomainError {
    fn from(error: crm_security::password::PasswordError) -> Self {
        use crm_security::password::PasswordError;
        match error {
            PasswordError::TooShort => DomainError::PasswordTooShort,
            PasswordError::TooLong => DomainError::PasswordTooLong,
            PasswordError::TooWeak(_) => DomainError::PasswordTooWeak,
            PasswordError::HashError(msg) => DomainError::PasswordHashError(msg),
        }
    }
}
