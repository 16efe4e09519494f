//! PostgreSQL repository implementations

use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use tracing::error;

use crm_core::domain::UnknownVariant;
use crm_core::error::DomainError;
use crm_core::repositories::Repositories;

pub mod user_repo_impl;
pub mod salesperson_repo_impl;
pub mod customer_repo_impl;
pub mod contact_repo_impl;
pub mod gift_repo_impl;
pub mod password_token_repo_impl;
pub mod dispatch_ledger_impl;
pub mod report_repo_impl;

pub use user_repo_impl::PgUserRepository;
pub use salesperson_repo_impl::PgSalespersonRepository;
pub use customer_repo_impl::PgCustomerRepository;
pub use contact_repo_impl::PgContactRepository;
pub use gift_repo_impl::PgGiftRepository;
pub use password_token_repo_impl::PgPasswordTokenRepository;
pub use dispatch_ledger_impl::PgDispatchLedger;
pub use report_repo_impl::PgReportRepository;

/// Builds every repository over one shared pool.
pub fn repositories(pool: &PgPool) -> Repositories {
    Repositories {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        salespeople: Arc::new(PgSalespersonRepository::new(pool.clone())),
        customers: Arc::new(PgCustomerRepository::new(pool.clone())),
        contacts: Arc::new(PgContactRepository::new(pool.clone())),
        gifts: Arc::new(PgGiftRepository::new(pool.clone())),
        tokens: Arc::new(PgPasswordTokenRepository::new(pool.clone())),
        reports: Arc::new(PgReportRepository::new(pool.clone())),
    }
}

/// Logs and wraps a driver error.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

/// Parses a stored enum key. Unknown keys are an error, never a fallback variant.
pub(crate) fn decode<T>(raw: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.parse().map_err(|e: UnknownVariant| {
        error!(kind = e.kind, value = %e.value, "Unrecognized value stored in database");
        DomainError::DatabaseError(e.to_string())
    })
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    let msg = e.to_string();
    msg.contains("unique") || msg.contains("duplicate")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::domain::{Department, GiftStatus};

    #[test]
    fn test_decode_known_keys() {
        assert_eq!(decode::<Department>("wholesale").unwrap(), Department::Wholesale);
        assert_eq!(decode::<GiftStatus>("sent").unwrap(), GiftStatus::Sent);
    }

    #[test]
    fn test_decode_unknown_department_fails_closed() {
        match decode::<Department>("floral") {
            Err(DomainError::DatabaseError(msg)) => assert_eq!(msg, "unknown department: floral"),
            other => panic!("expected database error, got {:?}", other),
        }
        assert!(matches!(decode::<GiftStatus>(""), Err(DomainError::DatabaseError(_))));
    }
}
