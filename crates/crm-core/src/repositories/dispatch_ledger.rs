//! Record of delivered birthday reminders (port)

use async_trait::async_trait;

use crate::domain::DispatchKey;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DispatchLedger: Send + Sync {
    async fn has_sent(&self, key: &DispatchKey) -> Result<bool, DomainError>;
    /// Recording an existing key is a no-op.
    async fn record(&self, key: &DispatchKey) -> Result<(), DomainError>;
}
