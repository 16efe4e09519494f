//! Salesperson repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::SalespersonSummary;
use crate::error::DomainError;

#[async_trait]
pub trait SalespersonRepository: Send + Sync {
    async fn find_summary(&self, id: &Uuid) -> Result<Option<SalespersonSummary>, DomainError>;
    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<SalespersonSummary>, DomainError>;
    /// Salespeople owning at least one customer, for filter pickers.
    async fn list_with_customers(&self) -> Result<Vec<SalespersonSummary>, DomainError>;
}
