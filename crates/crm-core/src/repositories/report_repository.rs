//! Dashboard aggregates (port)

use async_trait::async_trait;

use crate::access::AccessScope;
use crate::domain::{CustomerFilter, Department, PerformanceRow, SalesSummary, TopCustomer};
use crate::error::DomainError;

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn sales_summary(&self, scope: &AccessScope, filter: &CustomerFilter) -> Result<SalesSummary, DomainError>;

    /// Highest estimated sales first.
    async fn top_customers(
        &self,
        scope: &AccessScope,
        filter: &CustomerFilter,
        limit: i64,
    ) -> Result<Vec<TopCustomer>, DomainError>;

    /// One row per profile, ordered by name.
    async fn user_performance(&self) -> Result<Vec<PerformanceRow>, DomainError>;

    /// One row per salesperson owning customers in `department`, counting only those customers.
    async fn department_performance(&self, department: Department) -> Result<Vec<PerformanceRow>, DomainError>;
}
