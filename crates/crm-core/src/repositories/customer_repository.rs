//! Customer repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::access::AccessScope;
use crate::domain::{Customer, CustomerFilter, CustomerListItem};
use crate::error::DomainError;
use crm_shared::{Page, Pagination};

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Customer>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>, DomainError>;

    /// Scoped, filtered page ordered by name.
    async fn list(
        &self,
        scope: &AccessScope,
        filter: &CustomerFilter,
        pagination: &Pagination,
    ) -> Result<Page<CustomerListItem>, DomainError>;

    /// Scoped, filtered, unpaged. Used by exports.
    async fn list_all(
        &self,
        scope: &AccessScope,
        filter: &CustomerFilter,
    ) -> Result<Vec<CustomerListItem>, DomainError>;

    async fn create(&self, customer: &Customer) -> Result<Customer, DomainError>;
    async fn update(&self, customer: &Customer) -> Result<Customer, DomainError>;
}
