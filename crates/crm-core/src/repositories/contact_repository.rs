//! Contact repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::access::AccessScope;
use crate::domain::{BirthdayContact, Contact, ContactFilter, ContactListItem};
use crate::error::DomainError;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Contact>, DomainError>;

    /// Contacts whose customer is in scope, ordered by department then name.
    async fn list(&self, scope: &AccessScope, filter: &ContactFilter) -> Result<Vec<ContactListItem>, DomainError>;

    async fn list_for_customer(&self, customer_id: &Uuid) -> Result<Vec<Contact>, DomainError>;

    /// Active contacts born on `month`/`day`, with their owning salesperson.
    async fn find_birthdays(&self, month: u32, day: u32) -> Result<Vec<BirthdayContact>, DomainError>;

    async fn create(&self, contact: &Contact) -> Result<Contact, DomainError>;
    async fn update(&self, contact: &Contact) -> Result<Contact, DomainError>;
}
