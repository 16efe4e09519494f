//! Scoped contact listing, creation and edits

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{authorize_contact_create, AccessScope, Principal};
use crate::domain::{Contact, ContactFilter, ContactInput, ContactListItem, Department};
use crate::error::DomainError;
use crate::repositories::{ContactRepository, CustomerRepository};

/// Contacts of one department, ordered by customer then contact name.
#[derive(Debug, Clone, Serialize)]
pub struct ContactGroup {
    pub department: Department,
    pub department_name: &'static str,
    pub contacts: Vec<ContactListItem>,
}

pub struct ContactService {
    contacts: Arc<dyn ContactRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn ContactRepository>, customers: Arc<dyn CustomerRepository>) -> Self {
        Self { contacts, customers }
    }

    /// Flat scoped list, as exported.
    pub async fn list(&self, principal: &Principal, filter: &ContactFilter) -> Result<Vec<ContactListItem>, DomainError> {
        let scope = AccessScope::for_principal(principal);
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        self.contacts.list(&scope, filter).await
    }

    pub async fn list_grouped(&self, principal: &Principal, filter: &ContactFilter) -> Result<Vec<ContactGroup>, DomainError> {
        let mut items = self.list(principal, filter).await?;
        items.sort_by(|a, b| {
            a.customer_name
                .cmp(&b.customer_name)
                .then_with(|| a.contact.name.to_lowercase().cmp(&b.contact.name.to_lowercase()))
        });
        Ok(Department::ALL
            .into_iter()
            .filter_map(|department| {
                let contacts: Vec<ContactListItem> =
                    items.iter().filter(|i| i.department == department).cloned().collect();
                (!contacts.is_empty()).then(|| ContactGroup {
                    department,
                    department_name: department.display_name(),
                    contacts,
                })
            })
            .collect())
    }

    pub async fn create(&self, principal: &Principal, input: ContactInput) -> Result<Contact, DomainError> {
        let customer_id = input
            .customer_id
            .ok_or_else(|| DomainError::ValidationError("A customer is required".to_string()))?;
        let customer = self
            .customers
            .find_by_id(&customer_id)
            .await?
            .ok_or(DomainError::CustomerNotFound(customer_id))?;
        authorize_contact_create(principal, &customer)?;

        let contact = Contact::new(customer.id, input, Some(principal.user_id))?;
        let created = self.contacts.create(&contact).await?;
        info!(contact_id = %created.id, customer_id = %customer.id, "Contact created");
        Ok(created)
    }

    /// Edits a contact. Its customer never changes.
    pub async fn update(&self, principal: &Principal, id: &Uuid, input: ContactInput) -> Result<Contact, DomainError> {
        let mut contact = self
            .contacts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ContactNotFound(*id))?;
        let customer = self
            .customers
            .find_by_id(&contact.customer_id)
            .await?
            .ok_or(DomainError::CustomerNotFound(contact.customer_id))?;
        if !AccessScope::for_principal(principal).permits_customer(&customer) {
            warn!(user_id = %principal.user_id, contact_id = %id, "Contact edit denied");
            return Err(DomainError::AccessDenied("Contact is outside your scope".to_string()));
        }

        contact.apply(input, principal.user_id)?;
        let updated = self.contacts.update(&contact).await?;
        info!(contact_id = %updated.id, modified_by = %principal.user_id, "Contact updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContactStatusFilter;
    use crate::testing::InMemoryCrm;

    fn input(name: &str, customer_id: Option<Uuid>) -> ContactInput {
        ContactInput {
            name: name.to_string(),
            customer_id,
            relationship_score: Some(3),
            ..ContactInput::default()
        }
    }

    #[tokio::test]
    async fn test_contact_visibility_follows_customer() {
        let store = Arc::new(InMemoryCrm::new());
        let ana = store.add_user("ana", "Salesperson");
        let leo = store.add_user("leo", "Salesperson");
        let mgr = store.add_user("mia", "Manager - MM2");
        let mine = store.add_customer("Mine", Department::Mm2, ana.salesperson_id.unwrap(), 1);
        let theirs = store.add_customer("Theirs", Department::Wholesale, leo.salesperson_id.unwrap(), 1);
        store.add_contact(mine.id, "Alpha", None, 1, true);
        store.add_contact(theirs.id, "Beta", None, 1, true);

        let service = ContactService::new(store.clone(), store.clone());
        let filter = ContactFilter::default();
        let ana_sees: Vec<_> = service.list(&ana, &filter).await.unwrap().into_iter().map(|c| c.contact.name).collect();
        assert_eq!(ana_sees, vec!["Alpha"]);
        let mgr_sees: Vec<_> = service.list(&mgr, &filter).await.unwrap().into_iter().map(|c| c.contact.name).collect();
        assert_eq!(mgr_sees, vec!["Alpha"]);
    }

    #[tokio::test]
    async fn test_grouped_by_department_with_status_filter() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let sp = exec.salesperson_id.unwrap();
        let wholesale = store.add_customer("Bulk", Department::Wholesale, sp, 1);
        let web = store.add_customer("Web", Department::Ecommerce, sp, 1);
        store.add_contact(wholesale.id, "zed", None, 1, true);
        store.add_contact(wholesale.id, "Amy", None, 1, true);
        store.add_contact(web.id, "Gone", None, 1, false);

        let service = ContactService::new(store.clone(), store.clone());
        let groups = service.list_grouped(&exec, &ContactFilter::active()).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].department, Department::Wholesale);
        let names: Vec<_> = groups[0].contacts.iter().map(|c| c.contact.name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "zed"]);

        let inactive = ContactFilter {
            status: ContactStatusFilter::Inactive,
            ..ContactFilter::default()
        };
        let groups = service.list_grouped(&exec, &inactive).await.unwrap();
        assert_eq!(groups[0].department, Department::Ecommerce);
    }

    #[tokio::test]
    async fn test_salesperson_cannot_add_to_foreign_customer() {
        let store = Arc::new(InMemoryCrm::new());
        let ana = store.add_user("ana", "Salesperson");
        let leo = store.add_user("leo", "Salesperson");
        let theirs = store.add_customer("Theirs", Department::Mm2, leo.salesperson_id.unwrap(), 1);
        let service = ContactService::new(store.clone(), store.clone());
        assert!(matches!(
            service.create(&ana, input("Sneaky", Some(theirs.id))).await,
            Err(DomainError::AccessDenied(_))
        ));
        assert!(service.create(&leo, input("Fine", Some(theirs.id))).await.is_ok());
    }

    #[tokio::test]
    async fn test_edit_keeps_customer() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let a = store.add_customer("A", Department::Mm2, exec.salesperson_id.unwrap(), 1);
        let b = store.add_customer("B", Department::Mm2, exec.salesperson_id.unwrap(), 1);
        let contact = store.add_contact(a.id, "Carla", None, 2, true);

        let service = ContactService::new(store.clone(), store.clone());
        let updated = service.update(&exec, &contact.id, input("Carla R.", Some(b.id))).await.unwrap();
        assert_eq!(updated.customer_id, a.id);
        assert_eq!(updated.name, "Carla R.");
    }

    #[tokio::test]
    async fn test_invalid_birthday_never_stored() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let a = store.add_customer("A", Department::Mm2, exec.salesperson_id.unwrap(), 1);
        let service = ContactService::new(store.clone(), store.clone());
        let mut bad = input("Feb", Some(a.id));
        bad.birthday_month = Some(2);
        bad.birthday_day = Some(31);
        assert!(matches!(service.create(&exec, bad).await, Err(DomainError::ValidationError(_))));
        assert!(service.list(&exec, &ContactFilter::default()).await.unwrap().is_empty());
    }
}
