// ============================================================================
// CRM Core - Customer Service
// File: crates/crm-core/src/services/customer_service.rs
// ============================================================================
//! Scoped customer listing, detail, creation and edits

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{authorize_customer_create, authorize_customer_update, AccessScope, Principal};
use crate::domain::report::round_score;
use crate::domain::{Contact, Customer, CustomerFilter, CustomerInput, CustomerListItem, SalespersonSummary};
use crate::error::DomainError;
use crate::repositories::{ContactRepository, CustomerRepository, SalespersonRepository};
use crm_shared::config::SalespersonChangePolicy;
use crm_shared::{Page, Pagination};

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub salesperson: Option<SalespersonSummary>,
    pub contacts: Vec<Contact>,
    /// `None` until at least one contact exists.
    pub average_relationship_score: Option<f64>,
}

pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
    contacts: Arc<dyn ContactRepository>,
    salespeople: Arc<dyn SalespersonRepository>,
    change_policy: SalespersonChangePolicy,
}

impl CustomerService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        contacts: Arc<dyn ContactRepository>,
        salespeople: Arc<dyn SalespersonRepository>,
        change_policy: SalespersonChangePolicy,
    ) -> Self {
        Self {
            customers,
            contacts,
            salespeople,
            change_policy,
        }
    }

    pub async fn list(
        &self,
        principal: &Principal,
        filter: &CustomerFilter,
        pagination: Pagination,
    ) -> Result<Page<CustomerListItem>, DomainError> {
        let scope = AccessScope::for_principal(principal);
        if scope.is_empty() {
            return Ok(Page::new(Vec::new(), 0, pagination));
        }
        self.customers.list(&scope, filter, &pagination).await
    }

    /// Loads a customer the principal may see: 404 when missing, 403 when out of scope.
    async fn load_visible(&self, principal: &Principal, id: &Uuid) -> Result<Customer, DomainError> {
        let customer = self
            .customers
            .find_by_id(id)
            .await?
            .ok_or(DomainError::CustomerNotFound(*id))?;
        if !AccessScope::for_principal(principal).permits_customer(&customer) {
            warn!(user_id = %principal.user_id, customer_id = %id, "Customer access denied");
            return Err(DomainError::AccessDenied("Customer is outside your scope".to_string()));
        }
        Ok(customer)
    }

    pub async fn get(&self, principal: &Principal, id: &Uuid) -> Result<CustomerDetail, DomainError> {
        let customer = self.load_visible(principal, id).await?;
        let contacts = self.contacts.list_for_customer(id).await?;
        let salesperson = self.salespeople.find_summary(&customer.salesperson_id).await?;
        let average_relationship_score = if contacts.is_empty() {
            None
        } else {
            let total: i32 = contacts.iter().map(|c| c.relationship_score).sum();
            Some(round_score(total as f64 / contacts.len() as f64))
        };
        Ok(CustomerDetail {
            customer,
            salesperson,
            contacts,
            average_relationship_score,
        })
    }

    async fn ensure_salesperson_exists(&self, salesperson_id: &Uuid) -> Result<(), DomainError> {
        match self.salespeople.find_summary(salesperson_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::SalespersonNotFound(*salesperson_id)),
        }
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> Result<(), DomainError> {
        match self.customers.find_by_name(name.trim()).await? {
            Some(existing) if Some(existing.id) != except => {
                warn!("Customer name already exists: {}", name);
                Err(DomainError::CustomerNameAlreadyExists(name.trim().to_string()))
            }
            _ => Ok(()),
        }
    }

    pub async fn create(&self, principal: &Principal, input: CustomerInput) -> Result<Customer, DomainError> {
        let input = input.normalized();
        let owner = authorize_customer_create(principal, &input)?;
        self.ensure_salesperson_exists(&owner).await?;
        self.ensure_name_free(&input.name, None).await?;

        let customer = Customer::new(&input, owner, Some(principal.user_id))?;
        let created = self.customers.create(&customer).await?;
        info!(customer_id = %created.id, created_by = %principal.user_id, "Customer created: {}", created.name);
        Ok(created)
    }

    pub async fn update(&self, principal: &Principal, id: &Uuid, input: CustomerInput) -> Result<Customer, DomainError> {
        let input = input.normalized();
        let mut customer = self.load_visible(principal, id).await?;
        let owner = authorize_customer_update(principal, self.change_policy, &customer, &input)?;
        if owner != customer.salesperson_id {
            self.ensure_salesperson_exists(&owner).await?;
        }
        self.ensure_name_free(&input.name, Some(customer.id)).await?;

        customer.apply(&input, owner, principal.user_id)?;
        let updated = self.customers.update(&customer).await?;
        info!(customer_id = %updated.id, modified_by = %principal.user_id, "Customer updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Department;
    use crate::testing::InMemoryCrm;

    fn service(store: &Arc<InMemoryCrm>, policy: SalespersonChangePolicy) -> CustomerService {
        CustomerService::new(store.clone(), store.clone(), store.clone(), policy)
    }

    fn input(name: &str, department: Department, salesperson_id: Option<Uuid>) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            department,
            estimated_yearly_sales: 50_000,
            salesperson_id,
        }
    }

    struct Fixture {
        store: Arc<InMemoryCrm>,
        exec: Principal,
        ana: Principal,
        leo: Principal,
        wholesale_mgr: Principal,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let ana = store.add_user("ana", "Salesperson");
        let leo = store.add_user("leo", "Salesperson");
        let wholesale_mgr = store.add_user("wendy", "Manager - Wholesale");
        store.add_customer("Ana Wholesale", Department::Wholesale, ana.salesperson_id.unwrap(), 100);
        store.add_customer("Ana Ecommerce", Department::Ecommerce, ana.salesperson_id.unwrap(), 200);
        store.add_customer("Leo Wholesale", Department::Wholesale, leo.salesperson_id.unwrap(), 300);
        Fixture { store, exec, ana, leo, wholesale_mgr }
    }

    async fn visible_names(service: &CustomerService, principal: &Principal) -> Vec<String> {
        service
            .list(principal, &CustomerFilter::default(), Pagination::default())
            .await
            .unwrap()
            .items
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[tokio::test]
    async fn test_visibility_by_role() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        assert_eq!(visible_names(&service, &f.exec).await.len(), 3);
        assert_eq!(visible_names(&service, &f.ana).await, vec!["Ana Ecommerce", "Ana Wholesale"]);
        assert_eq!(visible_names(&service, &f.wholesale_mgr).await, vec!["Ana Wholesale", "Leo Wholesale"]);
    }

    #[tokio::test]
    async fn test_unrecognized_role_sees_nothing() {
        let f = fixture();
        let odd = f.store.add_user("odd", "Manager - Florida");
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        let page = service.list(&odd, &CustomerFilter::default(), Pagination::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_detail_out_of_scope_is_forbidden() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        let leos = f.store.add_customer("Leo Mass", Department::MassMarket, f.leo.salesperson_id.unwrap(), 5);
        assert!(matches!(service.get(&f.ana, &leos.id).await, Err(DomainError::AccessDenied(_))));
        assert!(matches!(
            service.get(&f.ana, &Uuid::new_v4()).await,
            Err(DomainError::CustomerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_detail_average_score() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        let customer = f.store.add_customer("Scored", Department::Mm2, f.ana.salesperson_id.unwrap(), 5);
        f.store.add_contact(customer.id, "A", None, 4, true);
        f.store.add_contact(customer.id, "B", None, 3, true);
        let detail = service.get(&f.ana, &customer.id).await.unwrap();
        assert_eq!(detail.contacts.len(), 2);
        assert_eq!(detail.average_relationship_score, Some(3.5));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        let result = service.create(&f.ana, input("ana wholesale", Department::Mm2, None)).await;
        assert!(matches!(result, Err(DomainError::CustomerNameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_executive_creates_for_other_salesperson() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        let created = service
            .create(&f.exec, input("New Bloom", Department::International, f.leo.salesperson_id))
            .await
            .unwrap();
        assert_eq!(Some(created.salesperson_id), f.leo.salesperson_id);
    }

    #[tokio::test]
    async fn test_executive_unknown_salesperson() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        let result = service
            .create(&f.exec, input("New Bloom", Department::Mm2, Some(Uuid::new_v4())))
            .await;
        assert!(matches!(result, Err(DomainError::SalespersonNotFound(_))));
    }

    #[tokio::test]
    async fn test_salesperson_reassignment_rejected_keeps_owner() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        let customer = f.store.add_customer("Mine", Department::Mm2, f.ana.salesperson_id.unwrap(), 10);
        let mut edit = input("Mine Renamed", Department::Mm2, f.leo.salesperson_id);
        edit.estimated_yearly_sales = 99;
        let result = service.update(&f.ana, &customer.id, edit).await;
        assert!(matches!(result, Err(DomainError::SalespersonReassignmentForbidden)));

        let stored = f.store.customer(customer.id).unwrap();
        assert_eq!(Some(stored.salesperson_id), f.ana.salesperson_id);
        assert_eq!(stored.name, "Mine");
    }

    #[tokio::test]
    async fn test_salesperson_reassignment_ignored_saves_rest() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Ignore);
        let customer = f.store.add_customer("Mine", Department::Mm2, f.ana.salesperson_id.unwrap(), 10);
        let updated = service
            .update(&f.ana, &customer.id, input("Mine Renamed", Department::Mm2, f.leo.salesperson_id))
            .await
            .unwrap();
        assert_eq!(Some(updated.salesperson_id), f.ana.salesperson_id);
        assert_eq!(updated.name, "Mine Renamed");
    }

    #[tokio::test]
    async fn test_manager_cannot_edit_other_department() {
        let f = fixture();
        let service = service(&f.store, SalespersonChangePolicy::Reject);
        let ecommerce = f.store.add_customer("Web Shop", Department::Ecommerce, f.leo.salesperson_id.unwrap(), 10);
        let result = service
            .update(&f.wholesale_mgr, &ecommerce.id, input("Web Shop", Department::Ecommerce, None))
            .await;
        assert!(matches!(result, Err(DomainError::AccessDenied(_))));
    }
}
