//! In-memory repositories and senders for tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::access::{AccessScope, Principal};
use crate::domain::report::round_score;
use crate::domain::*;
use crate::error::DomainError;
use crate::notifications::{EmailMessage, EmailSender};
use crate::repositories::*;
use crm_shared::{Page, Pagination};

#[derive(Default)]
struct State {
    users: Vec<UserAccount>,
    profiles: Vec<Profile>,
    salespeople: Vec<Salesperson>,
    customers: Vec<Customer>,
    contacts: Vec<Contact>,
    gifts: Vec<Gift>,
    seasons: Vec<GiftSeason>,
    assignments: Vec<GiftAssignment>,
    tokens: Vec<PasswordSetToken>,
}

impl State {
    fn summary(&self, salesperson: &Salesperson) -> Option<SalespersonSummary> {
        let user = self.users.iter().find(|u| u.id == salesperson.user_id)?;
        Some(SalespersonSummary {
            id: salesperson.id,
            user_id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            full_name: user.full_name(),
            email: Some(user.email.clone()),
            phone: salesperson.phone.clone(),
        })
    }

    fn salesperson_name(&self, salesperson_id: Uuid) -> String {
        self.salespeople
            .iter()
            .find(|s| s.id == salesperson_id)
            .and_then(|s| self.summary(s))
            .map(|s| s.full_name)
            .unwrap_or_default()
    }

    fn customer(&self, id: Uuid) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    fn list_item(&self, customer: &Customer) -> CustomerListItem {
        CustomerListItem {
            id: customer.id,
            name: customer.name.clone(),
            department: customer.department,
            salesperson_id: customer.salesperson_id,
            salesperson_name: self.salesperson_name(customer.salesperson_id),
            estimated_yearly_sales: customer.estimated_yearly_sales,
        }
    }

    fn scoped_customers(&self, scope: &AccessScope, filter: &CustomerFilter) -> Vec<Customer> {
        let mut customers: Vec<Customer> = self
            .customers
            .iter()
            .filter(|c| scope.permits_customer(c) && filter.matches(c))
            .cloned()
            .collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        customers
    }

    fn contacts_of(&self, customer_ids: &HashSet<Uuid>, active_only: bool) -> Vec<&Contact> {
        self.contacts
            .iter()
            .filter(|c| customer_ids.contains(&c.customer_id) && (!active_only || c.is_active))
            .collect()
    }

    fn performance(&self, user: &UserAccount, role: String, customers: Vec<&Customer>) -> PerformanceRow {
        let salesperson = self.salespeople.iter().find(|s| s.user_id == user.id);
        let ids: HashSet<Uuid> = customers.iter().map(|c| c.id).collect();
        let contacts = self.contacts_of(&ids, false);
        PerformanceRow {
            user_id: user.id,
            salesperson_id: salesperson.map(|s| s.id),
            username: user.username.clone(),
            full_name: user.full_name(),
            role,
            total_customers: salesperson.map(|_| customers.len() as i64),
            total_contacts: salesperson.map(|_| contacts.len() as i64),
            total_sales: salesperson.map(|_| customers.iter().map(|c| c.estimated_yearly_sales).sum()),
            average_relationship_score: salesperson.and_then(|_| average(contacts.iter().map(|c| c.relationship_score))),
        }
    }
}

fn average(scores: impl Iterator<Item = i32>) -> Option<f64> {
    let scores: Vec<i32> = scores.collect();
    if scores.is_empty() {
        None
    } else {
        Some(round_score(scores.iter().sum::<i32>() as f64 / scores.len() as f64))
    }
}


/// One store implementing every repository trait.
#[derive(Default)]
pub struct InMemoryCrm {
    state: Mutex<State>,
}

impl InMemoryCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every repository port backed by this one store.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            salespeople: self.clone(),
            customers: self.clone(),
            contacts: self.clone(),
            gifts: self.clone(),
            tokens: self.clone(),
            reports: self.clone(),
        }
    }

    /// Adds an account with salesperson record and profile; `role_label` is stored verbatim.
    pub fn add_user(&self, username: &str, role_label: &str) -> Principal {
        let user = UserAccount::new(
            username.to_string(),
            format!("{}@example.com", username),
            username[..1].to_uppercase() + &username[1..],
            "Tester".to_string(),
            None,
        )
        .unwrap();
        let salesperson = Salesperson::for_user(user.id, Some("+13055550100".to_string()));
        let mut profile = Profile::new(user.id, Role::Salesperson, None);
        profile.role = Role::parse(role_label);
        profile.role_label = role_label.to_string();

        let principal = Principal::new(user.id, username, Some(salesperson.id), profile.role);
        let mut state = self.state.lock().unwrap();
        state.users.push(user);
        state.salespeople.push(salesperson);
        state.profiles.push(profile);
        principal
    }

    pub fn add_customer(&self, name: &str, department: Department, salesperson_id: Uuid, sales: i64) -> Customer {
        let input = CustomerInput {
            name: name.to_string(),
            department,
            estimated_yearly_sales: sales,
            salesperson_id: None,
        };
        let customer = Customer::new(&input, salesperson_id, None).unwrap();
        self.state.lock().unwrap().customers.push(customer.clone());
        customer
    }

    pub fn add_contact(&self, customer_id: Uuid, name: &str, birthday: Option<(i32, i32)>, score: i32, active: bool) -> Contact {
        let input = ContactInput {
            name: name.to_string(),
            birthday_month: birthday.map(|b| b.0),
            birthday_day: birthday.map(|b| b.1),
            relationship_score: Some(score),
            is_active: Some(active),
            ..ContactInput::default()
        };
        let contact = Contact::new(customer_id, input, None).unwrap();
        self.state.lock().unwrap().contacts.push(contact.clone());
        contact
    }

    pub fn add_gift(&self, name: &str) -> Gift {
        let gift = Gift::new(
            &GiftInput {
                name: name.to_string(),
                description: None,
                min_yearly_sales: 0,
                min_relationship_score: 0,
            },
            None,
        )
        .unwrap();
        self.state.lock().unwrap().gifts.push(gift.clone());
        gift
    }

    pub fn user(&self, id: Uuid) -> Option<UserAccount> {
        self.state.lock().unwrap().users.iter().find(|u| u.id == id).cloned()
    }

    pub fn customer(&self, id: Uuid) -> Option<Customer> {
        self.state.lock().unwrap().customer(id).cloned()
    }

    pub fn assignment_count(&self) -> usize {
        self.state.lock().unwrap().assignments.len()
    }
}

fn not_found_user() -> DomainError {
    DomainError::UserNotFound
}

#[async_trait]
impl UserRepository for InMemoryCrm {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserAccount>, DomainError> {
        Ok(self.state.lock().unwrap().users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserAccount>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(login) || u.email.eq_ignore_ascii_case(login))
            .cloned())
    }

    async fn create_with_profile(
        &self,
        user: &UserAccount,
        salesperson: &Salesperson,
        profile: &Profile,
    ) -> Result<UserAccount, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.users.push(user.clone());
        state.salespeople.push(salesperson.clone());
        state.profiles.push(profile.clone());
        Ok(user.clone())
    }

    async fn update_password(&self, user_id: &Uuid, password_hash: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let user = state.users.iter_mut().find(|u| u.id == *user_id).ok_or_else(not_found_user)?;
        user.password_hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn record_login(&self, user_id: &Uuid) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let user = state.users.iter_mut().find(|u| u.id == *user_id).ok_or_else(not_found_user)?;
        user.last_login_at = Some(Utc::now());
        Ok(())
    }

    async fn find_profile(&self, user_id: &Uuid) -> Result<Option<Profile>, DomainError> {
        Ok(self.state.lock().unwrap().profiles.iter().find(|p| p.user_id == *user_id).cloned())
    }

    async fn update_role(&self, user_id: &Uuid, role: Role, modified_by: &Uuid) -> Result<Profile, DomainError> {
        let mut state = self.state.lock().unwrap();
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.user_id == *user_id)
            .ok_or_else(not_found_user)?;
        profile.change_role(role, *modified_by);
        Ok(profile.clone())
    }

    async fn load_principal(&self, user_id: &Uuid) -> Result<Option<Principal>, DomainError> {
        let state = self.state.lock().unwrap();
        let Some(user) = state.users.iter().find(|u| u.id == *user_id && u.is_active) else {
            return Ok(None);
        };
        let role = state.profiles.iter().find(|p| p.user_id == user.id).and_then(|p| p.role);
        let salesperson_id = state.salespeople.iter().find(|s| s.user_id == user.id).map(|s| s.id);
        Ok(Some(Principal::new(user.id, user.username.clone(), salesperson_id, role)))
    }
}

#[async_trait]
impl SalespersonRepository for InMemoryCrm {
    async fn find_summary(&self, id: &Uuid) -> Result<Option<SalespersonSummary>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.salespeople.iter().find(|s| s.id == *id).and_then(|s| state.summary(s)))
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<SalespersonSummary>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .salespeople
            .iter()
            .filter(|s| ids.contains(&s.id))
            .filter_map(|s| state.summary(s))
            .collect())
    }

    async fn list_with_customers(&self) -> Result<Vec<SalespersonSummary>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .salespeople
            .iter()
            .filter(|s| state.customers.iter().any(|c| c.salesperson_id == s.id))
            .filter_map(|s| state.summary(s))
            .collect())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCrm {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Customer>, DomainError> {
        Ok(self.state.lock().unwrap().customer(*id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .customers
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list(
        &self,
        scope: &AccessScope,
        filter: &CustomerFilter,
        pagination: &Pagination,
    ) -> Result<Page<CustomerListItem>, DomainError> {
        let state = self.state.lock().unwrap();
        let all = state.scoped_customers(scope, filter);
        let total = all.len() as i64;
        let items = all
            .iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .map(|c| state.list_item(c))
            .collect();
        Ok(Page::new(items, total, *pagination))
    }

    async fn list_all(&self, scope: &AccessScope, filter: &CustomerFilter) -> Result<Vec<CustomerListItem>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .scoped_customers(scope, filter)
            .iter()
            .map(|c| state.list_item(c))
            .collect())
    }

    async fn create(&self, customer: &Customer) -> Result<Customer, DomainError> {
        self.state.lock().unwrap().customers.push(customer.clone());
        Ok(customer.clone())
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, DomainError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .customers
            .iter_mut()
            .find(|c| c.id == customer.id)
            .ok_or(DomainError::CustomerNotFound(customer.id))?;
        *slot = customer.clone();
        Ok(customer.clone())
    }
}

#[async_trait]
impl ContactRepository for InMemoryCrm {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Contact>, DomainError> {
        Ok(self.state.lock().unwrap().contacts.iter().find(|c| c.id == *id).cloned())
    }

    async fn list(&self, scope: &AccessScope, filter: &ContactFilter) -> Result<Vec<ContactListItem>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contacts
            .iter()
            .filter_map(|contact| {
                let customer = state.customer(contact.customer_id)?;
                scope.permits_customer(customer).then(|| ContactListItem {
                    contact: contact.clone(),
                    customer_name: customer.name.clone(),
                    department: customer.department,
                    salesperson_id: customer.salesperson_id,
                    salesperson_name: state.salesperson_name(customer.salesperson_id),
                })
            })
            .filter(|item| item.matches(filter))
            .collect())
    }

    async fn list_for_customer(&self, customer_id: &Uuid) -> Result<Vec<Contact>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .contacts
            .iter()
            .filter(|c| c.customer_id == *customer_id)
            .cloned()
            .collect())
    }

    async fn find_birthdays(&self, month: u32, day: u32) -> Result<Vec<BirthdayContact>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contacts
            .iter()
            .filter(|c| c.is_active && c.birthday() == Some((month, day)))
            .filter_map(|contact| {
                let customer = state.customer(contact.customer_id)?;
                let salesperson = state.salespeople.iter().find(|s| s.id == customer.salesperson_id)?;
                Some(BirthdayContact {
                    contact: contact.clone(),
                    customer_name: customer.name.clone(),
                    salesperson: state.summary(salesperson)?,
                })
            })
            .collect())
    }

    async fn create(&self, contact: &Contact) -> Result<Contact, DomainError> {
        self.state.lock().unwrap().contacts.push(contact.clone());
        Ok(contact.clone())
    }

    async fn update(&self, contact: &Contact) -> Result<Contact, DomainError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .contacts
            .iter_mut()
            .find(|c| c.id == contact.id)
            .ok_or(DomainError::ContactNotFound(contact.id))?;
        *slot = contact.clone();
        Ok(contact.clone())
    }
}

#[async_trait]
impl GiftRepository for InMemoryCrm {
    async fn list_gifts(&self) -> Result<Vec<Gift>, DomainError> {
        Ok(self.state.lock().unwrap().gifts.clone())
    }

    async fn find_gift(&self, id: &Uuid) -> Result<Option<Gift>, DomainError> {
        Ok(self.state.lock().unwrap().gifts.iter().find(|g| g.id == *id).cloned())
    }

    async fn create_gift(&self, gift: &Gift) -> Result<Gift, DomainError> {
        self.state.lock().unwrap().gifts.push(gift.clone());
        Ok(gift.clone())
    }

    async fn list_seasons(&self) -> Result<Vec<GiftSeason>, DomainError> {
        Ok(self.state.lock().unwrap().seasons.clone())
    }

    async fn find_season(&self, id: &Uuid) -> Result<Option<GiftSeason>, DomainError> {
        Ok(self.state.lock().unwrap().seasons.iter().find(|s| s.id == *id).cloned())
    }

    async fn find_season_by_name(&self, name: &str) -> Result<Option<GiftSeason>, DomainError> {
        Ok(self.state.lock().unwrap().seasons.iter().find(|s| s.name == name).cloned())
    }

    async fn create_season(&self, season: &GiftSeason) -> Result<GiftSeason, DomainError> {
        self.state.lock().unwrap().seasons.push(season.clone());
        Ok(season.clone())
    }

    async fn ensure_assignments(&self, season_id: &Uuid, scope: &AccessScope, created_by: &Uuid) -> Result<u64, DomainError> {
        let mut state = self.state.lock().unwrap();
        let missing: Vec<Uuid> = state
            .contacts
            .iter()
            .filter(|c| c.is_active)
            .filter(|c| state.customer(c.customer_id).is_some_and(|cu| scope.permits_customer(cu)))
            .filter(|c| {
                !state
                    .assignments
                    .iter()
                    .any(|a| a.contact_id == c.id && a.season_id == *season_id)
            })
            .map(|c| c.id)
            .collect();
        for contact_id in &missing {
            state
                .assignments
                .push(GiftAssignment::open(*contact_id, *season_id, Some(*created_by)));
        }
        Ok(missing.len() as u64)
    }

    async fn list_plan(&self, season_id: &Uuid, scope: &AccessScope) -> Result<Vec<GiftPlanRow>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .assignments
            .iter()
            .filter(|a| a.season_id == *season_id)
            .filter_map(|a| {
                let contact = state.contacts.iter().find(|c| c.id == a.contact_id)?;
                let customer = state.customer(contact.customer_id)?;
                if !scope.permits_customer(customer) {
                    return None;
                }
                let gift = a.gift_id.and_then(|g| state.gifts.iter().find(|x| x.id == g));
                Some(GiftPlanRow {
                    assignment_id: a.id,
                    contact_id: contact.id,
                    contact_name: contact.name.clone(),
                    customer_id: customer.id,
                    customer_name: customer.name.clone(),
                    department: customer.department,
                    salesperson_name: state.salesperson_name(customer.salesperson_id),
                    estimated_yearly_sales: customer.estimated_yearly_sales,
                    relationship_score: contact.relationship_score,
                    gift_id: a.gift_id,
                    gift_name: gift.map(|g| g.name.clone()),
                    status: a.status,
                    note: a.note.clone(),
                })
            })
            .collect())
    }

    async fn find_assignment(&self, id: &Uuid) -> Result<Option<GiftAssignment>, DomainError> {
        Ok(self.state.lock().unwrap().assignments.iter().find(|a| a.id == *id).cloned())
    }

    async fn update_assignment(&self, assignment: &GiftAssignment) -> Result<GiftAssignment, DomainError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment.id)
            .ok_or(DomainError::GiftAssignmentNotFound(assignment.id))?;
        *slot = assignment.clone();
        Ok(assignment.clone())
    }
}

#[async_trait]
impl PasswordTokenRepository for InMemoryCrm {
    async fn create(&self, token: &PasswordSetToken) -> Result<(), DomainError> {
        self.state.lock().unwrap().tokens.push(token.clone());
        Ok(())
    }

    async fn find_by_digest(&self, digest: &str) -> Result<Option<PasswordSetToken>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tokens
            .iter()
            .find(|t| t.token_digest == digest)
            .cloned())
    }

    async fn consume(&self, token_id: &Uuid, user_id: &Uuid, password_hash: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let token = state
            .tokens
            .iter_mut()
            .find(|t| t.id == *token_id && t.used_at.is_none())
            .ok_or(DomainError::InvalidPasswordToken)?;
        token.used_at = Some(Utc::now());
        let user = state.users.iter_mut().find(|u| u.id == *user_id).ok_or_else(not_found_user)?;
        user.password_hash = Some(password_hash.to_string());
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for InMemoryCrm {
    async fn sales_summary(&self, scope: &AccessScope, filter: &CustomerFilter) -> Result<SalesSummary, DomainError> {
        let state = self.state.lock().unwrap();
        let customers = state.scoped_customers(scope, filter);
        let ids: HashSet<Uuid> = customers.iter().map(|c| c.id).collect();
        let active = state.contacts_of(&ids, true);
        Ok(SalesSummary {
            total_sales: customers.iter().map(|c| c.estimated_yearly_sales).sum(),
            customer_count: customers.len() as i64,
            active_contacts: active.len() as i64,
            average_relationship_score: average(active.iter().map(|c| c.relationship_score)),
        })
    }

    async fn top_customers(&self, scope: &AccessScope, filter: &CustomerFilter, limit: i64) -> Result<Vec<TopCustomer>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut customers = state.scoped_customers(scope, filter);
        customers.sort_by(|a, b| b.estimated_yearly_sales.cmp(&a.estimated_yearly_sales));
        Ok(customers
            .iter()
            .take(limit as usize)
            .map(|c| {
                let ids = HashSet::from([c.id]);
                let active = state.contacts_of(&ids, true);
                TopCustomer {
                    id: c.id,
                    name: c.name.clone(),
                    department: c.department,
                    salesperson_name: state.salesperson_name(c.salesperson_id),
                    estimated_yearly_sales: c.estimated_yearly_sales,
                    active_contacts: active.len() as i64,
                    average_relationship_score: average(active.iter().map(|x| x.relationship_score)),
                }
            })
            .collect())
    }

    async fn user_performance(&self) -> Result<Vec<PerformanceRow>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .iter()
            .filter_map(|p| {
                let user = state.users.iter().find(|u| u.id == p.user_id)?;
                let sp = state.salespeople.iter().find(|s| s.user_id == user.id);
                let customers = state
                    .customers
                    .iter()
                    .filter(|c| sp.is_some_and(|s| s.id == c.salesperson_id))
                    .collect();
                Some(state.performance(user, p.role_label.clone(), customers))
            })
            .collect())
    }

    async fn department_performance(&self, department: Department) -> Result<Vec<PerformanceRow>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .salespeople
            .iter()
            .filter_map(|s| {
                let customers: Vec<&Customer> = state
                    .customers
                    .iter()
                    .filter(|c| c.salesperson_id == s.id && c.department == department)
                    .collect();
                if customers.is_empty() {
                    return None;
                }
                let user = state.users.iter().find(|u| u.id == s.user_id)?;
                Some(state.performance(user, Role::Salesperson.label(), customers))
            })
            .collect())
    }
}

/// Ledger backed by a set.
#[derive(Default)]
pub struct InMemoryLedger {
    sent: Mutex<HashSet<DispatchKey>>,
}

#[async_trait]
impl DispatchLedger for InMemoryLedger {
    async fn has_sent(&self, key: &DispatchKey) -> Result<bool, DomainError> {
        Ok(self.sent.lock().unwrap().contains(key))
    }

    async fn record(&self, key: &DispatchKey) -> Result<(), DomainError> {
        self.sent.lock().unwrap().insert(key.clone());
        Ok(())
    }
}

/// Contact store that only answers birthday lookups.
pub struct InMemoryContacts {
    birthdays: Vec<BirthdayContact>,
}

impl InMemoryContacts {
    pub fn with_birthdays(birthdays: Vec<BirthdayContact>) -> Self {
        Self { birthdays }
    }
}

#[async_trait]
impl ContactRepository for InMemoryContacts {
    async fn find_by_id(&self, _id: &Uuid) -> Result<Option<Contact>, DomainError> {
        Ok(None)
    }

    async fn list(&self, _scope: &AccessScope, _filter: &ContactFilter) -> Result<Vec<ContactListItem>, DomainError> {
        Ok(Vec::new())
    }

    async fn list_for_customer(&self, _customer_id: &Uuid) -> Result<Vec<Contact>, DomainError> {
        Ok(Vec::new())
    }

    async fn find_birthdays(&self, month: u32, day: u32) -> Result<Vec<BirthdayContact>, DomainError> {
        Ok(self
            .birthdays
            .iter()
            .filter(|b| b.contact.is_active && b.contact.birthday() == Some((month, day)))
            .cloned()
            .collect())
    }

    async fn create(&self, contact: &Contact) -> Result<Contact, DomainError> {
        Ok(contact.clone())
    }

    async fn update(&self, contact: &Contact) -> Result<Contact, DomainError> {
        Ok(contact.clone())
    }
}

/// Active contact with a phone and no email, owned by a fresh salesperson.
pub fn birthday_contact(month: i32, day: i32, salesperson_email: Option<&str>, salesperson_phone: Option<&str>) -> BirthdayContact {
    let contact = Contact::new(
        Uuid::new_v4(),
        ContactInput {
            name: "Lucia Mendez".to_string(),
            phone: Some("+13055550199".to_string()),
            birthday_month: Some(month),
            birthday_day: Some(day),
            ..ContactInput::default()
        },
        None,
    )
    .unwrap();
    BirthdayContact {
        contact,
        customer_name: "Rose Garden".to_string(),
        salesperson: SalespersonSummary {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            username: "ana".to_string(),
            first_name: "Ana".to_string(),
            full_name: "Ana Ruiz".to_string(),
            email: salesperson_email.map(String::from),
            phone: salesperson_phone.map(String::from),
        },
    }
}

/// Email sender that keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
