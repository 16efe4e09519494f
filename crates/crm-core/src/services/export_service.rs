//! CSV exports of the principal's customers and contacts

use std::sync::Arc;

use tracing::info;

use crate::access::{AccessScope, Principal};
use crate::domain::{ContactFilter, CustomerFilter};
use crate::error::DomainError;
use crate::repositories::{ContactRepository, CustomerRepository};
use crm_shared::constants::{NOT_AVAILABLE, NOT_PROVIDED};
use crm_shared::utils::{format_currency, month_name};

const CONTACT_HEADERS: [&str; 9] = [
    "Name",
    "Phone",
    "Email",
    "Customer",
    "Department",
    "Relationship Score",
    "Birthday Month",
    "Birthday Day",
    "Salesperson",
];

const CUSTOMER_HEADERS: [&str; 4] = ["Name", "Department", "Estimated Yearly Sales", "Salesperson"];

fn export_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::ExportError(e.to_string())
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    crm_shared::utils::non_blank(value).unwrap_or(placeholder).to_string()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, DomainError> {
    let bytes = writer.into_inner().map_err(export_err)?;
    String::from_utf8(bytes).map_err(export_err)
}

pub struct ExportService {
    customers: Arc<dyn CustomerRepository>,
    contacts: Arc<dyn ContactRepository>,
}

impl ExportService {
    pub fn new(customers: Arc<dyn CustomerRepository>, contacts: Arc<dyn ContactRepository>) -> Self {
        Self { customers, contacts }
    }

    pub async fn contacts_csv(&self, principal: &Principal, filter: &ContactFilter) -> Result<String, DomainError> {
        let scope = AccessScope::for_principal(principal);
        let rows = if scope.is_empty() {
            Vec::new()
        } else {
            self.contacts.list(&scope, filter).await?
        };

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record(CONTACT_HEADERS).map_err(export_err)?;
        for row in &rows {
            let contact = &row.contact;
            let month = contact
                .birthday_month
                .and_then(|m| u32::try_from(m).ok())
                .and_then(month_name)
                .unwrap_or(NOT_PROVIDED);
            let day = contact
                .birthday_day
                .map(|d| d.to_string())
                .unwrap_or_else(|| NOT_PROVIDED.to_string());
            writer
                .write_record([
                    contact.name.clone(),
                    or_placeholder(contact.phone.as_deref(), NOT_AVAILABLE),
                    or_placeholder(contact.email.as_deref(), NOT_AVAILABLE),
                    row.customer_name.clone(),
                    row.department.display_name().to_string(),
                    contact.relationship_score.to_string(),
                    month.to_string(),
                    day,
                    or_placeholder(Some(&row.salesperson_name), NOT_AVAILABLE),
                ])
                .map_err(export_err)?;
        }
        info!(user_id = %principal.user_id, rows = rows.len(), "Contacts exported");
        finish(writer)
    }

    pub async fn customers_csv(&self, principal: &Principal, filter: &CustomerFilter) -> Result<String, DomainError> {
        let scope = AccessScope::for_principal(principal);
        let rows = if scope.is_empty() {
            Vec::new()
        } else {
            self.customers.list_all(&scope, filter).await?
        };

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record(CUSTOMER_HEADERS).map_err(export_err)?;
        for row in &rows {
            writer
                .write_record([
                    row.name.clone(),
                    row.department.display_name().to_string(),
                    format_currency(row.estimated_yearly_sales),
                    or_placeholder(Some(&row.salesperson_name), NOT_AVAILABLE),
                ])
                .map_err(export_err)?;
        }
        info!(user_id = %principal.user_id, rows = rows.len(), "Customers exported");
        finish(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContactInput, ContactStatusFilter, Department};
    use crate::testing::InMemoryCrm;
    use crm_shared::Pagination;

    fn parse(csv_text: &str) -> Vec<Vec<String>> {
        csv::Reader::from_reader(csv_text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_contact_export_placeholders() {
        let store = Arc::new(InMemoryCrm::new());
        let ana = store.add_user("ana", "Salesperson");
        let customer = store.add_customer("Bloom", Department::Ecommerce, ana.salesperson_id.unwrap(), 5);
        let half = crate::domain::Contact::new(
            customer.id,
            ContactInput {
                name: "Half Birthday".to_string(),
                birthday_month: Some(3),
                ..ContactInput::default()
            },
            None,
        )
        .unwrap();
        ContactRepository::create(store.as_ref(), &half).await.unwrap();

        let export = ExportService::new(store.clone(), store.clone());
        let text = export.contacts_csv(&ana, &ContactFilter::default()).await.unwrap();
        assert!(text.starts_with("Name,Phone,Email,Customer,Department,Relationship Score,Birthday Month,Birthday Day,Salesperson"));
        let rows = parse(&text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], NOT_AVAILABLE);
        assert_eq!(rows[0][2], NOT_AVAILABLE);
        assert_eq!(rows[0][4], "Ecommerce");
        assert_eq!(rows[0][6], "March");
        assert_eq!(rows[0][7], NOT_PROVIDED);
        assert_eq!(rows[0][8], "Ana Tester");
    }

    #[tokio::test]
    async fn test_customer_export_matches_scoped_count() {
        let store = Arc::new(InMemoryCrm::new());
        let mgr = store.add_user("mia", "Manager - Wholesale");
        let ana = store.add_user("ana", "Salesperson");
        let sp = ana.salesperson_id.unwrap();
        store.add_customer("W1", Department::Wholesale, sp, 1_500);
        store.add_customer("W2", Department::Wholesale, sp, 20);
        store.add_customer("E1", Department::Ecommerce, sp, 1000);

        let export = ExportService::new(store.clone(), store.clone());
        let rows = parse(&export.customers_csv(&mgr, &CustomerFilter::default()).await.unwrap());
        let scoped = CustomerRepository::list(
            store.as_ref(),
            &AccessScope::for_principal(&mgr),
            &CustomerFilter::default(),
            &Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(rows.len() as i64, scoped.total);
        assert_eq!(rows[0], vec!["W1", "Wholesale", "$1,500", "Ana Tester"]);
    }

    #[tokio::test]
    async fn test_manager_contact_export_matches_scoped_list() {
        let store = Arc::new(InMemoryCrm::new());
        let mgr = store.add_user("mia", "Manager - Wholesale");
        let ana = store.add_user("ana", "Salesperson");
        let sp = ana.salesperson_id.unwrap();
        let w1 = store.add_customer("W1", Department::Wholesale, sp, 100);
        let w2 = store.add_customer("W2", Department::Wholesale, sp, 200);
        let e1 = store.add_customer("E1", Department::Ecommerce, sp, 300);
        store.add_contact(w1.id, "Rosa", Some((6, 15)), 4, true);
        store.add_contact(w1.id, "Lily", None, 1, false);
        store.add_contact(w2.id, "Iris", Some((1, 2)), 5, true);
        store.add_contact(e1.id, "Dahlia", Some((3, 4)), 3, true);

        let export = ExportService::new(store.clone(), store.clone());
        let scope = AccessScope::for_principal(&mgr);
        for filter in [
            ContactFilter::default(),
            ContactFilter {
                status: ContactStatusFilter::Active,
                ..ContactFilter::default()
            },
        ] {
            let rows = parse(&export.contacts_csv(&mgr, &filter).await.unwrap());
            let scoped = ContactRepository::list(store.as_ref(), &scope, &filter).await.unwrap();
            assert_eq!(rows.len(), scoped.len());

            let mut exported: Vec<String> = rows.iter().map(|r| r[0].clone()).collect();
            let mut expected: Vec<String> = scoped.iter().map(|c| c.contact.name.clone()).collect();
            exported.sort();
            expected.sort();
            assert_eq!(exported, expected);
            assert!(rows.iter().all(|r| r[4] == "Wholesale"));
        }

        let all = parse(&export.contacts_csv(&mgr, &ContactFilter::default()).await.unwrap());
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_unrecognized_role_exports_header_only() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        store.add_customer("W1", Department::Wholesale, exec.salesperson_id.unwrap(), 1);
        let odd = store.add_user("odd", "Manager - Nowhere");
        let export = ExportService::new(store.clone(), store.clone());
        let text = export.customers_csv(&odd, &CustomerFilter::default()).await.unwrap();
        assert!(parse(&text).is_empty());
    }
}
