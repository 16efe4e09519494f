//! Bulk load of salespeople, customers and contacts from a spreadsheet export

use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::customer::parse_sales_figure;
use crate::domain::{Contact, ContactInput, Customer, CustomerInput, Department};
use crate::error::DomainError;
use crate::repositories::{ContactRepository, CustomerRepository, UserRepository};
use crate::services::UserService;
use crm_shared::utils::{month_name, non_blank};

const REQUIRED_COLUMNS: [&str; 6] = [
    "Salesperson Name",
    "salesperson_email",
    "customer",
    "yearly_sales_estimate",
    "first_name",
    "last_name",
];

/// One spreadsheet row. Column names follow the legacy CRM export.
#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(rename = "Salesperson Name")]
    salesperson_name: String,
    salesperson_email: String,
    salesperson_phone: Option<String>,
    customer: String,
    #[serde(default)]
    department: Option<String>,
    yearly_sales_estimate: Option<String>,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    birthday_month: Option<String>,
    birthday_day: Option<String>,
    #[serde(rename = "relationship_score_1_to_5")]
    relationship_score: Option<String>,
    is_active: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    /// 1-based line in the file, header included.
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub rows: usize,
    pub salespeople_created: usize,
    pub customers_created: usize,
    pub contacts_created: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ImportService {
    users: UserService,
    customers: Arc<dyn CustomerRepository>,
    contacts: Arc<dyn ContactRepository>,
}

impl ImportService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        customers: Arc<dyn CustomerRepository>,
        contacts: Arc<dyn ContactRepository>,
    ) -> Self {
        Self {
            users: UserService::new(users),
            customers,
            contacts,
        }
    }

    /// Imports every row it can. A bad row is recorded and skipped; a file
    /// missing required columns is rejected before anything is written.
    pub async fn import_csv<R: Read>(&self, reader: R) -> Result<ImportReport, DomainError> {
        let rows = read_rows(reader)?;
        let mut report = ImportReport {
            rows: rows.len(),
            ..ImportReport::default()
        };

        for (line, row) in rows {
            let outcome = match row {
                Ok(row) => self.import_row(row, &mut report).await,
                Err(message) => Err(DomainError::ValidationError(message)),
            };
            if let Err(e) = outcome {
                warn!(line, "Import row skipped: {}", e);
                report.failures.push(ImportFailure {
                    line,
                    message: e.to_string(),
                });
            }
        }

        info!(
            rows = report.rows,
            contacts = report.contacts_created,
            failures = report.failures.len(),
            "CRM import finished"
        );
        Ok(report)
    }

    async fn import_row(&self, row: ImportRow, report: &mut ImportReport) -> Result<(), DomainError> {
        let (owner, created) = self
            .users
            .provision_salesperson(&row.salesperson_email, &row.salesperson_name, row.salesperson_phone.as_deref())
            .await?;
        if created {
            report.salespeople_created += 1;
        }
        let salesperson_id = owner
            .salesperson_id
            .ok_or_else(|| DomainError::ValidationError("Salesperson record missing".to_string()))?;

        let customer = self.customer_for(&row, salesperson_id, report).await?;

        let input = ContactInput {
            name: format!("{} {}", row.first_name.trim(), row.last_name.trim()).trim().to_string(),
            phone: row.phone.clone(),
            email: row.email.clone(),
            address: compose_address(&row),
            birthday_month: row.birthday_month.as_deref().map(parse_month).transpose()?,
            birthday_day: row.birthday_day.as_deref().map(|d| parse_whole(d, "birthday day")).transpose()?,
            relationship_score: row
                .relationship_score
                .as_deref()
                .map(|s| parse_whole(s, "relationship score"))
                .transpose()?,
            is_active: Some(row.is_active.as_deref().map_or(true, parse_flag)),
            customer_id: Some(customer.id),
        };
        let contact = Contact::new(customer.id, input, None)?;
        let contact = self.contacts.create(&contact).await?;
        report.contacts_created += 1;
        info!(contact_id = %contact.id, "Imported {} under {}", contact.name, customer.name);
        Ok(())
    }

    /// Existing customers are matched by name and left untouched.
    async fn customer_for(
        &self,
        row: &ImportRow,
        salesperson_id: Uuid,
        report: &mut ImportReport,
    ) -> Result<Customer, DomainError> {
        if let Some(existing) = self.customers.find_by_name(row.customer.trim()).await? {
            return Ok(existing);
        }

        let input = CustomerInput {
            name: row.customer.clone(),
            department: parse_department(row.department.as_deref())?,
            estimated_yearly_sales: match non_blank(row.yearly_sales_estimate.as_deref()) {
                Some(raw) => parse_sales_figure(raw.trim_end_matches(".0"))?,
                None => 0,
            },
            salesperson_id: Some(salesperson_id),
        }
        .normalized();
        let customer = Customer::new(&input, salesperson_id, None)?;
        let customer = self.customers.create(&customer).await?;
        report.customers_created += 1;
        Ok(customer)
    }
}

fn read_rows<R: Read>(reader: R) -> Result<Vec<(u64, Result<ImportRow, String>)>, DomainError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| DomainError::ValidationError(format!("Unreadable header row: {}", e)))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::ValidationError(format!(
            "Missing columns: {}",
            missing.join(", ")
        )));
    }

    Ok(reader
        .records()
        .enumerate()
        .map(|(index, record)| match record {
            Ok(record) => {
                let line = record.position().map_or(index as u64 + 2, |p| p.line());
                (line, record.deserialize(Some(&headers)).map_err(|e| e.to_string()))
            }
            Err(e) => {
                let line = e.position().map_or(index as u64 + 2, |p| p.line());
                (line, Err(e.to_string()))
            }
        })
        .collect())
}

fn compose_address(row: &ImportRow) -> Option<String> {
    let state_zip = [row.state.as_deref(), row.zip_code.as_deref()]
        .into_iter()
        .filter_map(non_blank)
        .collect::<Vec<_>>()
        .join(" ");
    let parts: Vec<&str> = [row.address.as_deref(), row.city.as_deref(), Some(state_zip.as_str())]
        .into_iter()
        .filter_map(non_blank)
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn parse_department(raw: Option<&str>) -> Result<Department, DomainError> {
    let Some(raw) = non_blank(raw) else {
        return Ok(Department::default());
    };
    raw.parse::<Department>()
        .ok()
        .or_else(|| Department::from_display_name(raw))
        .ok_or_else(|| DomainError::ValidationError(format!("Unknown department: {}", raw)))
}

/// Spreadsheet numbers often arrive as `6.0`.
fn parse_whole(raw: &str, field: &str) -> Result<i32, DomainError> {
    raw.trim()
        .trim_end_matches(".0")
        .parse()
        .map_err(|_| DomainError::ValidationError(format!("Invalid {}: {}", field, raw)))
}

/// Month number or English name, full or abbreviated.
fn parse_month(raw: &str) -> Result<i32, DomainError> {
    if let Ok(month) = parse_whole(raw, "birthday month") {
        return Ok(month);
    }
    let wanted = raw.trim().to_lowercase();
    (1..=12u32)
        .find(|m| {
            month_name(*m).is_some_and(|name| {
                let name = name.to_lowercase();
                name == wanted || (wanted.len() >= 3 && name.starts_with(&wanted))
            })
        })
        .map(|m| m as i32)
        .ok_or_else(|| DomainError::ValidationError(format!("Invalid birthday month: {}", raw)))
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "n" | "inactive"
    )
}
