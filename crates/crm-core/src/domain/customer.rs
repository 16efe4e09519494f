// ============================================================================
// CRM Core - Customer Entity
// File: crates/crm-core/src/domain/customer.rs
// Description: Customer accounts owned by a salesperson, tagged by department
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Department;
use crate::error::DomainError;

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub department: Department,
    pub salesperson_id: Uuid,
    pub estimated_yearly_sales: i64,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

/// Submitted customer form. `salesperson_id` is honoured only where the role allows it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 255, message = "Customer name must be between 1 and 255 characters"))]
    pub name: String,

    #[serde(default)]
    pub department: Department,

    #[validate(range(min = 0, message = "Estimated yearly sales cannot be negative"))]
    pub estimated_yearly_sales: i64,

    #[serde(default)]
    pub salesperson_id: Option<Uuid>,
}

impl CustomerInput {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

impl Customer {
    pub fn new(
        input: &CustomerInput,
        salesperson_id: Uuid,
        created_by: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            department: input.department,
            salesperson_id,
            estimated_yearly_sales: input.estimated_yearly_sales,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        })
    }

    pub fn apply(
        &mut self,
        input: &CustomerInput,
        salesperson_id: Uuid,
        modified_by: Uuid,
    ) -> Result<(), DomainError> {
        input.validate()?;
        self.name = input.name.trim().to_string();
        self.department = input.department;
        self.estimated_yearly_sales = input.estimated_yearly_sales;
        self.salesperson_id = salesperson_id;
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
        Ok(())
    }
}

/// Parses a sales figure as typed into a form: `1250000`, `1,250,000` or `$1,250,000`.
pub fn parse_sales_figure(raw: &str) -> Result<i64, DomainError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    let value: i64 = cleaned
        .parse()
        .map_err(|_| DomainError::ValidationError(format!("Invalid sales figure: {}", raw)))?;
    if value < 0 {
        return Err(DomainError::ValidationError(
            "Estimated yearly sales cannot be negative".to_string(),
        ));
    }
    Ok(value)
}

/// Optional list filters applied on top of the role scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerFilter {
    pub department: Option<Department>,
    pub salesperson_id: Option<Uuid>,
    pub search: Option<String>,
}

impl CustomerFilter {
    pub fn search_term(&self) -> Option<&str> {
        crm_shared::utils::non_blank(self.search.as_deref())
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        self.department.map_or(true, |d| customer.department == d)
            && self.salesperson_id.map_or(true, |s| customer.salesperson_id == s)
            && self
                .search_term()
                .map_or(true, |term| customer.name.to_lowercase().contains(&term.to_lowercase()))
    }
}

/// Customer row as listed and exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerListItem {
    pub id: Uuid,
    pub name: String,
    pub department: Department,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    pub estimated_yearly_sales: i64,
}
