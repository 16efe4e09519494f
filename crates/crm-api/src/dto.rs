// ============================================================================
// CRM API - Request & Response DTOs
// File: crates/crm-api/src/dto.rs
// ============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crm_core::domain::customer::parse_sales_figure;
use crm_core::domain::{
    ContactFilter, ContactListItem, ContactStatusFilter, CustomerFilter, CustomerInput, Department,
};
use crm_core::error::DomainError;
use crm_core::services::ContactGroup;
use crm_shared::Pagination;

/// Login payload. `login` accepts either the username or the email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub department: Option<Department>,
    pub salesperson_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CustomerQuery {
    pub fn filter(&self) -> CustomerFilter {
        CustomerFilter {
            department: self.department,
            salesperson_id: self.salesperson_id,
            search: self.search.clone(),
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

/// Sales figure as typed into a form: a JSON number or text such as `"$1,250,000"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SalesFigure {
    Amount(i64),
    Text(String),
}

impl SalesFigure {
    pub fn value(&self) -> Result<i64, DomainError> {
        match self {
            SalesFigure::Amount(v) => Ok(*v),
            SalesFigure::Text(raw) => parse_sales_figure(raw),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    #[serde(default)]
    pub department: Department,
    pub estimated_yearly_sales: SalesFigure,
    #[serde(default)]
    pub salesperson_id: Option<Uuid>,
}

impl TryFrom<CustomerRequest> for CustomerInput {
    type Error = DomainError;

    fn try_from(request: CustomerRequest) -> Result<Self, Self::Error> {
        Ok(CustomerInput {
            estimated_yearly_sales: request.estimated_yearly_sales.value()?,
            name: request.name,
            department: request.department,
            salesperson_id: request.salesperson_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    pub department: Option<Department>,
    pub salesperson_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub status: ContactStatusFilter,
    pub search: Option<String>,
    /// Group the result by department.
    #[serde(default)]
    pub grouped: bool,
}

impl ContactQuery {
    pub fn filter(&self) -> ContactFilter {
        ContactFilter {
            department: self.department,
            salesperson_id: self.salesperson_id,
            customer_id: self.customer_id,
            status: self.status,
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ContactListing {
    Flat(Vec<ContactListItem>),
    Grouped(Vec<ContactGroup>),
}

#[derive(Debug, Deserialize)]
pub struct WelcomeEmailsRequest {
    pub salesperson_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_request_accepts_text_sales() {
        let request: CustomerRequest = serde_json::from_value(json!({
            "name": "Rose Garden",
            "department": "wholesale",
            "estimated_yearly_sales": "$1,250,000"
        }))
        .unwrap();
        let input = CustomerInput::try_from(request).unwrap();
        assert_eq!(input.estimated_yearly_sales, 1_250_000);
        assert_eq!(input.department, Department::Wholesale);
    }

    #[test]
    fn test_customer_request_rejects_malformed_sales() {
        let request: CustomerRequest = serde_json::from_value(json!({
            "name": "Rose Garden",
            "estimated_yearly_sales": "lots"
        }))
        .unwrap();
        assert!(matches!(
            CustomerInput::try_from(request),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_login_request_aliases() {
        let by_email: LoginRequest =
            serde_json::from_value(json!({ "email": "maria@example.com", "password": "x" })).unwrap();
        assert_eq!(by_email.login, "maria@example.com");
        let by_username: LoginRequest =
            serde_json::from_value(json!({ "username": "maria", "password": "x" })).unwrap();
        assert_eq!(by_username.login, "maria");
    }
}
