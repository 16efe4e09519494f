//! Salesperson entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Salesperson entity (1:1 with a user account, created at signup)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salesperson {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: Option<String>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl Salesperson {
    pub fn for_user(user_id: Uuid, phone: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            phone,
            created_at: Utc::now(),
            created_by: None,
            modified_at: None,
            modified_by: None,
        }
    }
}

/// Salesperson joined with the account fields needed for display and notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalespersonSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl SalespersonSummary {
    /// Email is usable when present and shaped like an address.
    pub fn usable_email(&self) -> Option<&str> {
        crm_shared::utils::non_blank(self.email.as_deref()).filter(|e| e.contains('@'))
    }

    pub fn usable_phone(&self) -> Option<&str> {
        crm_shared::utils::non_blank(self.phone.as_deref())
    }

    /// Name used in greetings: first name, else the full name.
    pub fn greeting_name(&self) -> &str {
        if self.first_name.trim().is_empty() {
            &self.full_name
        } else {
            &self.first_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(email: Option<&str>, phone: Option<&str>) -> SalespersonSummary {
        SalespersonSummary {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            username: "ana".to_string(),
            first_name: "Ana".to_string(),
            full_name: "Ana Ruiz".to_string(),
            email: email.map(String::from),
            phone: phone.map(String::from),
        }
    }

    #[test]
    fn test_usable_email() {
        assert_eq!(summary(Some("ana@example.com"), None).usable_email(), Some("ana@example.com"));
        assert_eq!(summary(Some("  "), None).usable_email(), None);
        assert_eq!(summary(Some("ana"), None).usable_email(), None);
        assert_eq!(summary(None, None).usable_email(), None);
    }

    #[test]
    fn test_usable_phone() {
        assert_eq!(summary(None, Some("+13055550100")).usable_phone(), Some("+13055550100"));
        assert_eq!(summary(None, Some("")).usable_phone(), None);
    }
}
