// ============================================================================
// CRM Core - Contact Entity
// File: crates/crm-core/src/domain/contact.rs
// Description: People at a customer, with optional birthday and closeness score
// ============================================================================

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{Department, SalespersonSummary};
use crate::error::DomainError;
use crm_shared::constants::NOT_PROVIDED;
use crm_shared::utils::{month_name, non_blank};

/// E.164: `+`, country code, up to 15 digits.
pub static INTERNATIONAL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{7,14}$").expect("valid phone regex"));

/// Contact entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birthday_month: Option<i32>,
    pub birthday_day: Option<i32>,
    pub relationship_score: i32,
    pub is_active: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl Contact {
    pub fn new(
        customer_id: Uuid,
        input: ContactInput,
        created_by: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        let input = input.normalized();
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            name: input.name,
            phone: input.phone,
            email: input.email,
            address: input.address,
            birthday_month: input.birthday_month,
            birthday_day: input.birthday_day,
            relationship_score: input.relationship_score.unwrap_or(0),
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        })
    }

    /// Overwrites the editable fields. The owning customer never changes here.
    pub fn apply(&mut self, input: ContactInput, modified_by: Uuid) -> Result<(), DomainError> {
        let input = input.normalized();
        input.validate()?;
        self.name = input.name;
        self.phone = input.phone;
        self.email = input.email;
        self.address = input.address;
        self.birthday_month = input.birthday_month;
        self.birthday_day = input.birthday_day;
        self.relationship_score = input.relationship_score.unwrap_or(self.relationship_score);
        self.is_active = input.is_active.unwrap_or(self.is_active);
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
        Ok(())
    }

    /// Month and day, only when both are set.
    pub fn birthday(&self) -> Option<(u32, u32)> {
        match (self.birthday_month, self.birthday_day) {
            (Some(m), Some(d)) if m > 0 && d > 0 => Some((m as u32, d as u32)),
            _ => None,
        }
    }

    pub fn birthday_display(&self) -> String {
        self.birthday()
            .and_then(|(m, d)| month_name(m).map(|name| format!("{}, {}", name, d)))
            .unwrap_or_else(|| NOT_PROVIDED.to_string())
    }

    /// Exact month/day match for an active contact. Feb 29 only matches on Feb 29.
    pub fn is_birthday_on(&self, date: NaiveDate) -> bool {
        self.is_active && self.birthday() == Some((date.month(), date.day()))
    }

    /// Days from `today` to the next occurrence of the birthday (0 when today).
    pub fn days_until_birthday(&self, today: NaiveDate) -> Option<i64> {
        let (month, day) = self.birthday()?;
        [today.year(), today.year() + 1]
            .into_iter()
            .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
            .find(|date| *date >= today)
            .map(|date| (date - today).num_days())
    }

    pub fn usable_phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    pub fn usable_email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// `https://wa.me/<digits>` deep link when the contact has a phone.
    pub fn whatsapp_link(&self) -> Option<String> {
        self.usable_phone().map(|phone| {
            let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
            format!("https://wa.me/{}", digits)
        })
    }

    pub fn mailto_link(&self) -> Option<String> {
        self.usable_email().map(|email| format!("mailto:{}", email))
    }
}

/// Submitted contact form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_birthday"))]
pub struct ContactInput {
    #[validate(length(min = 1, max = 255, message = "Contact name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(regex(path = *INTERNATIONAL_PHONE, message = "Phone must be in international format, e.g. +13055550123"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(max = 2000, message = "Address too long"))]
    pub address: Option<String>,

    #[validate(range(min = 1, max = 12, message = "Birthday month must be between 1 and 12"))]
    pub birthday_month: Option<i32>,

    #[validate(range(min = 1, max = 31, message = "Birthday day must be between 1 and 31"))]
    pub birthday_day: Option<i32>,

    #[validate(range(min = 0, max = 5, message = "Relationship score must be between 0 and 5"))]
    pub relationship_score: Option<i32>,

    pub is_active: Option<bool>,

    /// Target customer on creation; ignored on edit.
    pub customer_id: Option<Uuid>,
}

impl ContactInput {
    /// Trims text, drops blank optionals and strips phone punctuation.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.phone = non_blank(self.phone.as_deref()).map(normalize_phone);
        self.email = non_blank(self.email.as_deref()).map(str::to_lowercase);
        self.address = non_blank(self.address.as_deref()).map(String::from);
        self
    }
}

/// Strips the punctuation people type into phone numbers.
pub fn normalize_phone(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}

fn validate_birthday(input: &ContactInput) -> Result<(), ValidationError> {
    let (Some(month), Some(day)) = (input.birthday_month, input.birthday_day) else {
        return Ok(());
    };
    let max_day = match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };
    if day > max_day {
        let mut err = ValidationError::new("invalid_birthday");
        err.message = Some(format!("Day {} does not exist in month {}", day, month).into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl ContactStatusFilter {
    pub fn matches(&self, is_active: bool) -> bool {
        match self {
            ContactStatusFilter::All => true,
            ContactStatusFilter::Active => is_active,
            ContactStatusFilter::Inactive => !is_active,
        }
    }

    /// The `is_active` value to filter on, `None` for all contacts.
    pub fn as_active_flag(&self) -> Option<bool> {
        match self {
            ContactStatusFilter::All => None,
            ContactStatusFilter::Active => Some(true),
            ContactStatusFilter::Inactive => Some(false),
        }
    }
}

/// Optional list filters applied on top of the role scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactFilter {
    pub department: Option<Department>,
    pub salesperson_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub status: ContactStatusFilter,
    pub search: Option<String>,
}

impl ContactFilter {
    pub fn active() -> Self {
        Self {
            status: ContactStatusFilter::Active,
            ..Self::default()
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }
}

/// Contact joined with its customer and owning salesperson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactListItem {
    #[serde(flatten)]
    pub contact: Contact,
    pub customer_name: String,
    pub department: Department,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
}

impl ContactListItem {
    pub fn matches(&self, filter: &ContactFilter) -> bool {
        filter.department.map_or(true, |d| self.department == d)
            && filter.salesperson_id.map_or(true, |s| self.salesperson_id == s)
            && filter.customer_id.map_or(true, |c| self.contact.customer_id == c)
            && filter.status.matches(self.contact.is_active)
            && filter.search_term().map_or(true, |term| {
                self.contact.name.to_lowercase().contains(&term.to_lowercase())
            })
    }
}

/// A contact selected for a birthday reminder, with who should be reminded.
#[derive(Debug, Clone)]
pub struct BirthdayContact {
    pub contact: Contact,
    pub customer_name: String,
    pub salesperson: SalespersonSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ContactInput {
        ContactInput {
            name: "Lucia Mendez".to_string(),
            phone: Some("+1 (305) 555-0123".to_string()),
            email: Some("Lucia@Example.com".to_string()),
            birthday_month: Some(6),
            birthday_day: Some(15),
            relationship_score: Some(4),
            ..ContactInput::default()
        }
    }

    fn contact_with(month: Option<i32>, day: Option<i32>) -> Contact {
        Contact::new(
            Uuid::new_v4(),
            ContactInput {
                birthday_month: month,
                birthday_day: day,
                ..input()
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_create_contact_normalizes() {
        let contact = Contact::new(Uuid::new_v4(), input(), None).unwrap();
        assert_eq!(contact.phone.as_deref(), Some("+13055550123"));
        assert_eq!(contact.email.as_deref(), Some("lucia@example.com"));
        assert!(contact.is_active);
        assert_eq!(contact.relationship_score, 4);
    }

    #[test]
    fn test_score_defaults_to_zero() {
        let contact = Contact::new(
            Uuid::new_v4(),
            ContactInput { relationship_score: None, ..input() },
            None,
        )
        .unwrap();
        assert_eq!(contact.relationship_score, 0);
    }

    #[test]
    fn test_local_phone_rejected() {
        let result = Contact::new(
            Uuid::new_v4(),
            ContactInput { phone: Some("305-555-0123".to_string()), ..input() },
            None,
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let result = Contact::new(
            Uuid::new_v4(),
            ContactInput { relationship_score: Some(6), ..input() },
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_impossible_birthday_rejected() {
        let result = Contact::new(
            Uuid::new_v4(),
            ContactInput { birthday_month: Some(2), birthday_day: Some(30), ..input() },
            None,
        );
        assert!(result.is_err());
        assert!(Contact::new(
            Uuid::new_v4(),
            ContactInput { birthday_month: Some(2), birthday_day: Some(29), ..input() },
            None,
        )
        .is_ok());
    }

    #[test]
    fn test_birthday_match() {
        let contact = contact_with(Some(6), Some(15));
        assert!(contact.is_birthday_on(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()));
        assert!(!contact.is_birthday_on(NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()));
    }

    #[test]
    fn test_incomplete_birthday_never_matches() {
        let contact = contact_with(None, Some(15));
        assert_eq!(contact.birthday(), None);
        assert_eq!(contact.birthday_display(), NOT_PROVIDED);
        for month in 1..=12 {
            let date = NaiveDate::from_ymd_opt(2025, month, 15).unwrap();
            assert!(!contact.is_birthday_on(date));
        }
    }

    #[test]
    fn test_inactive_contact_never_matches() {
        let mut contact = contact_with(Some(6), Some(15));
        contact.is_active = false;
        assert!(!contact.is_birthday_on(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()));
    }

    #[test]
    fn test_leap_day_only_matches_leap_years() {
        let contact = contact_with(Some(2), Some(29));
        assert!(contact.is_birthday_on(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!contact.is_birthday_on(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()));
        assert!(!contact.is_birthday_on(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
    }

    #[test]
    fn test_birthday_display() {
        assert_eq!(contact_with(Some(6), Some(15)).birthday_display(), "June, 15");
        assert_eq!(contact_with(Some(6), None).birthday_display(), NOT_PROVIDED);
    }

    #[test]
    fn test_days_until_birthday_wraps_year() {
        let contact = contact_with(Some(1), Some(5));
        let today = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        assert_eq!(contact.days_until_birthday(today), Some(16));
        let same_day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(contact.days_until_birthday(same_day), Some(0));
    }

    #[test]
    fn test_links() {
        let contact = Contact::new(Uuid::new_v4(), input(), None).unwrap();
        assert_eq!(contact.whatsapp_link().as_deref(), Some("https://wa.me/13055550123"));
        assert_eq!(contact.mailto_link().as_deref(), Some("mailto:lucia@example.com"));
    }

    #[test]
    fn test_edit_keeps_customer() {
        let customer = Uuid::new_v4();
        let mut contact = Contact::new(customer, input(), None).unwrap();
        contact
            .apply(
                ContactInput { customer_id: Some(Uuid::new_v4()), name: "Lucia M.".into(), ..input() },
                Uuid::new_v4(),
            )
            .unwrap();
        assert_eq!(contact.customer_id, customer);
        assert_eq!(contact.name, "Lucia M.");
    }
}
