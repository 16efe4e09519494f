//! # CRM Core - Domain Module
//! 
//! Domain entities for the CRM application.

pub mod department;
pub mod role;
pub mod user_account;
pub mod salesperson;
pub mod customer;
pub mod contact;
pub mod gift;
pub mod report;
pub mod dispatch;

// Re-export all entities and enums
pub use department::Department;
pub use role::{Profile, Role};
pub use user_account::{PasswordSetToken, UserAccount};
pub use salesperson::{Salesperson, SalespersonSummary};
pub use customer::{Customer, CustomerFilter, CustomerInput, CustomerListItem};
pub use contact::{
    BirthdayContact, Contact, ContactFilter, ContactInput, ContactListItem, ContactStatusFilter,
};
pub use gift::{Gift, GiftAssignment, GiftInput, GiftPlanRow, GiftSeason, GiftSeasonInput, GiftStatus};
pub use report::{Dashboard, PerformanceRow, SalesSummary, TopCustomer, UpcomingBirthday};
pub use dispatch::{DispatchKey, NotificationChannel};

/// A stored or submitted key that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
