// ============================================================================
// CRM Core - Dashboard Read Models
// File: crates/crm-core/src/domain/report.rs
// Description: Aggregates returned by the dashboards
// ============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Department, SalespersonSummary};

/// Totals over the scoped (and filtered) customers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: i64,
    pub customer_count: i64,
    pub active_contacts: i64,
    pub average_relationship_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCustomer {
    pub id: Uuid,
    pub name: String,
    pub department: Department,
    pub salesperson_name: String,
    pub estimated_yearly_sales: i64,
    pub active_contacts: i64,
    pub average_relationship_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingBirthday {
    pub contact_id: Uuid,
    pub contact_name: String,
    pub customer_name: String,
    pub birthday: String,
    pub days_until: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: SalesSummary,
    pub total_sales_display: String,
    pub top_customers: Vec<TopCustomer>,
    pub upcoming_birthdays: Vec<UpcomingBirthday>,
    pub available_salespeople: Vec<SalespersonSummary>,
}

/// One line of the executive or manager performance table.
/// Counts are `None` for users without a salesperson record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRow {
    pub user_id: Uuid,
    pub salesperson_id: Option<Uuid>,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub total_customers: Option<i64>,
    pub total_contacts: Option<i64>,
    pub total_sales: Option<i64>,
    pub average_relationship_score: Option<f64>,
}

/// Rounds a score average to two decimals.
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(3.456), 3.46);
        assert_eq!(round_score(4.0), 4.0);
    }
}
