// ============================================================================
// CRM Core - Dashboard Service
// File: crates/crm-core/src/services/dashboard_service.rs
// ============================================================================
//! Scoped sales dashboard plus the executive and manager performance tables

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::access::{require_executive, require_manager, AccessScope, Principal};
use crate::domain::{
    ContactFilter, CustomerFilter, Dashboard, Department, PerformanceRow, SalesSummary, UpcomingBirthday,
};
use crate::error::DomainError;
use crate::repositories::{ContactRepository, ReportRepository, SalespersonRepository};
use crm_shared::constants::{TOP_CUSTOMERS_LIMIT, UPCOMING_BIRTHDAY_WINDOW_DAYS};
use crm_shared::utils::format_currency;

#[derive(Debug, Clone, Serialize)]
pub struct ManagerDashboard {
    pub department: Department,
    pub department_name: &'static str,
    pub salespeople: Vec<PerformanceRow>,
}

pub struct DashboardService {
    reports: Arc<dyn ReportRepository>,
    contacts: Arc<dyn ContactRepository>,
    salespeople: Arc<dyn SalespersonRepository>,
}

impl DashboardService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        contacts: Arc<dyn ContactRepository>,
        salespeople: Arc<dyn SalespersonRepository>,
    ) -> Self {
        Self { reports, contacts, salespeople }
    }

    pub async fn dashboard(
        &self,
        principal: &Principal,
        filter: &CustomerFilter,
        today: NaiveDate,
    ) -> Result<Dashboard, DomainError> {
        let scope = AccessScope::for_principal(principal);
        if scope.is_empty() {
            return Ok(Dashboard {
                summary: SalesSummary::default(),
                total_sales_display: format_currency(0),
                top_customers: Vec::new(),
                upcoming_birthdays: Vec::new(),
                available_salespeople: Vec::new(),
            });
        }

        let summary = self.reports.sales_summary(&scope, filter).await?;
        let top_customers = self.reports.top_customers(&scope, filter, TOP_CUSTOMERS_LIMIT).await?;

        let contact_filter = ContactFilter {
            department: filter.department,
            salesperson_id: filter.salesperson_id,
            ..ContactFilter::active()
        };
        let mut upcoming_birthdays: Vec<UpcomingBirthday> = self
            .contacts
            .list(&scope, &contact_filter)
            .await?
            .into_iter()
            .filter_map(|item| {
                let days_until = item.contact.days_until_birthday(today)?;
                (days_until <= UPCOMING_BIRTHDAY_WINDOW_DAYS).then(|| UpcomingBirthday {
                    contact_id: item.contact.id,
                    birthday: item.contact.birthday_display(),
                    contact_name: item.contact.name,
                    customer_name: item.customer_name,
                    days_until,
                })
            })
            .collect();
        upcoming_birthdays.sort_by(|a, b| {
            a.days_until
                .cmp(&b.days_until)
                .then_with(|| a.contact_name.cmp(&b.contact_name))
        });

        Ok(Dashboard {
            total_sales_display: format_currency(summary.total_sales),
            summary,
            top_customers,
            upcoming_birthdays,
            available_salespeople: self.salespeople.list_with_customers().await?,
        })
    }

    /// Per-user performance. Executives only.
    pub async fn executive(&self, principal: &Principal) -> Result<Vec<PerformanceRow>, DomainError> {
        require_executive(principal)?;
        self.reports.user_performance().await
    }

    /// Per-salesperson performance inside the manager's department.
    pub async fn manager(&self, principal: &Principal) -> Result<ManagerDashboard, DomainError> {
        let department = require_manager(principal)?;
        Ok(ManagerDashboard {
            department,
            department_name: department.display_name(),
            salespeople: self.reports.department_performance(department).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryCrm;

    fn service(store: &Arc<InMemoryCrm>) -> DashboardService {
        DashboardService::new(store.clone(), store.clone(), store.clone())
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_totals_and_birthdays() {
        let store = Arc::new(InMemoryCrm::new());
        let ana = store.add_user("ana", "Salesperson");
        let sp = ana.salesperson_id.unwrap();
        let big = store.add_customer("Big", Department::Mm2, sp, 1_000_000);
        let small = store.add_customer("Small", Department::Mm2, sp, 250_000);
        store.add_contact(big.id, "Soon", Some((6, 20)), 4, true);
        store.add_contact(big.id, "Today", Some((6, 15)), 2, true);
        store.add_contact(small.id, "Far", Some((9, 1)), 3, true);
        store.add_contact(small.id, "Gone", Some((6, 16)), 5, false);
        store.add_contact(small.id, "Unknown", None, 3, true);

        let dashboard = service(&store)
            .dashboard(&ana, &CustomerFilter::default(), june(15))
            .await
            .unwrap();
        assert_eq!(dashboard.summary.total_sales, 1_250_000);
        assert_eq!(dashboard.total_sales_display, "$1,250,000");
        assert_eq!(dashboard.summary.active_contacts, 4);
        assert_eq!(dashboard.summary.average_relationship_score, Some(3.0));
        assert_eq!(dashboard.top_customers[0].name, "Big");

        let names: Vec<_> = dashboard.upcoming_birthdays.iter().map(|b| b.contact_name.as_str()).collect();
        assert_eq!(names, vec!["Today", "Soon"]);
        assert_eq!(dashboard.upcoming_birthdays[1].birthday, "June, 20");
    }

    #[tokio::test]
    async fn test_dashboard_empty_for_unrecognized_role() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        store.add_customer("Big", Department::Mm2, exec.salesperson_id.unwrap(), 10);
        let odd = store.add_user("odd", "Intern");
        let dashboard = service(&store)
            .dashboard(&odd, &CustomerFilter::default(), june(1))
            .await
            .unwrap();
        assert_eq!(dashboard.summary.customer_count, 0);
        assert!(dashboard.top_customers.is_empty());
    }

    #[tokio::test]
    async fn test_executive_table_requires_executive() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let ana = store.add_user("ana", "Salesperson");
        store.add_customer("A", Department::Mm2, ana.salesperson_id.unwrap(), 10);
        let service = service(&store);
        let rows = service.executive(&exec).await.unwrap();
        assert_eq!(rows.len(), 2);
        let ana_row = rows.iter().find(|r| r.username == "ana").unwrap();
        assert_eq!(ana_row.total_customers, Some(1));
        assert!(service.executive(&ana).await.is_err());
    }

    #[tokio::test]
    async fn test_manager_table_counts_department_only() {
        let store = Arc::new(InMemoryCrm::new());
        let mgr = store.add_user("mia", "Manager - Wholesale");
        let ana = store.add_user("ana", "Salesperson");
        let sp = ana.salesperson_id.unwrap();
        store.add_customer("W1", Department::Wholesale, sp, 10);
        store.add_customer("W2", Department::Wholesale, sp, 20);
        store.add_customer("E1", Department::Ecommerce, sp, 1000);

        let table = service(&store).manager(&mgr).await.unwrap();
        assert_eq!(table.department, Department::Wholesale);
        assert_eq!(table.salespeople.len(), 1);
        assert_eq!(table.salespeople[0].total_sales, Some(30));
        assert_eq!(table.salespeople[0].role, "Salesperson");
    }
}
