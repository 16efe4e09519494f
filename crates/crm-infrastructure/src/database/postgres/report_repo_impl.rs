// ============================================================================
// CRM Infrastructure - PostgreSQL Report Repository
// File: crates/crm-infrastructure/src/database/postgres/report_repo_impl.rs
// Description: Aggregates behind the sales, executive and manager dashboards
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, QueryBuilder};
use uuid::Uuid;

use crm_core::access::AccessScope;
use crm_core::domain::report::round_score;
use crm_core::domain::{CustomerFilter, Department, PerformanceRow, SalesSummary, TopCustomer};
use crm_core::error::DomainError;
use crm_core::repositories::ReportRepository;

use super::{db_error, decode};
use crate::database::scope::{push_customer_filter, push_scope, CUSTOMER_JOINS, SALESPERSON_NAME};

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    pub total_sales: i64,
    pub customer_count: i64,
    pub active_contacts: i64,
    pub average_relationship_score: Option<f64>,
}

impl From<SummaryRow> for SalesSummary {
    fn from(row: SummaryRow) -> Self {
        SalesSummary {
            total_sales: row.total_sales,
            customer_count: row.customer_count,
            active_contacts: row.active_contacts,
            average_relationship_score: row.average_relationship_score.map(round_score),
        }
    }
}

#[derive(Debug, FromRow)]
struct TopCustomerRow {
    pub id: Uuid,
    pub name: String,
    pub department: String,
    pub salesperson_name: String,
    pub estimated_yearly_sales: i64,
    pub active_contacts: i64,
    pub average_relationship_score: Option<f64>,
}

impl TryFrom<TopCustomerRow> for TopCustomer {
    type Error = DomainError;

    fn try_from(row: TopCustomerRow) -> Result<Self, Self::Error> {
        Ok(TopCustomer {
            department: decode(&row.department)?,
            id: row.id,
            name: row.name,
            salesperson_name: row.salesperson_name,
            estimated_yearly_sales: row.estimated_yearly_sales,
            active_contacts: row.active_contacts,
            average_relationship_score: row.average_relationship_score.map(round_score),
        })
    }
}

#[derive(Debug, FromRow)]
struct PerformanceDbRow {
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

impl From<PerformanceDbRow> for PerformanceRow {
    fn from(row: PerformanceDbRow) -> Self {
        PerformanceRow {
            user_id: row.user_id,
            salesperson_id: row.salesperson_id,
            username: row.username,
            full_name: row.full_name,
            role: row.role,
            total_customers: row.total_customers,
            total_contacts: row.total_contacts,
            total_sales: row.total_sales,
            average_relationship_score: row.average_relationship_score.map(round_score),
        }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn sales_summary(&self, scope: &AccessScope, filter: &CustomerFilter) -> Result<SalesSummary, DomainError> {
        let mut qb = QueryBuilder::new("WITH scoped AS (SELECT cu.id, cu.estimated_yearly_sales");
        qb.push(CUSTOMER_JOINS);
        qb.push(" WHERE TRUE");
        push_scope(&mut qb, scope);
        push_customer_filter(&mut qb, filter);
        qb.push(
            ") SELECT \
                 COALESCE((SELECT SUM(estimated_yearly_sales) FROM scoped), 0)::BIGINT AS total_sales, \
                 (SELECT COUNT(*) FROM scoped) AS customer_count, \
                 COUNT(c.id) AS active_contacts, \
                 AVG(c.relationship_score)::FLOAT8 AS average_relationship_score \
             FROM contacts c \
             JOIN scoped s ON s.id = c.customer_id \
             WHERE c.is_active",
        );

        let row: SummaryRow = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("computing sales summary", e))?;

        Ok(row.into())
    }

    async fn top_customers(
        &self,
        scope: &AccessScope,
        filter: &CustomerFilter,
        limit: i64,
    ) -> Result<Vec<TopCustomer>, DomainError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT cu.id, cu.name, cu.department, {} AS salesperson_name, cu.estimated_yearly_sales, \
                 COUNT(c.id) FILTER (WHERE c.is_active) AS active_contacts, \
                 (AVG(c.relationship_score) FILTER (WHERE c.is_active))::FLOAT8 AS average_relationship_score",
            SALESPERSON_NAME
        ));
        qb.push(CUSTOMER_JOINS);
        qb.push(" LEFT JOIN contacts c ON c.customer_id = cu.id WHERE TRUE");
        push_scope(&mut qb, scope);
        push_customer_filter(&mut qb, filter);
        qb.push(" GROUP BY cu.id, u.id ORDER BY cu.estimated_yearly_sales DESC, cu.name LIMIT ")
            .push_bind(limit);

        let rows: Vec<TopCustomerRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("listing top customers", e))?;

        rows.into_iter().map(TopCustomer::try_from).collect()
    }

    async fn user_performance(&self) -> Result<Vec<PerformanceRow>, DomainError> {
        let sql = format!(
            "SELECT u.id AS user_id, sp.id AS salesperson_id, u.username, {name} AS full_name, p.role, \
                 cs.total_customers, ct.total_contacts, cs.total_sales, ct.average_relationship_score \
             FROM profiles p \
             JOIN users u ON u.id = p.user_id \
             LEFT JOIN salespersons sp ON sp.user_id = u.id \
             LEFT JOIN LATERAL ( \
                 SELECT COUNT(*) AS total_customers, \
                        COALESCE(SUM(cu.estimated_yearly_sales), 0)::BIGINT AS total_sales \
                 FROM customers cu WHERE cu.salesperson_id = sp.id \
             ) cs ON sp.id IS NOT NULL \
             LEFT JOIN LATERAL ( \
                 SELECT COUNT(*) AS total_contacts, \
                        AVG(c.relationship_score)::FLOAT8 AS average_relationship_score \
                 FROM contacts c JOIN customers cu ON cu.id = c.customer_id \
                 WHERE cu.salesperson_id = sp.id \
             ) ct ON sp.id IS NOT NULL \
             ORDER BY full_name",
            name = SALESPERSON_NAME
        );

        let rows: Vec<PerformanceDbRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("computing user performance", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn department_performance(&self, department: Department) -> Result<Vec<PerformanceRow>, DomainError> {
        let sql = format!(
            "SELECT u.id AS user_id, sp.id AS salesperson_id, u.username, {name} AS full_name, \
                 COALESCE(p.role, 'Salesperson') AS role, \
                 COUNT(*) AS total_customers, \
                 COALESCE(SUM(dc.contact_count), 0)::BIGINT AS total_contacts, \
                 SUM(dc.estimated_yearly_sales)::BIGINT AS total_sales, \
                 SUM(dc.score_sum)::FLOAT8 / NULLIF(SUM(dc.contact_count), 0)::FLOAT8 AS average_relationship_score \
             FROM ( \
                 SELECT cu.id, cu.salesperson_id, cu.estimated_yearly_sales, \
                        (SELECT COUNT(*) FROM contacts c WHERE c.customer_id = cu.id) AS contact_count, \
                        (SELECT COALESCE(SUM(c.relationship_score), 0) FROM contacts c WHERE c.customer_id = cu.id) AS score_sum \
                 FROM customers cu \
                 WHERE cu.department = $1 \
             ) dc \
             JOIN salespersons sp ON sp.id = dc.salesperson_id \
             JOIN users u ON u.id = sp.user_id \
             LEFT JOIN profiles p ON p.user_id = u.id \
             GROUP BY u.id, sp.id, p.role \
             ORDER BY full_name",
            name = SALESPERSON_NAME
        );

        let rows: Vec<PerformanceDbRow> = sqlx::query_as(&sql)
            .bind(department.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("computing department performance", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
