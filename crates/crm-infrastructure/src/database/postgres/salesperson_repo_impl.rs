// ============================================================================
// CRM Infrastructure - PostgreSQL Salesperson Repository
// File: crates/crm-infrastructure/src/database/postgres/salesperson_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crm_core::domain::SalespersonSummary;
use crm_core::error::DomainError;
use crm_core::repositories::SalespersonRepository;

use super::db_error;

pub struct PgSalespersonRepository {
    pool: PgPool,
}

impl PgSalespersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SalespersonSummaryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<SalespersonSummaryRow> for SalespersonSummary {
    fn from(row: SalespersonSummaryRow) -> Self {
        let full_name = format!("{} {}", row.first_name, row.last_name).trim().to_string();
        SalespersonSummary {
            id: row.id,
            user_id: row.user_id,
            full_name: if full_name.is_empty() { row.username.clone() } else { full_name },
            username: row.username,
            first_name: row.first_name,
            email: row.email,
            phone: row.phone,
        }
    }
}

#[async_trait]
impl SalespersonRepository for PgSalespersonRepository {
    async fn find_summary(&self, id: &Uuid) -> Result<Option<SalespersonSummary>, DomainError> {
        let row: Option<SalespersonSummaryRow> = sqlx::query_as(
            r#"
            SELECT sp.id, sp.user_id, u.username, u.first_name, u.last_name, u.email, sp.phone
            FROM salespersons sp
            JOIN users u ON u.id = sp.user_id
            WHERE sp.id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding salesperson", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<SalespersonSummary>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<SalespersonSummaryRow> = sqlx::query_as(
            r#"
            SELECT sp.id, sp.user_id, u.username, u.first_name, u.last_name, u.email, sp.phone
            FROM salespersons sp
            JOIN users u ON u.id = sp.user_id
            WHERE sp.id = ANY($1)
            ORDER BY u.first_name, u.last_name, u.username
            "#
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding salespeople", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_with_customers(&self) -> Result<Vec<SalespersonSummary>, DomainError> {
        let rows: Vec<SalespersonSummaryRow> = sqlx::query_as(
            r#"
            SELECT sp.id, sp.user_id, u.username, u.first_name, u.last_name, u.email, sp.phone
            FROM salespersons sp
            JOIN users u ON u.id = sp.user_id
            WHERE EXISTS (SELECT 1 FROM customers cu WHERE cu.salesperson_id = sp.id)
            ORDER BY u.first_name, u.last_name, u.username
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("listing salespeople", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
