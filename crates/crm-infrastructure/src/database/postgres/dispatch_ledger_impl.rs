// ============================================================================
// CRM Infrastructure - PostgreSQL Birthday Dispatch Ledger
// File: crates/crm-infrastructure/src/database/postgres/dispatch_ledger_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;

use crm_core::domain::DispatchKey;
use crm_core::error::DomainError;
use crm_core::repositories::DispatchLedger;

use super::db_error;

pub struct PgDispatchLedger {
    pool: PgPool,
}

impl PgDispatchLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DispatchLedger for PgDispatchLedger {
    async fn has_sent(&self, key: &DispatchKey) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM birthday_dispatch_ledger
                WHERE contact_id = $1 AND dispatch_date = $2 AND channel = $3 AND recipient = $4
            )
            "#
        )
        .bind(key.contact_id)
        .bind(key.date)
        .bind(key.channel.as_str())
        .bind(&key.recipient)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("checking dispatch ledger", e))?;

        Ok(exists)
    }

    async fn record(&self, key: &DispatchKey) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO birthday_dispatch_ledger (contact_id, dispatch_date, channel, recipient)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (contact_id, dispatch_date, channel, recipient) DO NOTHING
            "#
        )
        .bind(key.contact_id)
        .bind(key.date)
        .bind(key.channel.as_str())
        .bind(&key.recipient)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("recording dispatch", e))?;

        Ok(())
    }
}
