// ============================================================================
// CRM Infrastructure - PostgreSQL Password Token Repository
// File: crates/crm-infrastructure/src/database/postgres/password_token_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crm_core::domain::PasswordSetToken;
use crm_core::error::DomainError;
use crm_core::repositories::PasswordTokenRepository;

use super::db_error;

pub struct PgPasswordTokenRepository {
    pool: PgPool,
}

impl PgPasswordTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<TokenRow> for PasswordSetToken {
    fn from(row: TokenRow) -> Self {
        PasswordSetToken {
            id: row.id,
            user_id: row.user_id,
            token_digest: row.token_digest,
            expires_at: row.expires_at,
            used_at: row.used_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PasswordTokenRepository for PgPasswordTokenRepository {
    async fn create(&self, token: &PasswordSetToken) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO password_set_tokens (id, user_id, token_digest, expires_at, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_digest)
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("creating password token", e))?;

        Ok(())
    }

    async fn find_by_digest(&self, digest: &str) -> Result<Option<PasswordSetToken>, DomainError> {
        let row: Option<TokenRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, token_digest, expires_at, used_at, created_at
            FROM password_set_tokens
            WHERE token_digest = $1
            "#
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding password token", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn consume(&self, token_id: &Uuid, user_id: &Uuid, password_hash: &str) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e: sqlx::Error| db_error("starting token transaction", e))?;

        let claimed = sqlx::query(
            r#"
            UPDATE password_set_tokens
            SET used_at = NOW()
            WHERE id = $1 AND user_id = $2 AND used_at IS NULL AND expires_at > NOW()
            "#
        )
        .bind(token_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| db_error("claiming password token", e))?;

        if claimed.rows_affected() == 0 {
            warn!("Password token {} already used or expired", token_id);
            return Err(DomainError::InvalidPasswordToken);
        }

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, modified_at = NOW(), modified_by = $1
            WHERE id = $1
            "#
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| db_error("setting password", e))?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }

        tx.commit()
            .await
            .map_err(|e: sqlx::Error| db_error("committing password change", e))?;

        info!("Password set for user {}", user_id);
        Ok(())
    }
}
