// ============================================================================
// CRM Infrastructure - PostgreSQL User Repository
// File: crates/crm-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use crm_core::access::Principal;
use crm_core::domain::{Profile, Role, Salesperson, UserAccount};
use crm_core::error::DomainError;
use crm_core::repositories::UserRepository;

use super::db_error;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        UserAccount {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            user_id: row.user_id,
            role: Role::parse(&row.role),
            role_label: row.role,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    pub id: Uuid,
    pub username: String,
    pub salesperson_id: Option<Uuid>,
    pub role: Option<String>,
}

impl From<PrincipalRow> for Principal {
    fn from(row: PrincipalRow) -> Self {
        let role = row.role.as_deref().and_then(Role::parse);
        Principal::new(row.id, row.username, row.salesperson_id, role)
    }
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, \
     is_active, last_login_at, created_at, created_by, modified_at, modified_by";

impl PgUserRepository {
    async fn find_where(&self, predicate: &str, value: &str, context: &str) -> Result<Option<UserAccount>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, predicate);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error(context, e))?;

        Ok(row.map(|r| r.into()))
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserAccount>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT
                id, username, email, first_name, last_name, password_hash,
                is_active, last_login_at, created_at, created_by, modified_at, modified_by
            FROM users
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding user by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, DomainError> {
        self.find_where("LOWER(username) = LOWER($1)", username, "finding user by username").await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError> {
        self.find_where("LOWER(email) = LOWER($1)", email, "finding user by email").await
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserAccount>, DomainError> {
        self.find_where(
            "LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1) ORDER BY (LOWER(username) = LOWER($1)) DESC LIMIT 1",
            login,
            "finding user by login",
        )
        .await
    }

    async fn create_with_profile(
        &self,
        user: &UserAccount,
        salesperson: &Salesperson,
        profile: &Profile,
    ) -> Result<UserAccount, DomainError> {
        info!("Creating user account: {}", user.username);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e: sqlx::Error| db_error("starting signup transaction", e))?;

        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (
                id, username, email, first_name, last_name, password_hash,
                is_active, last_login_at, created_at, created_by, modified_at, modified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING
                id, username, email, first_name, last_name, password_hash,
                is_active, last_login_at, created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.created_by)
        .bind(user.modified_at)
        .bind(user.modified_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating user: {}", e);
            let msg = e.to_string();
            if msg.contains("unique") || msg.contains("duplicate") {
                if msg.contains("email") {
                    DomainError::EmailAlreadyExists(user.email.clone())
                } else {
                    DomainError::UsernameAlreadyExists(user.username.clone())
                }
            } else {
                DomainError::DatabaseError(msg)
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO salespersons (id, user_id, phone, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5)
            "#
        )
        .bind(salesperson.id)
        .bind(salesperson.user_id)
        .bind(&salesperson.phone)
        .bind(salesperson.created_at)
        .bind(salesperson.created_by)
        .execute(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| db_error("creating salesperson", e))?;

        sqlx::query(
            r#"
            INSERT INTO profiles (id, user_id, role, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5)
            "#
        )
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(&profile.role_label)
        .bind(profile.created_at)
        .bind(profile.created_by)
        .execute(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| db_error("creating profile", e))?;

        tx.commit()
            .await
            .map_err(|e: sqlx::Error| db_error("committing signup", e))?;

        info!("User account created: {}", row.id);
        Ok(row.into())
    }

    async fn update_password(&self, user_id: &Uuid, password_hash: &str) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, modified_at = NOW(), modified_by = $1
            WHERE id = $1
            "#
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("updating password", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }

    async fn record_login(&self, user_id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("recording login", e))?;

        Ok(())
    }

    async fn find_profile(&self, user_id: &Uuid) -> Result<Option<Profile>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, role, created_at, created_by, modified_at, modified_by
            FROM profiles
            WHERE user_id = $1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding profile", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn update_role(&self, user_id: &Uuid, role: Role, modified_by: &Uuid) -> Result<Profile, DomainError> {
        info!("Changing role of user {} to {}", user_id, role);

        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            UPDATE profiles
            SET role = $2, modified_at = NOW(), modified_by = $3
            WHERE user_id = $1
            RETURNING id, user_id, role, created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(user_id)
        .bind(role.label())
        .bind(modified_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("updating role", e))?;

        row.map(|r| r.into()).ok_or(DomainError::UserNotFound)
    }

    async fn load_principal(&self, user_id: &Uuid) -> Result<Option<Principal>, DomainError> {
        let row: Option<PrincipalRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.username, sp.id AS salesperson_id, p.role
            FROM users u
            LEFT JOIN salespersons sp ON sp.user_id = u.id
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE u.id = $1 AND u.is_active
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("loading principal", e))?;

        Ok(row.map(|r| r.into()))
    }
}
