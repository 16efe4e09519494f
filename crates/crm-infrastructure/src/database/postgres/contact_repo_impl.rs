// ============================================================================
// CRM Infrastructure - PostgreSQL Contact Repository
// File: crates/crm-infrastructure/src/database/postgres/contact_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, QueryBuilder};
use tracing::{debug, error, info};
use uuid::Uuid;

use crm_core::access::AccessScope;
use crm_core::domain::{
    BirthdayContact, Contact, ContactFilter, ContactListItem, SalespersonSummary,
};
use crm_core::error::DomainError;
use crm_core::repositories::ContactRepository;

use super::{db_error, decode};
use crate::database::scope::{push_contact_filter, push_scope, SALESPERSON_NAME};

pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct ContactRow {
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
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            customer_id: row.customer_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            address: row.address,
            birthday_month: row.birthday_month,
            birthday_day: row.birthday_day,
            relationship_score: row.relationship_score,
            is_active: row.is_active,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct ContactListRow {
    #[sqlx(flatten)]
    pub contact: ContactRow,
    pub customer_name: String,
    pub department: String,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
}

impl TryFrom<ContactListRow> for ContactListItem {
    type Error = DomainError;

    fn try_from(row: ContactListRow) -> Result<Self, Self::Error> {
        Ok(ContactListItem {
            department: decode(&row.department)?,
            contact: row.contact.into(),
            customer_name: row.customer_name,
            salesperson_id: row.salesperson_id,
            salesperson_name: row.salesperson_name,
        })
    }
}

#[derive(Debug, FromRow)]
struct BirthdayRow {
    #[sqlx(flatten)]
    pub contact: ContactRow,
    pub customer_name: String,
    pub salesperson_id: Uuid,
    pub salesperson_user_id: Uuid,
    pub salesperson_username: String,
    pub salesperson_first_name: String,
    pub salesperson_full_name: String,
    pub salesperson_email: Option<String>,
    pub salesperson_phone: Option<String>,
}

impl From<BirthdayRow> for BirthdayContact {
    fn from(row: BirthdayRow) -> Self {
        BirthdayContact {
            contact: row.contact.into(),
            customer_name: row.customer_name,
            salesperson: SalespersonSummary {
                id: row.salesperson_id,
                user_id: row.salesperson_user_id,
                username: row.salesperson_username,
                first_name: row.salesperson_first_name,
                full_name: row.salesperson_full_name,
                email: row.salesperson_email,
                phone: row.salesperson_phone,
            },
        }
    }
}

const CONTACT_COLUMNS: &str = "c.id, c.customer_id, c.name, c.phone, c.email, c.address, \
     c.birthday_month, c.birthday_day, c.relationship_score, c.is_active, \
     c.created_at, c.created_by, c.modified_at, c.modified_by";

fn write_error(contact: &Contact, e: sqlx::Error) -> DomainError {
    error!("Database error writing contact: {}", e);
    if e.to_string().contains("foreign key") {
        DomainError::CustomerNotFound(contact.customer_id)
    } else {
        DomainError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Contact>, DomainError> {
        let row: Option<ContactRow> = sqlx::query_as(
            r#"
            SELECT
                id, customer_id, name, phone, email, address,
                birthday_month, birthday_day, relationship_score, is_active,
                created_at, created_by, modified_at, modified_by
            FROM contacts
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding contact by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, scope: &AccessScope, filter: &ContactFilter) -> Result<Vec<ContactListItem>, DomainError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {}, cu.name AS customer_name, cu.department, cu.salesperson_id, {} AS salesperson_name \
             FROM contacts c \
             JOIN customers cu ON cu.id = c.customer_id \
             JOIN salespersons sp ON sp.id = cu.salesperson_id \
             JOIN users u ON u.id = sp.user_id \
             WHERE TRUE",
            CONTACT_COLUMNS, SALESPERSON_NAME
        ));
        push_scope(&mut qb, scope);
        push_contact_filter(&mut qb, filter);
        qb.push(" ORDER BY cu.department, c.name");

        let rows: Vec<ContactListRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("listing contacts", e))?;

        debug!("Listed {} contacts for scope {:?}", rows.len(), scope);
        rows.into_iter().map(ContactListItem::try_from).collect()
    }

    async fn list_for_customer(&self, customer_id: &Uuid) -> Result<Vec<Contact>, DomainError> {
        let rows: Vec<ContactRow> = sqlx::query_as(
            r#"
            SELECT
                id, customer_id, name, phone, email, address,
                birthday_month, birthday_day, relationship_score, is_active,
                created_at, created_by, modified_at, modified_by
            FROM contacts
            WHERE customer_id = $1
            ORDER BY name
            "#
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("listing customer contacts", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_birthdays(&self, month: u32, day: u32) -> Result<Vec<BirthdayContact>, DomainError> {
        let sql = format!(
            "SELECT {}, cu.name AS customer_name, \
                 sp.id AS salesperson_id, u.id AS salesperson_user_id, \
                 u.username AS salesperson_username, u.first_name AS salesperson_first_name, \
                 {} AS salesperson_full_name, u.email AS salesperson_email, sp.phone AS salesperson_phone \
             FROM contacts c \
             JOIN customers cu ON cu.id = c.customer_id \
             JOIN salespersons sp ON sp.id = cu.salesperson_id \
             JOIN users u ON u.id = sp.user_id \
             WHERE c.is_active AND c.birthday_month = $1 AND c.birthday_day = $2 \
             ORDER BY c.name",
            CONTACT_COLUMNS, SALESPERSON_NAME
        );

        let rows: Vec<BirthdayRow> = sqlx::query_as(&sql)
            .bind(month as i32)
            .bind(day as i32)
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("finding birthdays", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, contact: &Contact) -> Result<Contact, DomainError> {
        info!("Creating contact {} for customer {}", contact.id, contact.customer_id);

        let row: ContactRow = sqlx::query_as(
            r#"
            INSERT INTO contacts (
                id, customer_id, name, phone, email, address,
                birthday_month, birthday_day, relationship_score, is_active,
                created_at, created_by, modified_at, modified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING
                id, customer_id, name, phone, email, address,
                birthday_month, birthday_day, relationship_score, is_active,
                created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(contact.id)
        .bind(contact.customer_id)
        .bind(&contact.name)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.address)
        .bind(contact.birthday_month)
        .bind(contact.birthday_day)
        .bind(contact.relationship_score)
        .bind(contact.is_active)
        .bind(contact.created_at)
        .bind(contact.created_by)
        .bind(contact.modified_at)
        .bind(contact.modified_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| write_error(contact, e))?;

        Ok(row.into())
    }

    async fn update(&self, contact: &Contact) -> Result<Contact, DomainError> {
        // A contact never moves to another customer
        let row: Option<ContactRow> = sqlx::query_as(
            r#"
            UPDATE contacts
            SET name = $2, phone = $3, email = $4, address = $5,
                birthday_month = $6, birthday_day = $7, relationship_score = $8, is_active = $9,
                modified_at = $10, modified_by = $11
            WHERE id = $1
            RETURNING
                id, customer_id, name, phone, email, address,
                birthday_month, birthday_day, relationship_score, is_active,
                created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(contact.id)
        .bind(&contact.name)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.address)
        .bind(contact.birthday_month)
        .bind(contact.birthday_day)
        .bind(contact.relationship_score)
        .bind(contact.is_active)
        .bind(contact.modified_at)
        .bind(contact.modified_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| write_error(contact, e))?;

        row.map(|r| r.into()).ok_or(DomainError::ContactNotFound(contact.id))
    }
}
