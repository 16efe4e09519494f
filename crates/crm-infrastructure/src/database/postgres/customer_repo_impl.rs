// ============================================================================
// CRM Infrastructure - PostgreSQL Customer Repository
// File: crates/crm-infrastructure/src/database/postgres/customer_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

use crm_core::access::AccessScope;
use crm_core::domain::{Customer, CustomerFilter, CustomerListItem};
use crm_core::error::DomainError;
use crm_core::repositories::CustomerRepository;
use crm_shared::{Page, Pagination};

use super::{db_error, decode, is_unique_violation};
use crate::database::scope::{push_customer_filter, push_scope, CUSTOMER_JOINS, SALESPERSON_NAME};

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub department: String,
    pub salesperson_id: Uuid,
    pub estimated_yearly_sales: i64,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = DomainError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Customer {
            department: decode(&row.department)?,
            id: row.id,
            name: row.name,
            salesperson_id: row.salesperson_id,
            estimated_yearly_sales: row.estimated_yearly_sales,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        })
    }
}

#[derive(Debug, FromRow)]
struct CustomerListRow {
    pub id: Uuid,
    pub name: String,
    pub department: String,
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    pub estimated_yearly_sales: i64,
}

impl TryFrom<CustomerListRow> for CustomerListItem {
    type Error = DomainError;

    fn try_from(row: CustomerListRow) -> Result<Self, Self::Error> {
        Ok(CustomerListItem {
            department: decode(&row.department)?,
            id: row.id,
            name: row.name,
            salesperson_id: row.salesperson_id,
            salesperson_name: row.salesperson_name,
            estimated_yearly_sales: row.estimated_yearly_sales,
        })
    }
}

fn list_query<'a>(select: &str, scope: &AccessScope, filter: &'a CustomerFilter) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(select);
    qb.push(CUSTOMER_JOINS);
    qb.push(" WHERE TRUE");
    push_scope(&mut qb, scope);
    push_customer_filter(&mut qb, filter);
    qb
}

fn list_select() -> String {
    format!(
        "SELECT cu.id, cu.name, cu.department, cu.salesperson_id, {} AS salesperson_name, cu.estimated_yearly_sales",
        SALESPERSON_NAME
    )
}

fn write_error(customer: &Customer, e: sqlx::Error) -> DomainError {
    error!("Database error writing customer: {}", e);
    if is_unique_violation(&e) {
        DomainError::CustomerNameAlreadyExists(customer.name.clone())
    } else if e.to_string().contains("foreign key") {
        DomainError::SalespersonNotFound(customer.salesperson_id)
    } else {
        DomainError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, department, salesperson_id, estimated_yearly_sales,
                created_at, created_by, modified_at, modified_by
            FROM customers
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding customer by id", e))?;

        row.map(Customer::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, department, salesperson_id, estimated_yearly_sales,
                created_at, created_by, modified_at, modified_by
            FROM customers
            WHERE LOWER(name) = LOWER($1)
            "#
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding customer by name", e))?;

        row.map(Customer::try_from).transpose()
    }

    async fn list(
        &self,
        scope: &AccessScope,
        filter: &CustomerFilter,
        pagination: &Pagination,
    ) -> Result<Page<CustomerListItem>, DomainError> {
        let total: i64 = list_query("SELECT COUNT(*)", scope, filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("counting customers", e))?;

        let mut qb = list_query(&list_select(), scope, filter);
        qb.push(" ORDER BY cu.name LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<CustomerListRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("listing customers", e))?;

        let items = rows
            .into_iter()
            .map(CustomerListItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, *pagination))
    }

    async fn list_all(
        &self,
        scope: &AccessScope,
        filter: &CustomerFilter,
    ) -> Result<Vec<CustomerListItem>, DomainError> {
        let mut qb = list_query(&list_select(), scope, filter);
        qb.push(" ORDER BY cu.name");

        let rows: Vec<CustomerListRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("listing customers", e))?;

        rows.into_iter().map(CustomerListItem::try_from).collect()
    }

    async fn create(&self, customer: &Customer) -> Result<Customer, DomainError> {
        info!("Creating customer: {}", customer.name);

        let row: CustomerRow = sqlx::query_as(
            r#"
            INSERT INTO customers (
                id, name, department, salesperson_id, estimated_yearly_sales,
                created_at, created_by, modified_at, modified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, name, department, salesperson_id, estimated_yearly_sales,
                created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(customer.department.as_str())
        .bind(customer.salesperson_id)
        .bind(customer.estimated_yearly_sales)
        .bind(customer.created_at)
        .bind(customer.created_by)
        .bind(customer.modified_at)
        .bind(customer.modified_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| write_error(customer, e))?;

        row.try_into()
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            UPDATE customers
            SET name = $2, department = $3, salesperson_id = $4, estimated_yearly_sales = $5,
                modified_at = $6, modified_by = $7
            WHERE id = $1
            RETURNING
                id, name, department, salesperson_id, estimated_yearly_sales,
                created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(customer.department.as_str())
        .bind(customer.salesperson_id)
        .bind(customer.estimated_yearly_sales)
        .bind(customer.modified_at)
        .bind(customer.modified_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| write_error(customer, e))?;

        row.ok_or(DomainError::CustomerNotFound(customer.id))?.try_into()
    }
}
