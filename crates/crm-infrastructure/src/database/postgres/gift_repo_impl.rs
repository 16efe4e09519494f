// ============================================================================
// CRM Infrastructure - PostgreSQL Gift Repository
// File: crates/crm-infrastructure/src/database/postgres/gift_repo_impl.rs
// Description: Gift catalog, seasons and lazily created season assignments
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

use crm_core::access::AccessScope;
use crm_core::domain::{Gift, GiftAssignment, GiftPlanRow, GiftSeason};
use crm_core::error::DomainError;
use crm_core::repositories::GiftRepository;

use super::{db_error, decode, is_unique_violation};
use crate::database::scope::{push_scope, SALESPERSON_NAME};

pub struct PgGiftRepository {
    pool: PgPool,
}

impl PgGiftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct GiftRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub min_yearly_sales: i64,
    pub min_relationship_score: i32,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl From<GiftRow> for Gift {
    fn from(row: GiftRow) -> Self {
        Gift {
            id: row.id,
            name: row.name,
            description: row.description,
            min_yearly_sales: row.min_yearly_sales,
            min_relationship_score: row.min_relationship_score,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct SeasonRow {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl From<SeasonRow> for GiftSeason {
    fn from(row: SeasonRow) -> Self {
        GiftSeason {
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub season_id: Uuid,
    pub gift_id: Option<Uuid>,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl TryFrom<AssignmentRow> for GiftAssignment {
    type Error = DomainError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(GiftAssignment {
            status: decode(&row.status)?,
            id: row.id,
            contact_id: row.contact_id,
            season_id: row.season_id,
            gift_id: row.gift_id,
            note: row.note,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
        })
    }
}

#[derive(Debug, FromRow)]
struct PlanRow {
    pub assignment_id: Uuid,
    pub contact_id: Uuid,
    pub contact_name: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub department: String,
    pub salesperson_name: String,
    pub estimated_yearly_sales: i64,
    pub relationship_score: i32,
    pub gift_id: Option<Uuid>,
    pub gift_name: Option<String>,
    pub status: String,
    pub note: Option<String>,
}

impl TryFrom<PlanRow> for GiftPlanRow {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(GiftPlanRow {
            department: decode(&row.department)?,
            status: decode(&row.status)?,
            assignment_id: row.assignment_id,
            contact_id: row.contact_id,
            contact_name: row.contact_name,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            salesperson_name: row.salesperson_name,
            estimated_yearly_sales: row.estimated_yearly_sales,
            relationship_score: row.relationship_score,
            gift_id: row.gift_id,
            gift_name: row.gift_name,
            note: row.note,
        })
    }
}

#[async_trait]
impl GiftRepository for PgGiftRepository {
    async fn list_gifts(&self) -> Result<Vec<Gift>, DomainError> {
        let rows: Vec<GiftRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, description, min_yearly_sales, min_relationship_score,
                created_at, created_by, modified_at, modified_by
            FROM gifts
            ORDER BY name
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("listing gifts", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_gift(&self, id: &Uuid) -> Result<Option<Gift>, DomainError> {
        let row: Option<GiftRow> = sqlx::query_as(
            r#"
            SELECT
                id, name, description, min_yearly_sales, min_relationship_score,
                created_at, created_by, modified_at, modified_by
            FROM gifts
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding gift", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create_gift(&self, gift: &Gift) -> Result<Gift, DomainError> {
        info!("Creating gift: {}", gift.name);

        let row: GiftRow = sqlx::query_as(
            r#"
            INSERT INTO gifts (
                id, name, description, min_yearly_sales, min_relationship_score,
                created_at, created_by, modified_at, modified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, name, description, min_yearly_sales, min_relationship_score,
                created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(gift.id)
        .bind(&gift.name)
        .bind(&gift.description)
        .bind(gift.min_yearly_sales)
        .bind(gift.min_relationship_score)
        .bind(gift.created_at)
        .bind(gift.created_by)
        .bind(gift.modified_at)
        .bind(gift.modified_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("creating gift", e))?;

        Ok(row.into())
    }

    async fn list_seasons(&self) -> Result<Vec<GiftSeason>, DomainError> {
        let rows: Vec<SeasonRow> = sqlx::query_as(
            r#"
            SELECT id, name, start_date, end_date, created_at, created_by, modified_at, modified_by
            FROM gift_seasons
            ORDER BY start_date DESC, name
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("listing gift seasons", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_season(&self, id: &Uuid) -> Result<Option<GiftSeason>, DomainError> {
        let row: Option<SeasonRow> = sqlx::query_as(
            r#"
            SELECT id, name, start_date, end_date, created_at, created_by, modified_at, modified_by
            FROM gift_seasons
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding gift season", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_season_by_name(&self, name: &str) -> Result<Option<GiftSeason>, DomainError> {
        let row: Option<SeasonRow> = sqlx::query_as(
            r#"
            SELECT id, name, start_date, end_date, created_at, created_by, modified_at, modified_by
            FROM gift_seasons
            WHERE name = $1
            "#
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding gift season by name", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create_season(&self, season: &GiftSeason) -> Result<GiftSeason, DomainError> {
        info!("Creating gift season: {}", season.name);

        let row: SeasonRow = sqlx::query_as(
            r#"
            INSERT INTO gift_seasons (
                id, name, start_date, end_date, created_at, created_by, modified_at, modified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, start_date, end_date, created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(season.id)
        .bind(&season.name)
        .bind(season.start_date)
        .bind(season.end_date)
        .bind(season.created_at)
        .bind(season.created_by)
        .bind(season.modified_at)
        .bind(season.modified_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating gift season: {}", e);
            if is_unique_violation(&e) {
                DomainError::GiftSeasonNameAlreadyExists(season.name.clone())
            } else {
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    async fn ensure_assignments(
        &self,
        season_id: &Uuid,
        scope: &AccessScope,
        created_by: &Uuid,
    ) -> Result<u64, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e: sqlx::Error| db_error("starting assignment transaction", e))?;

        let mut qb = QueryBuilder::new(
            "INSERT INTO gift_assignments (id, contact_id, season_id, status, created_at, created_by) \
             SELECT gen_random_uuid(), c.id, ",
        );
        qb.push_bind(*season_id)
            .push(", 'no_status', NOW(), ")
            .push_bind(*created_by)
            .push(
                " FROM contacts c \
                 JOIN customers cu ON cu.id = c.customer_id \
                 WHERE c.is_active",
            );
        push_scope(&mut qb, scope);
        qb.push(" ON CONFLICT (contact_id, season_id) DO NOTHING");

        let result = qb
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e: sqlx::Error| db_error("creating gift assignments", e))?;

        tx.commit()
            .await
            .map_err(|e: sqlx::Error| db_error("committing gift assignments", e))?;

        if result.rows_affected() > 0 {
            info!("Opened {} gift assignments for season {}", result.rows_affected(), season_id);
        }
        Ok(result.rows_affected())
    }

    async fn list_plan(&self, season_id: &Uuid, scope: &AccessScope) -> Result<Vec<GiftPlanRow>, DomainError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT ga.id AS assignment_id, c.id AS contact_id, c.name AS contact_name, \
                 cu.id AS customer_id, cu.name AS customer_name, cu.department, \
                 {} AS salesperson_name, cu.estimated_yearly_sales, c.relationship_score, \
                 ga.gift_id, g.name AS gift_name, ga.status, ga.note \
             FROM gift_assignments ga \
             JOIN contacts c ON c.id = ga.contact_id \
             JOIN customers cu ON cu.id = c.customer_id \
             JOIN salespersons sp ON sp.id = cu.salesperson_id \
             JOIN users u ON u.id = sp.user_id \
             LEFT JOIN gifts g ON g.id = ga.gift_id \
             WHERE ga.season_id = ",
            SALESPERSON_NAME
        ));
        qb.push_bind(*season_id);
        push_scope(&mut qb, scope);
        qb.push(" ORDER BY cu.name, c.name");

        let rows: Vec<PlanRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| db_error("listing gift plan", e))?;

        rows.into_iter().map(GiftPlanRow::try_from).collect()
    }

    async fn find_assignment(&self, id: &Uuid) -> Result<Option<GiftAssignment>, DomainError> {
        let row: Option<AssignmentRow> = sqlx::query_as(
            r#"
            SELECT
                id, contact_id, season_id, gift_id, status, note,
                created_at, created_by, modified_at, modified_by
            FROM gift_assignments
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("finding gift assignment", e))?;

        row.map(GiftAssignment::try_from).transpose()
    }

    async fn update_assignment(&self, assignment: &GiftAssignment) -> Result<GiftAssignment, DomainError> {
        let row: Option<AssignmentRow> = sqlx::query_as(
            r#"
            UPDATE gift_assignments
            SET gift_id = $2, status = $3, note = $4, modified_at = $5, modified_by = $6
            WHERE id = $1
            RETURNING
                id, contact_id, season_id, gift_id, status, note,
                created_at, created_by, modified_at, modified_by
            "#
        )
        .bind(assignment.id)
        .bind(assignment.gift_id)
        .bind(assignment.status.as_str())
        .bind(&assignment.note)
        .bind(assignment.modified_at)
        .bind(assignment.modified_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| db_error("updating gift assignment", e))?;

        row.ok_or(DomainError::GiftAssignmentNotFound(assignment.id))?.try_into()
    }
}
