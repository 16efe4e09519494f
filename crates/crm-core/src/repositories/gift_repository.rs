//! Gift catalog, seasons and assignments (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::access::AccessScope;
use crate::domain::{Gift, GiftAssignment, GiftPlanRow, GiftSeason};
use crate::error::DomainError;

#[async_trait]
pub trait GiftRepository: Send + Sync {
    async fn list_gifts(&self) -> Result<Vec<Gift>, DomainError>;
    async fn find_gift(&self, id: &Uuid) -> Result<Option<Gift>, DomainError>;
    async fn create_gift(&self, gift: &Gift) -> Result<Gift, DomainError>;

    async fn list_seasons(&self) -> Result<Vec<GiftSeason>, DomainError>;
    async fn find_season(&self, id: &Uuid) -> Result<Option<GiftSeason>, DomainError>;
    async fn find_season_by_name(&self, name: &str) -> Result<Option<GiftSeason>, DomainError>;
    async fn create_season(&self, season: &GiftSeason) -> Result<GiftSeason, DomainError>;

    /// Creates the missing (contact, season) rows for active in-scope contacts.
    /// Existing rows are left untouched. Returns the number inserted.
    async fn ensure_assignments(
        &self,
        season_id: &Uuid,
        scope: &AccessScope,
        created_by: &Uuid,
    ) -> Result<u64, DomainError>;

    async fn list_plan(&self, season_id: &Uuid, scope: &AccessScope) -> Result<Vec<GiftPlanRow>, DomainError>;

    async fn find_assignment(&self, id: &Uuid) -> Result<Option<GiftAssignment>, DomainError>;
    async fn update_assignment(&self, assignment: &GiftAssignment) -> Result<GiftAssignment, DomainError>;
}
