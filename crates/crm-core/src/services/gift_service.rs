// ============================================================================
// CRM Core - Gift Workflow Service
// File: crates/crm-core/src/services/gift_service.rs
// ============================================================================
//! Gift catalog, seasons, lazily opened season plans and assignment edits.
//!
//! Eligibility thresholds on gifts are informational: nothing here filters
//! or suggests gifts by them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{require_executive, AccessScope, Principal};
use crate::domain::{Gift, GiftAssignment, GiftInput, GiftPlanRow, GiftSeason, GiftSeasonInput, GiftStatus};
use crate::error::DomainError;
use crate::repositories::{ContactRepository, CustomerRepository, GiftRepository};

/// Requested assignment state. All three fields are written as given.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentUpdate {
    pub gift_id: Option<Uuid>,
    pub status: GiftStatus,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GiftPlan {
    pub season: GiftSeason,
    pub gifts: Vec<Gift>,
    pub rows: Vec<GiftPlanRow>,
}

pub struct GiftService {
    gifts: Arc<dyn GiftRepository>,
    contacts: Arc<dyn ContactRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl GiftService {
    pub fn new(
        gifts: Arc<dyn GiftRepository>,
        contacts: Arc<dyn ContactRepository>,
        customers: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self { gifts, contacts, customers }
    }

    pub async fn list_gifts(&self) -> Result<Vec<Gift>, DomainError> {
        self.gifts.list_gifts().await
    }

    pub async fn create_gift(&self, principal: &Principal, input: GiftInput) -> Result<Gift, DomainError> {
        require_executive(principal)?;
        let gift = Gift::new(&input, Some(principal.user_id))?;
        let created = self.gifts.create_gift(&gift).await?;
        info!(gift_id = %created.id, "Gift created: {}", created.name);
        Ok(created)
    }

    pub async fn list_seasons(&self) -> Result<Vec<GiftSeason>, DomainError> {
        self.gifts.list_seasons().await
    }

    pub async fn create_season(&self, principal: &Principal, input: GiftSeasonInput) -> Result<GiftSeason, DomainError> {
        require_executive(principal)?;
        self.insert_season(&input, Some(principal.user_id)).await
    }

    async fn insert_season(&self, input: &GiftSeasonInput, created_by: Option<Uuid>) -> Result<GiftSeason, DomainError> {
        let season = GiftSeason::new(input, created_by)?;
        if self.gifts.find_season_by_name(&season.name).await?.is_some() {
            return Err(DomainError::GiftSeasonNameAlreadyExists(season.name));
        }
        let created = self.gifts.create_season(&season).await?;
        info!(season_id = %created.id, "Gift season created: {}", created.name);
        Ok(created)
    }

    /// Makes sure "Christmas <year>" exists. Returns the season and whether it was created.
    pub async fn ensure_holiday_season(&self, year: i32) -> Result<(GiftSeason, bool), DomainError> {
        let input = GiftSeasonInput::christmas(year)
            .ok_or_else(|| DomainError::ValidationError(format!("Invalid year: {}", year)))?;
        if let Some(existing) = self.gifts.find_season_by_name(&input.name).await? {
            return Ok((existing, false));
        }
        let season = self.insert_season(&input, None).await?;
        Ok((season, true))
    }

    /// Opens a season's plan: missing assignments for in-scope active contacts
    /// are created first, then the scoped plan is returned.
    pub async fn open_plan(&self, principal: &Principal, season_id: &Uuid) -> Result<GiftPlan, DomainError> {
        let season = self
            .gifts
            .find_season(season_id)
            .await?
            .ok_or(DomainError::GiftSeasonNotFound(*season_id))?;
        let gifts = self.gifts.list_gifts().await?;

        let scope = AccessScope::for_principal(principal);
        if scope.is_empty() {
            return Ok(GiftPlan { season, gifts, rows: Vec::new() });
        }

        let inserted = self
            .gifts
            .ensure_assignments(season_id, &scope, &principal.user_id)
            .await?;
        if inserted > 0 {
            info!(season_id = %season_id, inserted, "Gift assignments opened");
        }
        let rows = self.gifts.list_plan(season_id, &scope).await?;
        Ok(GiftPlan { season, gifts, rows })
    }

    pub async fn update_assignment(
        &self,
        principal: &Principal,
        id: &Uuid,
        update: AssignmentUpdate,
    ) -> Result<GiftAssignment, DomainError> {
        let mut assignment = self
            .gifts
            .find_assignment(id)
            .await?
            .ok_or(DomainError::GiftAssignmentNotFound(*id))?;

        let contact = self
            .contacts
            .find_by_id(&assignment.contact_id)
            .await?
            .ok_or(DomainError::ContactNotFound(assignment.contact_id))?;
        let customer = self
            .customers
            .find_by_id(&contact.customer_id)
            .await?
            .ok_or(DomainError::CustomerNotFound(contact.customer_id))?;
        if !AccessScope::for_principal(principal).permits_customer(&customer) {
            warn!(user_id = %principal.user_id, assignment_id = %id, "Gift assignment edit denied");
            return Err(DomainError::AccessDenied("Assignment is outside your scope".to_string()));
        }

        if let Some(gift_id) = update.gift_id {
            if self.gifts.find_gift(&gift_id).await?.is_none() {
                return Err(DomainError::GiftNotFound(gift_id));
            }
        }

        let note = crm_shared::utils::non_blank(update.note.as_deref()).map(String::from);
        assignment.update(update.gift_id, update.status, note, principal.user_id);
        let saved = self.gifts.update_assignment(&assignment).await?;
        info!(assignment_id = %saved.id, status = saved.status.as_str(), "Gift assignment updated");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Department;
    use crate::testing::InMemoryCrm;

    fn service(store: &Arc<InMemoryCrm>) -> GiftService {
        GiftService::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_open_plan_is_lazy_and_idempotent() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let customer = store.add_customer("Bloom", Department::Mm2, exec.salesperson_id.unwrap(), 1);
        store.add_contact(customer.id, "Active", None, 1, true);
        store.add_contact(customer.id, "Inactive", None, 1, false);
        let gifts = service(&store);
        let (season, created) = gifts.ensure_holiday_season(2025).await.unwrap();
        assert!(created);

        assert_eq!(store.assignment_count(), 0);
        let plan = gifts.open_plan(&exec, &season.id).await.unwrap();
        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].status, GiftStatus::NoStatus);

        gifts.open_plan(&exec, &season.id).await.unwrap();
        assert_eq!(store.assignment_count(), 1);
    }

    #[tokio::test]
    async fn test_holiday_season_created_once() {
        let store = Arc::new(InMemoryCrm::new());
        let gifts = service(&store);
        let (first, created) = gifts.ensure_holiday_season(2026).await.unwrap();
        let (second, created_again) = gifts.ensure_holiday_season(2026).await.unwrap();
        assert!(created);
        assert!(!created_again);
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "Christmas 2026");
    }

    #[tokio::test]
    async fn test_plan_is_scoped() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let ana = store.add_user("ana", "Salesperson");
        let theirs = store.add_customer("Theirs", Department::Mm2, exec.salesperson_id.unwrap(), 1);
        let mine = store.add_customer("Mine", Department::Mm2, ana.salesperson_id.unwrap(), 1);
        store.add_contact(theirs.id, "X", None, 1, true);
        store.add_contact(mine.id, "Y", None, 1, true);
        let gifts = service(&store);
        let (season, _) = gifts.ensure_holiday_season(2025).await.unwrap();

        let plan = gifts.open_plan(&ana, &season.id).await.unwrap();
        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].contact_name, "Y");
    }

    #[tokio::test]
    async fn test_pending_to_sent_directly() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let customer = store.add_customer("Bloom", Department::Mm2, exec.salesperson_id.unwrap(), 1);
        store.add_contact(customer.id, "Carla", None, 1, true);
        let roses = store.add_gift("Roses");
        let gifts = service(&store);
        let (season, _) = gifts.ensure_holiday_season(2025).await.unwrap();
        let plan = gifts.open_plan(&exec, &season.id).await.unwrap();
        let id = plan.rows[0].assignment_id;

        gifts
            .update_assignment(&exec, &id, AssignmentUpdate { gift_id: None, status: GiftStatus::Pending, note: None })
            .await
            .unwrap();
        let sent = gifts
            .update_assignment(
                &exec,
                &id,
                AssignmentUpdate { gift_id: Some(roses.id), status: GiftStatus::Sent, note: Some("Delivered".into()) },
            )
            .await
            .unwrap();
        assert_eq!(sent.status, GiftStatus::Sent);
        assert_eq!(sent.gift_id, Some(roses.id));
    }

    #[tokio::test]
    async fn test_unknown_gift_rejected() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let customer = store.add_customer("Bloom", Department::Mm2, exec.salesperson_id.unwrap(), 1);
        store.add_contact(customer.id, "Carla", None, 1, true);
        let gifts = service(&store);
        let (season, _) = gifts.ensure_holiday_season(2025).await.unwrap();
        let plan = gifts.open_plan(&exec, &season.id).await.unwrap();

        let result = gifts
            .update_assignment(
                &exec,
                &plan.rows[0].assignment_id,
                AssignmentUpdate { gift_id: Some(Uuid::new_v4()), status: GiftStatus::Approved, note: None },
            )
            .await;
        assert!(matches!(result, Err(DomainError::GiftNotFound(_))));
    }

    #[tokio::test]
    async fn test_out_of_scope_assignment_forbidden() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let ana = store.add_user("ana", "Salesperson");
        let customer = store.add_customer("Bloom", Department::Mm2, exec.salesperson_id.unwrap(), 1);
        store.add_contact(customer.id, "Carla", None, 1, true);
        let gifts = service(&store);
        let (season, _) = gifts.ensure_holiday_season(2025).await.unwrap();
        let plan = gifts.open_plan(&exec, &season.id).await.unwrap();

        let result = gifts
            .update_assignment(
                &ana,
                &plan.rows[0].assignment_id,
                AssignmentUpdate { gift_id: None, status: GiftStatus::Sent, note: None },
            )
            .await;
        assert!(matches!(result, Err(DomainError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_only_executives_create_seasons() {
        let store = Arc::new(InMemoryCrm::new());
        let ana = store.add_user("ana", "Salesperson");
        let gifts = service(&store);
        let input = GiftSeasonInput::christmas(2025).unwrap();
        assert!(matches!(gifts.create_season(&ana, input).await, Err(DomainError::AccessDenied(_))));
    }
}
