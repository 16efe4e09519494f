// ============================================================================
// CRM Core - Gift Workflow Entities
// File: crates/crm-core/src/domain/gift.rs
// Description: Gift seasons, the gift catalog and per-contact assignments
// ============================================================================

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{Department, UnknownVariant};
use crate::error::DomainError;

/// Assignment status. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftStatus {
    #[default]
    NoStatus,
    Pending,
    Approved,
    Sent,
}

impl GiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftStatus::NoStatus => "no_status",
            GiftStatus::Pending => "pending",
            GiftStatus::Approved => "approved",
            GiftStatus::Sent => "sent",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GiftStatus::NoStatus => "No Status",
            GiftStatus::Pending => "Pending",
            GiftStatus::Approved => "Approved",
            GiftStatus::Sent => "Sent",
        }
    }
}

impl FromStr for GiftStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_status" => Ok(GiftStatus::NoStatus),
            "pending" => Ok(GiftStatus::Pending),
            "approved" => Ok(GiftStatus::Approved),
            "sent" => Ok(GiftStatus::Sent),
            other => Err(UnknownVariant::new("gift status", other)),
        }
    }
}

/// Named gifting window, e.g. "Christmas 2025".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftSeason {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_season_dates"))]
pub struct GiftSeasonInput {
    #[validate(length(min = 1, max = 100, message = "Season name must be between 1 and 100 characters"))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn validate_season_dates(input: &GiftSeasonInput) -> Result<(), ValidationError> {
    if input.start_date > input.end_date {
        let mut err = ValidationError::new("invalid_season_dates");
        err.message = Some("Season start date must not be after its end date".into());
        return Err(err);
    }
    Ok(())
}

impl GiftSeasonInput {
    /// Dec 1 to Dec 25 of `year`.
    pub fn christmas(year: i32) -> Option<Self> {
        Some(Self {
            name: format!("Christmas {}", year),
            start_date: NaiveDate::from_ymd_opt(year, 12, 1)?,
            end_date: NaiveDate::from_ymd_opt(year, 12, 25)?,
        })
    }
}

impl GiftSeason {
    pub fn new(input: &GiftSeasonInput, created_by: Option<Uuid>) -> Result<Self, DomainError> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Catalog item. The thresholds are informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gift {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub min_yearly_sales: i64,
    pub min_relationship_score: i32,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GiftInput {
    #[validate(length(min = 1, max = 255, message = "Gift name must be between 1 and 255 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Minimum yearly sales cannot be negative"))]
    pub min_yearly_sales: i64,

    #[serde(default)]
    #[validate(range(min = 0, max = 5, message = "Minimum relationship score must be between 0 and 5"))]
    pub min_relationship_score: i32,
}

impl Gift {
    pub fn new(input: &GiftInput, created_by: Option<Uuid>) -> Result<Self, DomainError> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: crm_shared::utils::non_blank(input.description.as_deref())
                .map(String::from),
            min_yearly_sales: input.min_yearly_sales,
            min_relationship_score: input.min_relationship_score,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        })
    }
}

/// One contact's gift for one season. Unique per (contact, season).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftAssignment {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub season_id: Uuid,
    pub gift_id: Option<Uuid>,
    pub status: GiftStatus,
    pub note: Option<String>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl GiftAssignment {
    pub fn open(contact_id: Uuid, season_id: Uuid, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id,
            season_id,
            gift_id: None,
            status: GiftStatus::NoStatus,
            note: None,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        }
    }

    /// Overwrites gift, status and note unconditionally.
    pub fn update(
        &mut self,
        gift_id: Option<Uuid>,
        status: GiftStatus,
        note: Option<String>,
        modified_by: Uuid,
    ) {
        self.gift_id = gift_id;
        self.status = status;
        self.note = note;
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
    }
}

/// Row of a season's gift plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftPlanRow {
    pub assignment_id: Uuid,
    pub contact_id: Uuid,
    pub contact_name: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub department: Department,
    pub salesperson_name: String,
    pub estimated_yearly_sales: i64,
    pub relationship_score: i32,
    pub gift_id: Option<Uuid>,
    pub gift_name: Option<String>,
    pub status: GiftStatus,
    pub note: Option<String>,
}
