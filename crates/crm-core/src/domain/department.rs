// ============================================================================
// CRM Core - Department
// File: crates/crm-core/src/domain/department.rs
// Description: Closed set of sales departments used for scoping
// ============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Sales department. Stored by key (`mass_market`), shown by display name (`Mass Market`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    #[default]
    MassMarket,
    Mm2,
    Ecommerce,
    Wholesale,
    International,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::MassMarket,
        Department::Mm2,
        Department::Ecommerce,
        Department::Wholesale,
        Department::International,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::MassMarket => "mass_market",
            Department::Mm2 => "mm2",
            Department::Ecommerce => "ecommerce",
            Department::Wholesale => "wholesale",
            Department::International => "international",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Department::MassMarket => "Mass Market",
            Department::Mm2 => "MM2",
            Department::Ecommerce => "Ecommerce",
            Department::Wholesale => "Wholesale",
            Department::International => "International",
        }
    }

    pub fn from_display_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.display_name() == s)
    }
}

impl FromStr for Department {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("department", s))
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
