// ============================================================================
// CRM Core - Role & Profile
// File: crates/crm-core/src/domain/role.rs
// Description: Principal roles and the per-user profile that carries them
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Department;

const MANAGER_PREFIX: &str = "Manager - ";

/// Role of a user. Persisted as its label, e.g. `"Manager - Wholesale"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Executive,
    #[default]
    Salesperson,
    Manager(Department),
}

impl Role {
    pub fn label(&self) -> String {
        match self {
            Role::Executive => "Executive".to_string(),
            Role::Salesperson => "Salesperson".to_string(),
            Role::Manager(dept) => format!("{}{}", MANAGER_PREFIX, dept.display_name()),
        }
    }

    /// Parses a stored label. Unknown labels, including managers of an unknown
    /// department, yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Executive" => Some(Role::Executive),
            "Salesperson" => Some(Role::Salesperson),
            other => other
                .strip_prefix(MANAGER_PREFIX)
                .and_then(Department::from_display_name)
                .map(Role::Manager),
        }
    }

    pub fn all() -> Vec<Role> {
        let mut roles = vec![Role::Executive, Role::Salesperson];
        roles.extend(Department::ALL.into_iter().map(Role::Manager));
        roles
    }

    pub fn is_executive(&self) -> bool {
        matches!(self, Role::Executive)
    }

    pub fn managed_department(&self) -> Option<Department> {
        match self {
            Role::Manager(dept) => Some(*dept),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.label()
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::parse(&value).ok_or_else(|| format!("unknown role: {}", value))
    }
}

/// Profile entity (1:1 with a user account)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    /// `None` when the stored label is not a recognized role.
    pub role: Option<Role>,
    pub role_label: String,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl Profile {
    pub fn new(user_id: Uuid, role: Role, created_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            role: Some(role),
            role_label: role.label(),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
        }
    }

    pub fn change_role(&mut self, role: Role, modified_by: Uuid) {
        self.role = Some(role);
        self.role_label = role.label();
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_label_roundtrip() {
        let role = Role::Manager(Department::Wholesale);
        assert_eq!(role.label(), "Manager - Wholesale");
        assert_eq!(Role::parse("Manager - Wholesale"), Some(role));
        assert_eq!(Role::parse("Manager - Mass Market"), Some(Role::Manager(Department::MassMarket)));
    }

    #[test]
    fn test_unknown_manager_department_fails_closed() {
        assert_eq!(Role::parse("Manager - Bouquets"), None);
        assert_eq!(Role::parse("Manager -Wholesale"), None);
        assert_eq!(Role::parse("manager - wholesale"), None);
    }

    #[test]
    fn test_all_roles_parse_from_their_labels() {
        for role in Role::all() {
            assert_eq!(Role::parse(&role.label()), Some(role));
        }
        assert_eq!(Role::all().len(), 2 + Department::ALL.len());
        assert_eq!(Role::default(), Role::Salesperson);
    }

    #[test]
    fn test_serde_as_label() {
        let json = serde_json::to_string(&Role::Manager(Department::Mm2)).unwrap();
        assert_eq!(json, "\"Manager - MM2\"");
        let role: Role = serde_json::from_str("\"Executive\"").unwrap();
        assert_eq!(role, Role::Executive);
        assert!(serde_json::from_str::<Role>("\"Owner\"").is_err());
    }

    #[test]
    fn test_change_role() {
        let mut profile = Profile::new(Uuid::new_v4(), Role::Salesperson, None);
        profile.change_role(Role::Executive, Uuid::new_v4());
        assert_eq!(profile.role, Some(Role::Executive));
        assert_eq!(profile.role_label, "Executive");
        assert!(profile.modified_at.is_some());
    }
}
