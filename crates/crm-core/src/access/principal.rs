//! Authenticated caller

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Role;

/// The caller as seen by the access rules.
///
/// `role` is `None` when the stored role label does not parse; such a
/// principal is denied everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub salesperson_id: Option<Uuid>,
    pub role: Option<Role>,
}

impl Principal {
    pub fn new(user_id: Uuid, username: impl Into<String>, salesperson_id: Option<Uuid>, role: Option<Role>) -> Self {
        Self {
            user_id,
            username: username.into(),
            salesperson_id,
            role,
        }
    }

    pub fn is_executive(&self) -> bool {
        matches!(self.role, Some(Role::Executive))
    }

    pub fn role_label(&self) -> String {
        self.role
            .map(|r| r.label())
            .unwrap_or_else(|| "Unrecognized".to_string())
    }
}
