// ============================================================================
// CRM Core - Access Scope
// File: crates/crm-core/src/access/scope.rs
// Description: Visible subset of customers (and, through them, contacts)
// ============================================================================

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::Principal;
use crate::domain::{Customer, Department, Role};

/// Row filter derived from a principal's role. Repositories translate it into
/// a `WHERE` clause on the customer table; contacts inherit it through their
/// customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AccessScope {
    All,
    Department(Department),
    Salesperson(Uuid),
    Nothing,
}

impl AccessScope {
    pub fn for_principal(principal: &Principal) -> Self {
        let scope = match (principal.role, principal.salesperson_id) {
            (Some(Role::Executive), _) => AccessScope::All,
            (Some(Role::Manager(dept)), _) => AccessScope::Department(dept),
            (Some(Role::Salesperson), Some(sp)) => AccessScope::Salesperson(sp),
            (Some(Role::Salesperson), None) | (None, _) => AccessScope::Nothing,
        };
        debug!(user_id = %principal.user_id, scope = ?scope, "Resolved access scope");
        scope
    }

    /// Whether a customer with this department and owner is visible.
    pub fn permits(&self, department: Department, salesperson_id: Uuid) -> bool {
        match self {
            AccessScope::All => true,
            AccessScope::Department(dept) => *dept == department,
            AccessScope::Salesperson(sp) => *sp == salesperson_id,
            AccessScope::Nothing => false,
        }
    }

    pub fn permits_customer(&self, customer: &Customer) -> bool {
        self.permits(customer.department, customer.salesperson_id)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AccessScope::Nothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Option<Role>, salesperson_id: Option<Uuid>) -> Principal {
        Principal::new(Uuid::new_v4(), "tester", salesperson_id, role)
    }

    #[test]
    fn test_executive_sees_everything() {
        let scope = AccessScope::for_principal(&principal(Some(Role::Executive), None));
        assert_eq!(scope, AccessScope::All);
        assert!(scope.permits(Department::International, Uuid::new_v4()));
    }

    #[test]
    fn test_manager_sees_department() {
        let scope = AccessScope::for_principal(&principal(
            Some(Role::Manager(Department::Wholesale)),
            Some(Uuid::new_v4()),
        ));
        assert!(scope.permits(Department::Wholesale, Uuid::new_v4()));
        assert!(!scope.permits(Department::Ecommerce, Uuid::new_v4()));
    }

    #[test]
    fn test_salesperson_sees_own_customers() {
        let sp = Uuid::new_v4();
        let scope = AccessScope::for_principal(&principal(Some(Role::Salesperson), Some(sp)));
        assert!(scope.permits(Department::MassMarket, sp));
        assert!(!scope.permits(Department::MassMarket, Uuid::new_v4()));
    }

    #[test]
    fn test_salesperson_without_record_sees_nothing() {
        let scope = AccessScope::for_principal(&principal(Some(Role::Salesperson), None));
        assert!(scope.is_empty());
    }

    #[test]
    fn test_unknown_manager_department_sees_nothing() {
        let role = Role::parse("Manager - Florida");
        assert!(role.is_none());
        let scope = AccessScope::for_principal(&principal(role, Some(Uuid::new_v4())));
        assert_eq!(scope, AccessScope::Nothing);
        assert!(!scope.permits(Department::Wholesale, Uuid::new_v4()));
    }
}
