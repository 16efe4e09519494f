// ============================================================================
// CRM Core - Mutation Policy
// File: crates/crm-core/src/access/policy.rs
// Description: Who may create and edit customers and contacts
// ============================================================================

use tracing::warn;
use uuid::Uuid;

use super::{AccessScope, Principal};
use crate::domain::{Customer, CustomerInput, Department, Role};
use crate::error::DomainError;
use crm_shared::config::SalespersonChangePolicy;

pub fn require_executive(principal: &Principal) -> Result<(), DomainError> {
    if principal.is_executive() {
        Ok(())
    } else {
        warn!(user_id = %principal.user_id, "Executive-only operation denied");
        Err(DomainError::AccessDenied("Executive role required".to_string()))
    }
}

/// Returns the department a manager oversees.
pub fn require_manager(principal: &Principal) -> Result<Department, DomainError> {
    principal
        .role
        .and_then(|r| r.managed_department())
        .ok_or_else(|| {
            warn!(user_id = %principal.user_id, "Manager-only operation denied");
            DomainError::AccessDenied("Manager role required".to_string())
        })
}

fn own_salesperson(principal: &Principal) -> Result<Uuid, DomainError> {
    principal.salesperson_id.ok_or_else(|| {
        DomainError::AccessDenied("No salesperson record for this user".to_string())
    })
}

/// Resolves the owner of a new customer.
///
/// Executives may name any salesperson (defaulting to their own record);
/// everyone else owns what they create. Managers stay inside their department.
pub fn authorize_customer_create(
    principal: &Principal,
    input: &CustomerInput,
) -> Result<Uuid, DomainError> {
    match principal.role {
        Some(Role::Executive) => input
            .salesperson_id
            .or(principal.salesperson_id)
            .ok_or_else(|| DomainError::ValidationError("A salesperson is required".to_string())),
        Some(Role::Manager(dept)) => {
            if input.department != dept {
                warn!(user_id = %principal.user_id, "Manager tried to create a customer outside their department");
                return Err(DomainError::AccessDenied(format!(
                    "Managers may only create {} customers",
                    dept.display_name()
                )));
            }
            own_salesperson(principal)
        }
        Some(Role::Salesperson) => own_salesperson(principal),
        None => Err(DomainError::AccessDenied("Unrecognized role".to_string())),
    }
}

/// Resolves the owner a customer edit will store. The caller must already
/// have checked that `existing` is in the principal's scope.
pub fn authorize_customer_update(
    principal: &Principal,
    policy: SalespersonChangePolicy,
    existing: &Customer,
    input: &CustomerInput,
) -> Result<Uuid, DomainError> {
    let requested = input.salesperson_id.unwrap_or(existing.salesperson_id);
    match principal.role {
        Some(Role::Executive) => Ok(requested),
        Some(Role::Manager(dept)) => {
            if input.department != dept {
                warn!(user_id = %principal.user_id, customer_id = %existing.id, "Manager tried to move a customer out of their department");
                return Err(DomainError::AccessDenied(format!(
                    "Managers may not move customers out of {}",
                    dept.display_name()
                )));
            }
            Ok(requested)
        }
        Some(Role::Salesperson) => {
            if requested == existing.salesperson_id {
                return Ok(requested);
            }
            match policy {
                SalespersonChangePolicy::Reject => {
                    warn!(user_id = %principal.user_id, customer_id = %existing.id, "Salesperson reassignment rejected");
                    Err(DomainError::SalespersonReassignmentForbidden)
                }
                SalespersonChangePolicy::Ignore => {
                    warn!(user_id = %principal.user_id, customer_id = %existing.id, "Salesperson reassignment ignored");
                    Ok(existing.salesperson_id)
                }
            }
        }
        None => Err(DomainError::AccessDenied("Unrecognized role".to_string())),
    }
}

/// A contact may be added to any customer the principal can see.
pub fn authorize_contact_create(principal: &Principal, customer: &Customer) -> Result<(), DomainError> {
    if AccessScope::for_principal(principal).permits_customer(customer) {
        Ok(())
    } else {
        warn!(user_id = %principal.user_id, customer_id = %customer.id, "Contact creation denied");
        Err(DomainError::AccessDenied("Customer is outside your scope".to_string()))
    }
}
