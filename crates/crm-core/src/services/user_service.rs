//! Role administration

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{require_executive, Principal};
use crate::domain::contact::{normalize_phone, INTERNATIONAL_PHONE};
use crate::domain::{Profile, Role, Salesperson, UserAccount};
use crate::error::DomainError;
use crate::repositories::UserRepository;

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Sets a user's role from its label. Executives only.
    pub async fn change_role(&self, principal: &Principal, user_id: &Uuid, role_label: &str) -> Result<Profile, DomainError> {
        require_executive(principal)?;
        let role = Role::parse(role_label.trim()).ok_or_else(|| {
            warn!("Invalid role selection: {}", role_label);
            DomainError::ValidationError(format!("Invalid role selection: {}", role_label))
        })?;
        if self.users.find_profile(user_id).await?.is_none() {
            return Err(DomainError::UserNotFound);
        }
        let profile = self.users.update_role(user_id, role, &principal.user_id).await?;
        info!(user_id = %user_id, role = %role, changed_by = %principal.user_id, "User role updated");
        Ok(profile)
    }

    /// Finds the salesperson account for `email`, creating it without a
    /// password when missing. Returns the principal and whether it was created.
    pub async fn provision_salesperson(
        &self,
        email: &str,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<(Principal, bool), DomainError> {
        let email = email.trim().to_lowercase();
        let (user, created) = match self.users.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let phone = crm_shared::utils::non_blank(phone).map(normalize_phone);
                if let Some(phone) = phone.as_deref() {
                    if !INTERNATIONAL_PHONE.is_match(phone) {
                        return Err(DomainError::ValidationError(format!(
                            "Salesperson phone must be in international format: {}",
                            phone
                        )));
                    }
                }
                let (first_name, last_name) = split_name(full_name);
                let user = UserAccount::new(email.clone(), email.clone(), first_name, last_name, None)?;
                let salesperson = Salesperson::for_user(user.id, phone);
                let profile = Profile::new(user.id, Role::Salesperson, None);
                let user = self.users.create_with_profile(&user, &salesperson, &profile).await?;
                info!(user_id = %user.id, "Provisioned salesperson account for {}", user.email);
                (user, true)
            }
        };

        let principal = self.users.load_principal(&user.id).await?.ok_or_else(|| {
            warn!("Account {} is inactive", user.email);
            DomainError::ValidationError(format!("Account {} is inactive", user.email))
        })?;
        if principal.salesperson_id.is_none() {
            return Err(DomainError::ValidationError(format!(
                "Account {} has no salesperson record",
                user.email
            )));
        }
        Ok((principal, created))
    }
}

fn split_name(full_name: &str) -> (String, String) {
    let full_name = full_name.trim();
    match full_name.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (full_name.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Department;
    use crate::testing::InMemoryCrm;

    #[tokio::test]
    async fn test_executive_changes_role() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let sp = store.add_user("ana", "Salesperson");
        let service = UserService::new(store);

        let profile = service.change_role(&exec, &sp.user_id, "Manager - Wholesale").await.unwrap();
        assert_eq!(profile.role, Some(Role::Manager(Department::Wholesale)));
        assert_eq!(profile.role_label, "Manager - Wholesale");
    }

    #[tokio::test]
    async fn test_non_executive_denied() {
        let store = Arc::new(InMemoryCrm::new());
        let mgr = store.add_user("mgr", "Manager - MM2");
        let sp = store.add_user("ana", "Salesperson");
        let service = UserService::new(store);
        assert!(matches!(
            service.change_role(&mgr, &sp.user_id, "Executive").await,
            Err(DomainError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_provision_salesperson_is_idempotent() {
        let store = Arc::new(InMemoryCrm::new());
        let service = UserService::new(store.clone());

        let (first, created) = service
            .provision_salesperson("Ana@Example.com", "Ana Maria Lopez", Some("+1 305 555 0100"))
            .await
            .unwrap();
        assert!(created);
        assert!(first.salesperson_id.is_some());
        assert_eq!(first.role, Some(Role::Salesperson));
        let user = store.user(first.user_id).unwrap();
        assert_eq!(user.username, "ana@example.com");
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.last_name, "Maria Lopez");
        assert!(user.password_hash.is_none());

        let (again, created) = service.provision_salesperson("ana@example.com", "Ana", None).await.unwrap();
        assert!(!created);
        assert_eq!(again.salesperson_id, first.salesperson_id);
    }

    #[tokio::test]
    async fn test_provision_rejects_local_phone() {
        let store = Arc::new(InMemoryCrm::new());
        let service = UserService::new(store);
        assert!(matches!(
            service.provision_salesperson("leo@example.com", "Leo", Some("555-0100")).await,
            Err(DomainError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let sp = store.add_user("ana", "Salesperson");
        let service = UserService::new(store);
        assert!(matches!(
            service.change_role(&exec, &sp.user_id, "Manager - Florida").await,
            Err(DomainError::ValidationError(_))
        ));
    }
}
