//! User repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::access::Principal;
use crate::domain::{Profile, Role, Salesperson, UserAccount};
use crate::error::DomainError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserAccount>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, DomainError>;
    /// Username or email, case-insensitive.
    async fn find_by_login(&self, login: &str) -> Result<Option<UserAccount>, DomainError>;

    /// Inserts the account, its salesperson record and its profile in one transaction.
    async fn create_with_profile(
        &self,
        user: &UserAccount,
        salesperson: &Salesperson,
        profile: &Profile,
    ) -> Result<UserAccount, DomainError>;

    async fn update_password(&self, user_id: &Uuid, password_hash: &str) -> Result<(), DomainError>;
    async fn record_login(&self, user_id: &Uuid) -> Result<(), DomainError>;

    async fn find_profile(&self, user_id: &Uuid) -> Result<Option<Profile>, DomainError>;
    async fn update_role(&self, user_id: &Uuid, role: Role, modified_by: &Uuid) -> Result<Profile, DomainError>;

    /// Account, role and salesperson record of an active user.
    async fn load_principal(&self, user_id: &Uuid) -> Result<Option<Principal>, DomainError>;
}
