//! One-time password-set token store (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::PasswordSetToken;
use crate::error::DomainError;

#[async_trait]
pub trait PasswordTokenRepository: Send + Sync {
    async fn create(&self, token: &PasswordSetToken) -> Result<(), DomainError>;
    async fn find_by_digest(&self, digest: &str) -> Result<Option<PasswordSetToken>, DomainError>;

    /// Marks the token used and stores the new password hash in one transaction.
    /// Fails with `InvalidPasswordToken` when the token was already used.
    async fn consume(&self, token_id: &Uuid, user_id: &Uuid, password_hash: &str) -> Result<(), DomainError>;
}
