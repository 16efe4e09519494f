// ============================================================================
// CRM Core - User Account
// File: crates/crm-core/src/domain/user_account.rs
// Description: Login identity plus one-time password-set tokens
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User account entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserAccount {
    pub id: Uuid,

    #[validate(length(min = 3, max = 150, message = "Username must be between 3 and 150 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(max = 150, message = "First name too long"))]
    pub first_name: String,

    #[validate(length(max = 150, message = "Last name too long"))]
    pub last_name: String,

    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
}

impl UserAccount {
    pub fn new(
        username: String,
        email: String,
        first_name: String,
        last_name: String,
        password_hash: Option<String>,
    ) -> Result<Self, validator::ValidationErrors> {
        let user = Self {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            password_hash,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            created_by: None,
            modified_at: None,
            modified_by: None,
        };

        user.validate()?;
        Ok(user)
    }

    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn can_login(&self) -> bool {
        self.is_active && self.password_hash.is_some()
    }
}

/// Password-set token (only the digest of the emailed token is stored)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordSetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordSetToken {
    pub fn new(user_id: Uuid, token_digest: String, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_digest,
            expires_at: now + Duration::hours(ttl_hours),
            used_at: None,
            created_at: now,
        }
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user() {
        let user = UserAccount::new(
            "maria".to_string(),
            " Maria@Example.com ".to_string(),
            "Maria".to_string(),
            "Lopez".to_string(),
            None,
        )
        .unwrap();
        assert_eq!(user.email, "maria@example.com");
        assert_eq!(user.full_name(), "Maria Lopez");
        assert!(!user.can_login());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let user = UserAccount::new(
            "maria".to_string(),
            "not-an-email".to_string(),
            String::new(),
            String::new(),
            None,
        );
        assert!(user.is_err());
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        let user = UserAccount::new(
            "jdoe".to_string(),
            "jdoe@example.com".to_string(),
            String::new(),
            String::new(),
            None,
        )
        .unwrap();
        assert_eq!(user.full_name(), "jdoe");
    }

    #[test]
    fn test_token_usability() {
        let mut token = PasswordSetToken::new(Uuid::new_v4(), "digest".to_string(), 1);
        assert!(token.is_usable(Utc::now()));
        assert!(!token.is_usable(Utc::now() + Duration::hours(2)));
        token.used_at = Some(Utc::now());
        assert!(!token.is_usable(Utc::now()));
    }
}
