// ============================================================================
// CRM Core - Authentication Service
// File: crates/crm-core/src/services/auth_service.rs
// ============================================================================
//! Signup, login and bearer-token resolution

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::access::Principal;
use crate::domain::contact::{normalize_phone, INTERNATIONAL_PHONE};
use crate::domain::{Profile, Role, Salesperson, UserAccount};
use crate::error::DomainError;
use crate::repositories::UserRepository;
use crm_security::{JwtService, PasswordService};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 3, max = 150, message = "Username must be between 3 and 150 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    pub password: String,

    #[validate(regex(path = *INTERNATIONAL_PHONE, message = "Phone must be in international format"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub salesperson_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Authentication service for signup and login flows
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Creates the account together with its salesperson record and a
    /// Salesperson profile.
    pub async fn signup(&self, mut input: SignupInput) -> Result<UserAccount, DomainError> {
        input.phone = crm_shared::utils::non_blank(input.phone.as_deref()).map(normalize_phone);
        input.validate()?;
        info!("Signup attempt for username: {}", input.username);

        if self.users.find_by_username(&input.username).await?.is_some() {
            warn!("Signup failed: username already exists: {}", input.username);
            return Err(DomainError::UsernameAlreadyExists(input.username));
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            warn!("Signup failed: email already exists: {}", input.email);
            return Err(DomainError::EmailAlreadyExists(input.email));
        }

        PasswordService::check_strength(
            &input.password,
            &[
                input.username.as_str(),
                input.email.as_str(),
                input.first_name.as_str(),
                input.last_name.as_str(),
            ],
        )?;
        let password_hash = PasswordService::hash(&input.password)?;

        let user = UserAccount::new(
            input.username,
            input.email,
            input.first_name,
            input.last_name,
            Some(password_hash),
        )?;
        let salesperson = Salesperson::for_user(user.id, input.phone);
        let profile = Profile::new(user.id, Role::Salesperson, None);

        let created = self.users.create_with_profile(&user, &salesperson, &profile).await?;
        info!(user_id = %created.id, "Signup successful for: {}", created.username);
        Ok(created)
    }

    /// Login with username or email and password
    pub async fn login(&self, login: &str, password: &str) -> Result<LoginResult, DomainError> {
        info!("Login attempt for: {}", login);

        let user = self.users.find_by_login(login.trim()).await?.ok_or_else(|| {
            warn!("Login failed: unknown login: {}", login);
            DomainError::InvalidCredentials
        })?;

        if !user.is_active {
            warn!(user_id = %user.id, "Login failed: user not active");
            return Err(DomainError::UserNotActive);
        }

        let stored_hash = user.password_hash.as_deref().ok_or_else(|| {
            warn!(user_id = %user.id, "Login failed: password not set yet");
            DomainError::InvalidCredentials
        })?;
        if !PasswordService::verify(password, stored_hash).map_err(|_| DomainError::InvalidCredentials)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(DomainError::InvalidCredentials);
        }

        let access_token = self
            .jwt
            .generate_access_token(&user.id)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        if let Err(e) = self.users.record_login(&user.id).await {
            error!("Failed to update last login: {}", e);
        }

        let principal = self.users.load_principal(&user.id).await?;
        info!(user_id = %user.id, "Login successful");

        Ok(LoginResult {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry(),
            user: UserInfo {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                full_name: user.full_name(),
                role: principal
                    .as_ref()
                    .map(|p| p.role_label())
                    .unwrap_or_default(),
                salesperson_id: principal.and_then(|p| p.salesperson_id),
            },
        })
    }

    /// Resolves a bearer token to the caller.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, DomainError> {
        let claims = self.jwt.validate_access_token(token).map_err(|e| {
            warn!("Rejected access token: {}", e);
            DomainError::InvalidToken
        })?;
        let user_id = claims.user_id().map_err(|_| DomainError::InvalidToken)?;
        self.users
            .load_principal(&user_id)
            .await?
            .ok_or(DomainError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryCrm;

    fn service(store: Arc<InMemoryCrm>) -> AuthService {
        AuthService::new(store, JwtService::new("test-secret-key".to_string(), 3600))
    }

    fn signup_input(username: &str) -> SignupInput {
        SignupInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: "Maria".to_string(),
            last_name: "Lopez".to_string(),
            password: "Tulips-and-Orchids-2025".to_string(),
            phone: Some("+1 305 555 0142".to_string()),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_salesperson_principal() {
        let store = Arc::new(InMemoryCrm::new());
        let auth = service(store.clone());
        let user = auth.signup(signup_input("maria")).await.unwrap();

        let principal = store.load_principal(&user.id).await.unwrap().unwrap();
        assert_eq!(principal.role, Some(Role::Salesperson));
        assert!(principal.salesperson_id.is_some());
    }

    #[tokio::test]
    async fn test_signup_duplicate_username() {
        let store = Arc::new(InMemoryCrm::new());
        let auth = service(store);
        auth.signup(signup_input("maria")).await.unwrap();
        let mut again = signup_input("maria");
        again.email = "other@example.com".to_string();
        assert!(matches!(
            auth.signup(again).await,
            Err(DomainError::UsernameAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_weak_password() {
        let auth = service(Arc::new(InMemoryCrm::new()));
        let mut input = signup_input("maria");
        input.password = "password".to_string();
        assert!(matches!(auth.signup(input).await, Err(DomainError::PasswordTooWeak)));
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let store = Arc::new(InMemoryCrm::new());
        let auth = service(store);
        let user = auth.signup(signup_input("maria")).await.unwrap();

        let result = auth.login("MARIA@example.com", "Tulips-and-Orchids-2025").await.unwrap();
        assert_eq!(result.user.id, user.id);
        assert_eq!(result.user.role, "Salesperson");

        let principal = auth.authenticate(&result.access_token).await.unwrap();
        assert_eq!(principal.user_id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = service(Arc::new(InMemoryCrm::new()));
        auth.signup(signup_input("maria")).await.unwrap();
        assert!(matches!(
            auth.login("maria", "wrong-password").await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_garbage_token() {
        let auth = service(Arc::new(InMemoryCrm::new()));
        assert!(matches!(auth.authenticate("not-a-jwt").await, Err(DomainError::InvalidToken)));
    }
}
