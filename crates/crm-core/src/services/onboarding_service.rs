// ============================================================================
// CRM Core - Onboarding Service
// File: crates/crm-core/src/services/onboarding_service.rs
// ============================================================================
//! Welcome emails carrying a one-time password-set link, and redemption of
//! that link.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::access::{require_executive, Principal};
use crate::domain::{PasswordSetToken, UserAccount};
use crate::error::DomainError;
use crate::notifications::{EmailMessage, EmailSender, NotificationTemplates, WelcomeEmailContext};
use crate::repositories::{PasswordTokenRepository, SalespersonRepository, UserRepository};
use crm_security::{OneTimeToken, PasswordService};
use crm_shared::config::AppConfig;

#[derive(Debug, Clone)]
pub struct OnboardingSettings {
    pub public_base_url: String,
    pub from_address: String,
    pub token_ttl_hours: i64,
}

impl OnboardingSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            public_base_url: config.app.public_base_url.clone(),
            from_address: config.notifications.from_address.clone(),
            token_ttl_hours: config.onboarding.password_token_ttl_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WelcomeFailure {
    pub salesperson_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WelcomeReport {
    pub sent: Vec<Uuid>,
    pub failures: Vec<WelcomeFailure>,
}

pub struct OnboardingService {
    users: Arc<dyn UserRepository>,
    salespeople: Arc<dyn SalespersonRepository>,
    tokens: Arc<dyn PasswordTokenRepository>,
    email: Arc<dyn EmailSender>,
    templates: Arc<NotificationTemplates>,
    settings: OnboardingSettings,
}

impl OnboardingService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        salespeople: Arc<dyn SalespersonRepository>,
        tokens: Arc<dyn PasswordTokenRepository>,
        email: Arc<dyn EmailSender>,
        templates: Arc<NotificationTemplates>,
        settings: OnboardingSettings,
    ) -> Self {
        Self {
            users,
            salespeople,
            tokens,
            email,
            templates,
            settings,
        }
    }

    fn set_password_link(&self, plain_token: &str) -> String {
        format!(
            "{}/reset/{}",
            self.settings.public_base_url.trim_end_matches('/'),
            plain_token
        )
    }

    /// Issues a fresh token for `user` and emails the link.
    pub async fn send_welcome(&self, user: &UserAccount) -> Result<(), DomainError> {
        if crm_shared::utils::non_blank(Some(&user.email)).is_none() {
            return Err(DomainError::ValidationError(format!("User {} has no email", user.username)));
        }

        let token = OneTimeToken::generate();
        let record = PasswordSetToken::new(user.id, token.digest.clone(), self.settings.token_ttl_hours);
        self.tokens.create(&record).await?;

        let rendered = self.templates.welcome(&WelcomeEmailContext {
            full_name: user.full_name(),
            username: user.username.clone(),
            set_password_link: self.set_password_link(&token.plain),
            expires_in_hours: self.settings.token_ttl_hours,
        })?;
        self.email
            .send(&EmailMessage {
                from: self.settings.from_address.clone(),
                to: vec![user.email.clone()],
                subject: rendered.subject,
                html_body: rendered.html_body,
                text_body: rendered.text_body,
            })
            .await?;
        info!(user_id = %user.id, "Welcome email sent");
        Ok(())
    }

    pub async fn send_welcome_to_email(&self, email: &str) -> Result<UserAccount, DomainError> {
        let user = self.users.find_by_email(email.trim()).await?.ok_or_else(|| {
            warn!("No user found with email: {}", email);
            DomainError::UserNotFound
        })?;
        self.send_welcome(&user).await?;
        Ok(user)
    }

    /// Bulk action over selected salespeople. Executives only; each
    /// salesperson succeeds or fails on its own.
    pub async fn send_welcome_emails(
        &self,
        principal: &Principal,
        salesperson_ids: &[Uuid],
    ) -> Result<WelcomeReport, DomainError> {
        require_executive(principal)?;
        let summaries = self.salespeople.find_summaries(salesperson_ids).await?;
        let mut report = WelcomeReport::default();

        for id in salesperson_ids {
            let outcome = match summaries.iter().find(|s| s.id == *id) {
                None => Err(DomainError::SalespersonNotFound(*id)),
                Some(summary) => match self.users.find_by_id(&summary.user_id).await {
                    Ok(Some(user)) => self.send_welcome(&user).await,
                    Ok(None) => Err(DomainError::UserNotFound),
                    Err(e) => Err(e),
                },
            };
            match outcome {
                Ok(()) => report.sent.push(*id),
                Err(e) => {
                    error!(salesperson_id = %id, "Welcome email failed: {}", e);
                    report.failures.push(WelcomeFailure {
                        salesperson_id: *id,
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(sent = report.sent.len(), failed = report.failures.len(), "Welcome emails processed");
        Ok(report)
    }

    /// Redeems a password-set token. Tokens are single use and expire.
    pub async fn set_password(&self, plain_token: &str, new_password: &str) -> Result<(), DomainError> {
        let digest = OneTimeToken::digest_of(plain_token);
        let token = self
            .tokens
            .find_by_digest(&digest)
            .await?
            .filter(|t| t.is_usable(Utc::now()))
            .ok_or_else(|| {
                warn!("Rejected password-set token");
                DomainError::InvalidPasswordToken
            })?;
        let user = self
            .users
            .find_by_id(&token.user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        PasswordService::check_strength(new_password, &[user.username.as_str(), user.email.as_str()])?;
        let hash = PasswordService::hash(new_password)?;
        self.tokens.consume(&token.id, &user.id, &hash).await?;
        info!(user_id = %user.id, "Password set via one-time link");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::sender::MockEmailSender;
    use crate::testing::InMemoryCrm;
    use std::sync::Mutex;

    fn service(store: &Arc<InMemoryCrm>, email: MockEmailSender) -> OnboardingService {
        OnboardingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(email),
            Arc::new(NotificationTemplates::new("Floral CRM").unwrap()),
            OnboardingSettings {
                public_base_url: "https://crm.example.com/".to_string(),
                from_address: "noreply@example.com".to_string(),
                token_ttl_hours: 72,
            },
        )
    }

    /// Captures the link from the sent welcome email.
    fn capturing_sender(captured: Arc<Mutex<Option<String>>>) -> MockEmailSender {
        let mut email = MockEmailSender::new();
        email.expect_send().returning(move |m| {
            let link = m
                .text_body
                .lines()
                .find(|l| l.starts_with("https://crm.example.com/reset/"))
                .map(String::from);
            *captured.lock().unwrap() = link;
            Ok(())
        });
        email
    }

    #[tokio::test]
    async fn test_welcome_link_sets_password_once() {
        let store = Arc::new(InMemoryCrm::new());
        let ana = store.add_user("ana", "Salesperson");
        let captured = Arc::new(Mutex::new(None));
        let onboarding = service(&store, capturing_sender(captured.clone()));

        onboarding.send_welcome_to_email("ana@example.com").await.unwrap();
        let link = captured.lock().unwrap().clone().unwrap();
        let token = link.trim_start_matches("https://crm.example.com/reset/");

        onboarding.set_password(token, "Gardenias-Bloom-Twice-88").await.unwrap();
        let user = store.user(ana.user_id).unwrap();
        assert!(PasswordService::verify("Gardenias-Bloom-Twice-88", user.password_hash.as_deref().unwrap()).unwrap());

        assert!(matches!(
            onboarding.set_password(token, "Another-Strong-Pass-99").await,
            Err(DomainError::InvalidPasswordToken)
        ));
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let store = Arc::new(InMemoryCrm::new());
        let onboarding = service(&store, MockEmailSender::new());
        assert!(matches!(
            onboarding.set_password("deadbeef", "Gardenias-Bloom-Twice-88").await,
            Err(DomainError::InvalidPasswordToken)
        ));
    }

    #[tokio::test]
    async fn test_bulk_requires_executive_and_reports_missing() {
        let store = Arc::new(InMemoryCrm::new());
        let exec = store.add_user("boss", "Executive");
        let ana = store.add_user("ana", "Salesperson");
        let mut email = MockEmailSender::new();
        email.expect_send().times(1).returning(|_| Ok(()));
        let onboarding = service(&store, email);

        assert!(onboarding
            .send_welcome_emails(&ana, &[ana.salesperson_id.unwrap()])
            .await
            .is_err());

        let missing = Uuid::new_v4();
        let report = onboarding
            .send_welcome_emails(&exec, &[ana.salesperson_id.unwrap(), missing])
            .await
            .unwrap();
        assert_eq!(report.sent, vec![ana.salesperson_id.unwrap()]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].salesperson_id, missing);
    }
}
