// ============================================================================
// CRM Infrastructure - Adapter Wiring
// File: crates/crm-infrastructure/src/bootstrap.rs
// Description: Builds the PostgreSQL and notification adapters from config
// ============================================================================

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crm_core::error::DomainError;
use crm_core::notifications::{
    BirthdayDispatcher, BirthdaySettings, EmailSender, NotificationTemplates, WhatsAppSender,
};
use crm_core::repositories::{DispatchLedger, Repositories};
use crm_core::services::{GiftService, ImportService, OnboardingService, OnboardingSettings};
use crm_shared::config::AppConfig;

use crate::database::{repositories, PgDispatchLedger};
use crate::notifications::{SmtpEmailSender, TwilioWhatsAppSender};

/// Every outbound adapter, ready to hand to the services.
#[derive(Clone)]
pub struct Adapters {
    pub repos: Repositories,
    pub ledger: Arc<dyn DispatchLedger>,
    pub email: Arc<dyn EmailSender>,
    pub whatsapp: Option<Arc<dyn WhatsAppSender>>,
    pub templates: Arc<NotificationTemplates>,
}

impl Adapters {
    pub fn new(pool: &PgPool, config: &AppConfig) -> Result<Self, DomainError> {
        let email: Arc<dyn EmailSender> = Arc::new(SmtpEmailSender::new(&config.smtp)?);
        let whatsapp: Option<Arc<dyn WhatsAppSender>> = match &config.whatsapp {
            Some(settings) => Some(Arc::new(TwilioWhatsAppSender::new(settings.clone())?)),
            None => {
                info!("WhatsApp not configured; reminders go out by email only");
                None
            }
        };

        Ok(Self {
            repos: repositories(pool),
            ledger: Arc::new(PgDispatchLedger::new(pool.clone())),
            email,
            whatsapp,
            templates: Arc::new(NotificationTemplates::new(config.app.name.clone())?),
        })
    }

    pub fn birthday_dispatcher(&self, config: &AppConfig) -> BirthdayDispatcher {
        BirthdayDispatcher::new(
            self.repos.contacts.clone(),
            self.ledger.clone(),
            self.email.clone(),
            self.whatsapp.clone(),
            self.templates.clone(),
            BirthdaySettings::from_config(config),
        )
    }

    pub fn gift_service(&self) -> GiftService {
        GiftService::new(
            self.repos.gifts.clone(),
            self.repos.contacts.clone(),
            self.repos.customers.clone(),
        )
    }

    pub fn onboarding_service(&self, config: &AppConfig) -> OnboardingService {
        OnboardingService::new(
            self.repos.users.clone(),
            self.repos.salespeople.clone(),
            self.repos.tokens.clone(),
            self.email.clone(),
            self.templates.clone(),
            OnboardingSettings::from_config(config),
        )
    }

    pub fn import_service(&self) -> ImportService {
        ImportService::new(
            self.repos.users.clone(),
            self.repos.customers.clone(),
            self.repos.contacts.clone(),
        )
    }
}
