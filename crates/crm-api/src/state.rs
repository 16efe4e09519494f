// ============================================================================
// CRM API - Application State
// File: crates/crm-api/src/state.rs
// ============================================================================

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use sqlx::PgPool;

use crm_core::notifications::{EmailSender, NotificationTemplates};
use crm_core::repositories::Repositories;
use crm_core::services::{
    AuthService, ContactService, CustomerService, DashboardService, ExportService, GiftService,
    OnboardingService, OnboardingSettings, UserService,
};
use crm_security::JwtService;
use crm_shared::config::{AppConfig, SalespersonChangePolicy};
use crm_shared::constants::LOGIN_ATTEMPTS_PER_MINUTE;

/// Settings the HTTP layer needs beyond the repositories.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub jwt_secret: String,
    pub access_token_expiry: i64,
    pub change_policy: SalespersonChangePolicy,
    pub onboarding: OnboardingSettings,
    pub utc_offset: FixedOffset,
    pub login_attempts_per_minute: u32,
}

impl ApiSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            change_policy: config.access.salesperson_change_policy,
            onboarding: OnboardingSettings::from_config(config),
            utc_offset: config.notifications.utc_offset(),
            login_attempts_per_minute: LOGIN_ATTEMPTS_PER_MINUTE,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub customers: Arc<CustomerService>,
    pub contacts: Arc<ContactService>,
    pub gifts: Arc<GiftService>,
    pub dashboard: Arc<DashboardService>,
    pub exports: Arc<ExportService>,
    pub onboarding: Arc<OnboardingService>,
    /// Failed and successful attempts alike, keyed by the lowercased login.
    pub login_limiter: Arc<DefaultKeyedRateLimiter<String>>,
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(
        db: PgPool,
        repos: &Repositories,
        email: Arc<dyn EmailSender>,
        templates: Arc<NotificationTemplates>,
        settings: ApiSettings,
    ) -> Self {
        let jwt = JwtService::new(settings.jwt_secret, settings.access_token_expiry);
        let quota = Quota::per_minute(
            NonZeroU32::new(settings.login_attempts_per_minute).unwrap_or(NonZeroU32::MIN),
        );

        Self {
            db,
            auth: Arc::new(AuthService::new(repos.users.clone(), jwt)),
            users: Arc::new(UserService::new(repos.users.clone())),
            customers: Arc::new(CustomerService::new(
                repos.customers.clone(),
                repos.contacts.clone(),
                repos.salespeople.clone(),
                settings.change_policy,
            )),
            contacts: Arc::new(ContactService::new(repos.contacts.clone(), repos.customers.clone())),
            gifts: Arc::new(GiftService::new(
                repos.gifts.clone(),
                repos.contacts.clone(),
                repos.customers.clone(),
            )),
            dashboard: Arc::new(DashboardService::new(
                repos.reports.clone(),
                repos.contacts.clone(),
                repos.salespeople.clone(),
            )),
            exports: Arc::new(ExportService::new(repos.customers.clone(), repos.contacts.clone())),
            onboarding: Arc::new(OnboardingService::new(
                repos.users.clone(),
                repos.salespeople.clone(),
                repos.tokens.clone(),
                email,
                templates,
                settings.onboarding,
            )),
            login_limiter: Arc::new(RateLimiter::keyed(quota)),
            utc_offset: settings.utc_offset,
        }
    }

    /// Current date in the business's local offset.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }
}
