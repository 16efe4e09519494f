//! Configuration management

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub smtp: SmtpSettings,
    #[serde(default)]
    pub whatsapp: Option<WhatsAppSettings>,
    pub notifications: NotificationSettings,
    pub access: AccessSettings,
    pub onboarding: OnboardingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub public_base_url: String,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub starttls: bool,
}

/// Twilio WhatsApp content-template channel. Absent means the channel is off.
#[derive(Debug, Deserialize, Clone)]
pub struct WhatsAppSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub birthday_template_sid: String,
    #[serde(default = "default_twilio_base_url")]
    pub api_base_url: String,
}

fn default_twilio_base_url() -> String {
    "https://api.twilio.com/2010-04-01".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    pub from_address: String,
    pub dashboard_url: String,
    #[serde(default)]
    pub managers: Vec<ManagerRecipient>,
    pub birthday_schedule: String,
    pub gift_season_schedule: String,
    pub utc_offset_hours: i32,
}

impl NotificationSettings {
    /// Offset of the business's local day. Out-of-range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours.saturating_mul(3600)).unwrap_or_else(|| Utc.fix())
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset()).date_naive()
    }
}

/// A fixed recipient that receives a copy of every birthday reminder.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ManagerRecipient {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AccessSettings {
    pub salesperson_change_policy: SalespersonChangePolicy,
}

/// What happens when a salesperson submits a different owner for an existing customer.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SalespersonChangePolicy {
    #[default]
    Reject,
    Ignore,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OnboardingSettings {
    pub password_token_ttl_hours: i64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "crm-server")?
            .set_default("app.public_base_url", "http://localhost:8080")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("jwt.access_token_expiry", crate::constants::DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("smtp.port", 587)?
            .set_default("smtp.starttls", true)?
            .set_default("notifications.birthday_schedule", "0 0 8 * * * *")?
            .set_default("notifications.gift_season_schedule", "0 0 6 1 11 * *")?
            .set_default("notifications.utc_offset_hours", 0)?
            .set_default("access.salesperson_change_policy", "reject")?
            .set_default("onboarding.password_token_ttl_hours", 72)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_deserializes_lowercase() {
        let cfg = Config::builder()
            .set_default("salesperson_change_policy", "ignore")
            .unwrap()
            .build()
            .unwrap();
        let access: AccessSettings = cfg.try_deserialize().unwrap();
        assert_eq!(access.salesperson_change_policy, SalespersonChangePolicy::Ignore);
    }

    #[test]
    fn test_utc_offset_out_of_range_falls_back() {
        let settings = |hours| NotificationSettings {
            from_address: "crm@example.com".to_string(),
            dashboard_url: "http://localhost".to_string(),
            managers: vec![],
            birthday_schedule: "0 0 8 * * * *".to_string(),
            gift_season_schedule: "0 0 6 1 11 * *".to_string(),
            utc_offset_hours: hours,
        };
        assert_eq!(settings(-5).utc_offset().local_minus_utc(), -5 * 3600);
        assert_eq!(settings(99).utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_whatsapp_base_url_default() {
        let cfg = Config::builder()
            .set_default("account_sid", "AC123").unwrap()
            .set_default("auth_token", "secret").unwrap()
            .set_default("from_number", "+14155238886").unwrap()
            .set_default("birthday_template_sid", "HX123").unwrap()
            .build()
            .unwrap();
        let wa: WhatsAppSettings = cfg.try_deserialize().unwrap();
        assert_eq!(wa.api_base_url, "https://api.twilio.com/2010-04-01");
    }
}
