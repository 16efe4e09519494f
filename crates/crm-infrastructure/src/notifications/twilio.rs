// ============================================================================
// CRM Infrastructure - Twilio WhatsApp Sender
// File: crates/crm-infrastructure/src/notifications/twilio.rs
// Description: Content-template WhatsApp messages over the Twilio Messages API
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crm_core::error::DomainError;
use crm_core::notifications::{WhatsAppSender, WhatsAppTemplate, WhatsAppTemplateMessage};
use crm_shared::config::WhatsAppSettings;
use crm_shared::utils::mask_phone;

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

pub struct TwilioWhatsAppSender {
    http_client: Client,
    settings: WhatsAppSettings,
}

impl TwilioWhatsAppSender {
    pub fn new(settings: WhatsAppSettings) -> Result<Self, DomainError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| DomainError::NotificationError(format!("HTTP client error: {}", e)))?;

        Ok(Self { http_client, settings })
    }

    fn template_sid(&self, template: WhatsAppTemplate) -> &str {
        match template {
            WhatsAppTemplate::BirthdayReminder => &self.settings.birthday_template_sid,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.settings.api_base_url.trim_end_matches('/'),
            self.settings.account_sid
        )
    }
}

fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}

/// `{"1": first, "2": second, ...}`
fn content_variables(values: &[String]) -> Result<String, DomainError> {
    let map: BTreeMap<String, &str> = values
        .iter()
        .enumerate()
        .map(|(i, v)| ((i + 1).to_string(), v.as_str()))
        .collect();
    serde_json::to_string(&map).map_err(|e| DomainError::NotificationError(e.to_string()))
}

#[async_trait]
impl WhatsAppSender for TwilioWhatsAppSender {
    async fn send_template(&self, message: &WhatsAppTemplateMessage) -> Result<String, DomainError> {
        let params = [
            ("From", whatsapp_address(&self.settings.from_number)),
            ("To", whatsapp_address(&message.to)),
            ("ContentSid", self.template_sid(message.template).to_string()),
            ("ContentVariables", content_variables(&message.variables)?),
        ];

        let response = self
            .http_client
            .post(self.messages_url())
            .basic_auth(&self.settings.account_sid, Some(&self.settings.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!("WhatsApp request failed: {}", e);
                DomainError::NotificationError(format!("WhatsApp request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ApiErrorResponse>()
                .await
                .ok()
                .map(|e| format!("{} (code {})", e.message.unwrap_or_default(), e.code.unwrap_or_default()))
                .unwrap_or_else(|| "Unknown error".to_string());
            error!("WhatsApp API returned {}: {}", status, detail);
            return Err(DomainError::NotificationError(format!(
                "WhatsApp API returned {}: {}",
                status, detail
            )));
        }

        let body: MessageResponse = response
            .json()
            .await
            .map_err(|e| DomainError::NotificationError(format!("Invalid WhatsApp response: {}", e)))?;

        info!("WhatsApp message {} sent to {}", body.sid, mask_phone(&message.to));
        Ok(body.sid)
    }
}
