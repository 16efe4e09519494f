//! Outbound channels (ports)

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}

/// Pre-approved WhatsApp content templates. The adapter maps each to its provider id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WhatsAppTemplate {
    /// Variables: recipient, contact, customer, contact phone, contact email, wa.me link.
    BirthdayReminder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsAppTemplateMessage {
    pub to: String,
    pub template: WhatsAppTemplate,
    /// Positional values, sent as keys "1".."n".
    pub variables: Vec<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WhatsAppSender: Send + Sync {
    /// Returns the provider message id.
    async fn send_template(&self, message: &WhatsAppTemplateMessage) -> Result<String, DomainError>;
}
