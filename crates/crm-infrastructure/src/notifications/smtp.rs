// ============================================================================
// CRM Infrastructure - SMTP Email Sender
// File: crates/crm-infrastructure/src/notifications/smtp.rs
// ============================================================================

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info};

use crm_core::error::DomainError;
use crm_core::notifications::{EmailMessage, EmailSender};
use crm_shared::config::SmtpSettings;
use crm_shared::utils::mask_email;

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    pub fn new(settings: &SmtpSettings) -> Result<Self, DomainError> {
        let builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| DomainError::NotificationError(format!("SMTP relay error: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let builder = builder.port(settings.port);
        let builder = match (&settings.username, &settings.password) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DomainError> {
    address
        .parse()
        .map_err(|e| DomainError::NotificationError(format!("Invalid address {}: {}", address, e)))
}

/// Builds a multipart/alternative message with the text and HTML bodies.
pub(crate) fn build_message(message: &EmailMessage) -> Result<Message, DomainError> {
    if message.to.is_empty() {
        return Err(DomainError::NotificationError("Email has no recipients".to_string()));
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(&message.from)?)
        .subject(message.subject.clone());
    for recipient in &message.to {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    builder
        .multipart(MultiPart::alternative_plain_html(
            message.text_body.clone(),
            message.html_body.clone(),
        ))
        .map_err(|e| DomainError::NotificationError(format!("Failed to build email: {}", e)))
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let email = build_message(message)?;

        self.transport.send(email).await.map_err(|e| {
            error!("SMTP send failed: {}", e);
            DomainError::NotificationError(format!("Failed to send email: {}", e))
        })?;

        let recipients: Vec<String> = message.to.iter().map(|r| mask_email(r)).collect();
        info!("Email '{}' sent to {:?}", message.subject, recipients);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: Vec<&str>) -> EmailMessage {
        EmailMessage {
            from: "CRM <noreply@example.com>".to_string(),
            to: to.into_iter().map(String::from).collect(),
            subject: "Reminder".to_string(),
            html_body: "<p>Hello</p>".to_string(),
            text_body: "Hello".to_string(),
        }
    }

    #[test]
    fn test_build_message_with_both_bodies() {
        let email = build_message(&message(vec!["ana@example.com", "boss@example.com"])).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("ana@example.com"));
        assert!(raw.contains("boss@example.com"));
        assert!(raw.contains("Subject: Reminder"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let result = build_message(&message(vec!["not an address"]));
        assert!(matches!(result, Err(DomainError::NotificationError(_))));
    }

    #[test]
    fn test_build_message_requires_recipient() {
        let result = build_message(&message(vec![]));
        assert!(matches!(result, Err(DomainError::NotificationError(_))));
    }

    #[tokio::test]
    async fn test_plain_transport_without_credentials() {
        let settings = SmtpSettings {
            host: "localhost".to_string(),
            port: 1025,
            username: None,
            password: None,
            starttls: false,
        };
        assert!(SmtpEmailSender::new(&settings).is_ok());
    }
}
