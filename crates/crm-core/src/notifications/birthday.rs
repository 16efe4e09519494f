// ============================================================================
// CRM Core - Birthday Reminder Dispatcher
// File: crates/crm-core/src/notifications/birthday.rs
// Description: Daily reminders to salespeople and managers about contact birthdays
// ============================================================================
//! Each reminder is sent independently: one failing recipient never stops the
//! others. Successful sends go into the [`DispatchLedger`] so a re-run for the
//! same date only retries what did not go out.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    BirthdayEmailContext, EmailMessage, EmailSender, NotificationTemplates, WhatsAppSender,
    WhatsAppTemplate, WhatsAppTemplateMessage,
};
use crate::domain::{BirthdayContact, DispatchKey, NotificationChannel};
use crate::error::DomainError;
use crate::repositories::{ContactRepository, DispatchLedger};
use crm_shared::config::{AppConfig, ManagerRecipient};
use crm_shared::constants::NOT_AVAILABLE;
use crm_shared::utils::non_blank;

#[derive(Debug, Clone)]
pub struct BirthdaySettings {
    pub from_address: String,
    pub dashboard_url: String,
    pub managers: Vec<ManagerRecipient>,
}

impl BirthdaySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            from_address: config.notifications.from_address.clone(),
            dashboard_url: config.notifications.dashboard_url.clone(),
            managers: config.notifications.managers.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    pub contact_id: Uuid,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub date: NaiveDate,
    pub contacts_matched: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            contacts_matched: 0,
            sent: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Someone who receives a reminder on one channel.
struct Recipient {
    name: String,
    address: String,
}

pub struct BirthdayDispatcher {
    contacts: Arc<dyn ContactRepository>,
    ledger: Arc<dyn DispatchLedger>,
    email: Arc<dyn EmailSender>,
    whatsapp: Option<Arc<dyn WhatsAppSender>>,
    templates: Arc<NotificationTemplates>,
    settings: BirthdaySettings,
}

impl BirthdayDispatcher {
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        ledger: Arc<dyn DispatchLedger>,
        email: Arc<dyn EmailSender>,
        whatsapp: Option<Arc<dyn WhatsAppSender>>,
        templates: Arc<NotificationTemplates>,
        settings: BirthdaySettings,
    ) -> Self {
        Self {
            contacts,
            ledger,
            email,
            whatsapp,
            templates,
            settings,
        }
    }

    /// Sends every reminder due on `date` over the requested channels.
    ///
    /// Only a failure to load the contacts is returned as an error; send
    /// failures are collected in the report.
    pub async fn run(
        &self,
        date: NaiveDate,
        channels: &[NotificationChannel],
    ) -> Result<DispatchReport, DomainError> {
        let mut report = DispatchReport::new(date);
        let birthdays = self.contacts.find_birthdays(date.month(), date.day()).await?;
        report.contacts_matched = birthdays.len();

        if birthdays.is_empty() {
            info!(%date, "No birthdays today");
            return Ok(report);
        }

        for birthday in &birthdays {
            if channels.contains(&NotificationChannel::Email) {
                for recipient in self.email_recipients(birthday) {
                    self.deliver_email(date, birthday, &recipient, &mut report).await;
                }
            }
            if channels.contains(&NotificationChannel::WhatsApp) {
                match &self.whatsapp {
                    Some(sender) => {
                        for recipient in self.whatsapp_recipients(birthday) {
                            self.deliver_whatsapp(sender.as_ref(), date, birthday, &recipient, &mut report)
                                .await;
                        }
                    }
                    None => warn!("WhatsApp channel requested but not configured"),
                }
            }
        }

        info!(
            %date,
            contacts = report.contacts_matched,
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Birthday reminders dispatched"
        );
        Ok(report)
    }

    fn email_recipients(&self, birthday: &BirthdayContact) -> Vec<Recipient> {
        let salesperson = &birthday.salesperson;
        let owner = salesperson.usable_email().map(|email| Recipient {
            name: salesperson.greeting_name().to_string(),
            address: email.to_string(),
        });
        if owner.is_none() {
            warn!(contact_id = %birthday.contact.id, "Salesperson has no usable email");
        }
        owner
            .into_iter()
            .chain(self.settings.managers.iter().filter_map(|m| {
                non_blank(m.email.as_deref()).map(|email| Recipient {
                    name: m.name.clone(),
                    address: email.to_string(),
                })
            }))
            .collect()
    }

    fn whatsapp_recipients(&self, birthday: &BirthdayContact) -> Vec<Recipient> {
        let salesperson = &birthday.salesperson;
        salesperson
            .usable_phone()
            .map(|phone| Recipient {
                name: salesperson.greeting_name().to_string(),
                address: phone.to_string(),
            })
            .into_iter()
            .chain(self.settings.managers.iter().filter_map(|m| {
                non_blank(m.phone.as_deref()).map(|phone| Recipient {
                    name: m.name.clone(),
                    address: phone.to_string(),
                })
            }))
            .collect()
    }

    /// Ledger lookup. `None` means the lookup failed and the send is abandoned.
    async fn already_sent(&self, key: &DispatchKey, report: &mut DispatchReport) -> Option<bool> {
        match self.ledger.has_sent(key).await {
            Ok(sent) => Some(sent),
            Err(e) => {
                error!(contact_id = %key.contact_id, channel = %key.channel, "Dispatch ledger lookup failed: {}", e);
                report.failures.push(DispatchFailure {
                    contact_id: key.contact_id,
                    channel: key.channel,
                    recipient: key.recipient.clone(),
                    error: e.to_string(),
                });
                None
            }
        }
    }

    async fn settle(&self, key: DispatchKey, outcome: Result<(), DomainError>, report: &mut DispatchReport) {
        match outcome {
            Ok(()) => {
                report.sent += 1;
                if let Err(e) = self.ledger.record(&key).await {
                    warn!(contact_id = %key.contact_id, "Sent but could not record in dispatch ledger: {}", e);
                }
            }
            Err(e) => {
                error!(contact_id = %key.contact_id, channel = %key.channel, "Birthday reminder failed: {}", e);
                report.failures.push(DispatchFailure {
                    contact_id: key.contact_id,
                    channel: key.channel,
                    recipient: key.recipient,
                    error: e.to_string(),
                });
            }
        }
    }

    async fn deliver_email(
        &self,
        date: NaiveDate,
        birthday: &BirthdayContact,
        recipient: &Recipient,
        report: &mut DispatchReport,
    ) {
        let key = DispatchKey::new(birthday.contact.id, date, NotificationChannel::Email, &recipient.address);
        match self.already_sent(&key, report).await {
            Some(true) => {
                report.skipped += 1;
                return;
            }
            Some(false) => {}
            None => return,
        }

        let ctx = BirthdayEmailContext {
            recipient_name: recipient.name.clone(),
            contact_name: birthday.contact.name.clone(),
            customer_name: birthday.customer_name.clone(),
            dashboard_url: self.settings.dashboard_url.clone(),
            whatsapp_link: birthday.contact.whatsapp_link(),
            mailto_link: birthday.contact.mailto_link(),
        };
        let outcome = match self.templates.birthday_reminder(&ctx) {
            Ok(rendered) => {
                let message = EmailMessage {
                    from: self.settings.from_address.clone(),
                    to: vec![recipient.address.clone()],
                    subject: rendered.subject,
                    html_body: rendered.html_body,
                    text_body: rendered.text_body,
                };
                self.email.send(&message).await
            }
            Err(e) => Err(e),
        };
        self.settle(key, outcome, report).await;
    }

    async fn deliver_whatsapp(
        &self,
        sender: &dyn WhatsAppSender,
        date: NaiveDate,
        birthday: &BirthdayContact,
        recipient: &Recipient,
        report: &mut DispatchReport,
    ) {
        let key = DispatchKey::new(birthday.contact.id, date, NotificationChannel::WhatsApp, &recipient.address);
        match self.already_sent(&key, report).await {
            Some(true) => {
                report.skipped += 1;
                return;
            }
            Some(false) => {}
            None => return,
        }

        let contact = &birthday.contact;
        let message = WhatsAppTemplateMessage {
            to: recipient.address.clone(),
            template: WhatsAppTemplate::BirthdayReminder,
            variables: vec![
                recipient.name.clone(),
                contact.name.clone(),
                birthday.customer_name.clone(),
                contact.usable_phone().unwrap_or(NOT_AVAILABLE).to_string(),
                contact.usable_email().unwrap_or(NOT_AVAILABLE).to_string(),
                contact.whatsapp_link().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ],
        };
        let outcome = sender.send_template(&message).await.map(|sid| {
            info!(contact_id = %contact.id, message_sid = %sid, "WhatsApp reminder sent");
        });
        self.settle(key, outcome, report).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::sender::{MockEmailSender, MockWhatsAppSender};
    use crate::testing::{birthday_contact, InMemoryContacts, InMemoryLedger};

    fn june_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn settings(managers: Vec<ManagerRecipient>) -> BirthdaySettings {
        BirthdaySettings {
            from_address: "CRM <noreply@example.com>".to_string(),
            dashboard_url: "https://crm.example.com/dashboard".to_string(),
            managers,
        }
    }

    fn manager(email: Option<&str>, phone: Option<&str>) -> ManagerRecipient {
        ManagerRecipient {
            name: "Manager".to_string(),
            email: email.map(String::from),
            phone: phone.map(String::from),
        }
    }

    fn dispatcher(
        contacts: Vec<BirthdayContact>,
        ledger: Arc<InMemoryLedger>,
        email: MockEmailSender,
        whatsapp: Option<MockWhatsAppSender>,
        managers: Vec<ManagerRecipient>,
    ) -> BirthdayDispatcher {
        BirthdayDispatcher::new(
            Arc::new(InMemoryContacts::with_birthdays(contacts)),
            ledger,
            Arc::new(email),
            whatsapp.map(|w| Arc::new(w) as Arc<dyn WhatsAppSender>),
            Arc::new(NotificationTemplates::new("Floral CRM").unwrap()),
            settings(managers),
        )
    }

    #[tokio::test]
    async fn test_sends_to_salesperson_and_manager() {
        let mut email = MockEmailSender::new();
        email.expect_send().times(2).returning(|_| Ok(()));

        let dispatcher = dispatcher(
            vec![birthday_contact(6, 15, Some("ana@example.com"), None)],
            Arc::new(InMemoryLedger::default()),
            email,
            None,
            vec![manager(Some("boss@example.com"), None)],
        );
        let report = dispatcher.run(june_15(), &[NotificationChannel::Email]).await.unwrap();
        assert_eq!(report.contacts_matched, 1);
        assert_eq!(report.sent, 2);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_other_dates_send_nothing() {
        let mut email = MockEmailSender::new();
        email.expect_send().never();

        let dispatcher = dispatcher(
            vec![birthday_contact(6, 15, Some("ana@example.com"), None)],
            Arc::new(InMemoryLedger::default()),
            email,
            None,
            vec![],
        );
        let june_16 = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let report = dispatcher.run(june_16, &NotificationChannel::ALL).await.unwrap();
        assert_eq!(report.contacts_matched, 0);
        assert_eq!(report.sent, 0);
    }

    #[tokio::test]
    async fn test_salesperson_without_email_still_copies_manager() {
        let mut email = MockEmailSender::new();
        email
            .expect_send()
            .withf(|m| m.to == vec!["boss@example.com".to_string()])
            .times(1)
            .returning(|_| Ok(()));

        let dispatcher = dispatcher(
            vec![birthday_contact(6, 15, None, None)],
            Arc::new(InMemoryLedger::default()),
            email,
            None,
            vec![manager(Some("boss@example.com"), None)],
        );
        let report = dispatcher.run(june_15(), &[NotificationChannel::Email]).await.unwrap();
        assert_eq!(report.sent, 1);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let mut email = MockEmailSender::new();
        email.expect_send().times(4).returning(|m| {
            if m.to[0] == "ana@example.com" {
                Err(DomainError::NotificationError("smtp down".to_string()))
            } else {
                Ok(())
            }
        });

        let dispatcher = dispatcher(
            vec![
                birthday_contact(6, 15, Some("ana@example.com"), None),
                birthday_contact(6, 15, Some("leo@example.com"), None),
            ],
            Arc::new(InMemoryLedger::default()),
            email,
            None,
            vec![manager(Some("boss@example.com"), None)],
        );
        let report = dispatcher.run(june_15(), &[NotificationChannel::Email]).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].recipient, "ana@example.com");
        assert_eq!(report.sent, 3);
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_rerun_same_date_sends_nothing_new() {
        let ledger = Arc::new(InMemoryLedger::default());
        let contact = birthday_contact(6, 15, Some("ana@example.com"), None);

        let mut first = MockEmailSender::new();
        first.expect_send().times(1).returning(|_| Ok(()));
        let run = dispatcher(
            vec![contact.clone()],
            ledger.clone(),
            first,
            None,
            vec![],
        );
        assert_eq!(run.run(june_15(), &[NotificationChannel::Email]).await.unwrap().sent, 1);

        let mut second = MockEmailSender::new();
        second.expect_send().never();
        let rerun = dispatcher(
            vec![contact],
            ledger,
            second,
            None,
            vec![],
        );
        let report = rerun.run(june_15(), &[NotificationChannel::Email]).await.unwrap();
        assert_eq!(report.sent, 0);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_whatsapp_template_variables() {
        let mut email = MockEmailSender::new();
        email.expect_send().never();
        let mut whatsapp = MockWhatsAppSender::new();
        whatsapp
            .expect_send_template()
            .withf(|m| {
                m.template == WhatsAppTemplate::BirthdayReminder
                    && m.variables.len() == 6
                    && m.variables[4] == NOT_AVAILABLE
                    && m.variables[5] == "https://wa.me/13055550199"
            })
            .times(2)
            .returning(|_| Ok("SM123".to_string()));

        let dispatcher = dispatcher(
            vec![birthday_contact(6, 15, Some("ana@example.com"), Some("+13055550100"))],
            Arc::new(InMemoryLedger::default()),
            email,
            Some(whatsapp),
            vec![manager(None, Some("+13055550101"))],
        );
        let report = dispatcher.run(june_15(), &[NotificationChannel::WhatsApp]).await.unwrap();
        assert_eq!(report.sent, 2);
    }
}
