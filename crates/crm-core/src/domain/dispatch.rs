//! Notification channels and the dispatch ledger key

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    WhatsApp,
}

impl NotificationChannel {
    pub const ALL: [NotificationChannel; 2] = [NotificationChannel::Email, NotificationChannel::WhatsApp];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Email => "email",
            NotificationChannel::WhatsApp => "whatsapp",
        }
    }
}

impl FromStr for NotificationChannel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(NotificationChannel::Email),
            "whatsapp" => Ok(NotificationChannel::WhatsApp),
            _ => Err(UnknownVariant::new("notification channel", s)),
        }
    }
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one delivered birthday reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchKey {
    pub contact_id: Uuid,
    pub date: NaiveDate,
    pub channel: NotificationChannel,
    pub recipient: String,
}

impl DispatchKey {
    pub fn new(
        contact_id: Uuid,
        date: NaiveDate,
        channel: NotificationChannel,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            contact_id,
            date,
            channel,
            recipient: recipient.into().trim().to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!("WhatsApp".parse::<NotificationChannel>(), Ok(NotificationChannel::WhatsApp));
        assert!("sms".parse::<NotificationChannel>().is_err());
    }

    #[test]
    fn test_key_normalizes_recipient() {
        let id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            DispatchKey::new(id, date, NotificationChannel::Email, " Ana@Example.com"),
            DispatchKey::new(id, date, NotificationChannel::Email, "ana@example.com"),
        );
    }
}
