// ============================================================================
// CRM Core - Notification Templates
// File: crates/crm-core/src/notifications/templates.rs
// Description: Handlebars rendering for birthday and welcome emails
// ============================================================================

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::DomainError;

const BIRTHDAY_HTML: &str = "birthday_reminder.html";
const BIRTHDAY_TEXT: &str = "birthday_reminder.txt";
const WELCOME_HTML: &str = "welcome.html";
const WELCOME_TEXT: &str = "welcome.txt";

#[derive(Debug, Clone, Serialize)]
pub struct BirthdayEmailContext {
    pub recipient_name: String,
    pub contact_name: String,
    pub customer_name: String,
    pub dashboard_url: String,
    pub whatsapp_link: Option<String>,
    pub mailto_link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WelcomeEmailContext {
    pub full_name: String,
    pub username: String,
    pub set_password_link: String,
    pub expires_in_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Serialize)]
struct Branded<'a, T: Serialize> {
    product_name: &'a str,
    #[serde(flatten)]
    inner: &'a T,
}

pub struct NotificationTemplates {
    registry: Handlebars<'static>,
    product_name: String,
}

impl NotificationTemplates {
    pub fn new(product_name: impl Into<String>) -> Result<Self, DomainError> {
        let mut registry = Handlebars::new();
        for (name, source) in [
            (BIRTHDAY_HTML, include_str!("../../templates/birthday_reminder.html.hbs")),
            (BIRTHDAY_TEXT, include_str!("../../templates/birthday_reminder.txt.hbs")),
            (WELCOME_HTML, include_str!("../../templates/welcome.html.hbs")),
            (WELCOME_TEXT, include_str!("../../templates/welcome.txt.hbs")),
        ] {
            registry
                .register_template_string(name, source)
                .map_err(|e| DomainError::TemplateError(e.to_string()))?;
        }
        Ok(Self {
            registry,
            product_name: product_name.into(),
        })
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    fn render<T: Serialize>(&self, name: &str, ctx: &T) -> Result<String, DomainError> {
        let data = Branded {
            product_name: &self.product_name,
            inner: ctx,
        };
        self.registry
            .render(name, &data)
            .map_err(|e| DomainError::TemplateError(e.to_string()))
    }

    pub fn birthday_reminder(&self, ctx: &BirthdayEmailContext) -> Result<RenderedEmail, DomainError> {
        Ok(RenderedEmail {
            subject: format!("🎉 Reminder: {}'s Birthday Today!", ctx.contact_name),
            html_body: self.render(BIRTHDAY_HTML, ctx)?,
            text_body: self.render(BIRTHDAY_TEXT, ctx)?,
        })
    }

    pub fn welcome(&self, ctx: &WelcomeEmailContext) -> Result<RenderedEmail, DomainError> {
        Ok(RenderedEmail {
            subject: format!("🌟 Welcome to {} - Set Your Password", self.product_name),
            html_body: self.render(WELCOME_HTML, ctx)?,
            text_body: self.render(WELCOME_TEXT, ctx)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birthday_ctx(whatsapp: Option<&str>, mailto: Option<&str>) -> BirthdayEmailContext {
        BirthdayEmailContext {
            recipient_name: "Ana".to_string(),
            contact_name: "Lucia Mendez".to_string(),
            customer_name: "Rose & Co".to_string(),
            dashboard_url: "https://crm.example.com/dashboard".to_string(),
            whatsapp_link: whatsapp.map(String::from),
            mailto_link: mailto.map(String::from),
        }
    }

    #[test]
    fn test_birthday_reminder_with_links() {
        let templates = NotificationTemplates::new("Floral CRM").unwrap();
        let email = templates
            .birthday_reminder(&birthday_ctx(
                Some("https://wa.me/13055550123"),
                Some("mailto:lucia@example.com"),
            ))
            .unwrap();
        assert_eq!(email.subject, "🎉 Reminder: Lucia Mendez's Birthday Today!");
        assert!(email.html_body.contains("https://wa.me/13055550123"));
        assert!(email.html_body.contains("mailto:lucia@example.com"));
        assert!(email.html_body.contains("Rose &amp; Co"));
        assert!(email.text_body.contains("Rose & Co"));
        assert!(email.text_body.contains("Hello Ana"));
    }

    #[test]
    fn test_birthday_reminder_omits_missing_links() {
        let templates = NotificationTemplates::new("Floral CRM").unwrap();
        let email = templates.birthday_reminder(&birthday_ctx(None, None)).unwrap();
        assert!(!email.html_body.contains("wa.me"));
        assert!(!email.html_body.contains("mailto:"));
        assert!(email.html_body.contains("https://crm.example.com/dashboard"));
    }

    #[test]
    fn test_welcome_email() {
        let templates = NotificationTemplates::new("Floral CRM").unwrap();
        let email = templates
            .welcome(&WelcomeEmailContext {
                full_name: "Ana Ruiz".to_string(),
                username: "ana".to_string(),
                set_password_link: "https://crm.example.com/reset/abc123".to_string(),
                expires_in_hours: 72,
            })
            .unwrap();
        assert_eq!(email.subject, "🌟 Welcome to Floral CRM - Set Your Password");
        assert!(email.text_body.contains("https://crm.example.com/reset/abc123"));
        assert!(email.text_body.contains("Your username: ana"));
        assert!(email.html_body.contains("72 hours"));
    }
}
