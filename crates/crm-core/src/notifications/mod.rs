//! # Notifications
//!
//! Outbound message ports, their templates and the birthday dispatcher.

pub mod sender;
pub mod templates;
pub mod birthday;

pub use sender::{EmailMessage, EmailSender, WhatsAppSender, WhatsAppTemplate, WhatsAppTemplateMessage};
pub use templates::{BirthdayEmailContext, NotificationTemplates, RenderedEmail, WelcomeEmailContext};
pub use birthday::{BirthdayDispatcher, BirthdaySettings, DispatchFailure, DispatchReport};
