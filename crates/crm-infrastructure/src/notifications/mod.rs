//! Outbound notification adapters

pub mod smtp;
pub mod twilio;

pub use smtp::SmtpEmailSender;
pub use twilio::TwilioWhatsAppSender;
