//! # CRM Infrastructure
//! 
//! PostgreSQL repositories, SQL migrations and outbound notification adapters.

pub mod bootstrap;
pub mod database;
pub mod notifications;

pub use bootstrap::Adapters;

pub use database::{
    repositories,
    create_pool, run_migrations, PgContactRepository, PgCustomerRepository, PgDispatchLedger,
    PgGiftRepository, PgPasswordTokenRepository, PgReportRepository, PgSalespersonRepository,
    PgUserRepository,
};
pub use notifications::{SmtpEmailSender, TwilioWhatsAppSender};
