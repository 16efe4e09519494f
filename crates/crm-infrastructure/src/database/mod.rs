//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod postgres;
mod scope;

pub use connection::{create_pool, run_migrations};
pub use postgres::{
    repositories,
    PgContactRepository, PgCustomerRepository, PgDispatchLedger, PgGiftRepository,
    PgPasswordTokenRepository, PgReportRepository, PgSalespersonRepository, PgUserRepository,
};
