//! Repository traits (ports)

pub mod user_repository;
pub mod salesperson_repository;
pub mod customer_repository;
pub mod contact_repository;
pub mod gift_repository;
pub mod password_token_repository;
pub mod dispatch_ledger;
pub mod report_repository;

pub use user_repository::UserRepository;
pub use salesperson_repository::SalespersonRepository;
pub use customer_repository::CustomerRepository;
pub use contact_repository::ContactRepository;
pub use gift_repository::GiftRepository;
pub use password_token_repository::PasswordTokenRepository;
pub use dispatch_ledger::DispatchLedger;
pub use report_repository::ReportRepository;

use std::sync::Arc;

/// The repositories the application services are built from, behind their ports.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub salespeople: Arc<dyn SalespersonRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub gifts: Arc<dyn GiftRepository>,
    pub tokens: Arc<dyn PasswordTokenRepository>,
    pub reports: Arc<dyn ReportRepository>,
}
