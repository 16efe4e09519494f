//! Application services

pub mod auth_service;
pub mod user_service;
pub mod customer_service;
pub mod contact_service;
pub mod gift_service;
pub mod dashboard_service;
pub mod export_service;
pub mod onboarding_service;
pub mod import_service;

pub use auth_service::{AuthService, LoginResult, SignupInput, UserInfo};
pub use user_service::UserService;
pub use customer_service::{CustomerDetail, CustomerService};
pub use contact_service::{ContactGroup, ContactService};
pub use gift_service::{AssignmentUpdate, GiftPlan, GiftService};
pub use dashboard_service::{DashboardService, ManagerDashboard};
pub use export_service::ExportService;
pub use onboarding_service::{OnboardingService, OnboardingSettings, WelcomeFailure, WelcomeReport};
pub use import_service::{ImportFailure, ImportReport, ImportService};
