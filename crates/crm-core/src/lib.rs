//! # CRM Core
//! 
//! Domain entities, role-scoped access rules, repository and notifier traits,
//! and the services built on them.

pub mod domain;
pub mod access;
pub mod repositories;
pub mod notifications;
pub mod services;
pub mod error;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export domain entities
pub use domain::*;
pub use access::{AccessScope, Principal};
pub use error::DomainError;
