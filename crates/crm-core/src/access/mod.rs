//! # Role-scoped access
//!
//! Turns an authenticated principal into the set of customers and contacts it
//! may see, and decides whether individual mutations are allowed.

pub mod principal;
pub mod scope;
pub mod policy;

pub use principal::Principal;
pub use scope::AccessScope;
pub use policy::{
    authorize_contact_create, authorize_customer_create, authorize_customer_update,
    require_executive, require_manager,
};
