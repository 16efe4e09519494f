//! HTTP handlers, one module per resource

pub mod health;
pub mod auth;
pub mod dashboard;
pub mod users;
pub mod customers;
pub mod contacts;
pub mod exports;
pub mod gifts;
pub mod admin;
