//! Route handlers, grouped by surface.

pub mod auth;
pub mod health;
pub mod import;
pub mod settings;
pub mod webhooks;
