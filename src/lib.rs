//! Snaptune relay server library.
//!
//! Exposes the modules used by the server binary and by tests: upstream
//! clients, the cooldown rate limiter, response composition, and the HTTP
//! handlers.

pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AppSettings;
pub use error::AppError;
pub use services::rate_limiter::CooldownLimiter;
