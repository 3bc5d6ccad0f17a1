//! Vet Clinic - backend for a veterinary clinic
//!
//! Password hashing, bearer tokens and a per-request role gate, in front of
//! REST routes over a remote table store and an object store.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod models;
pub mod reporting;
pub mod security;
pub mod security_logger;
pub mod state;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
pub use error::{ClinicError, Result};
pub use handlers::routes;
pub use state::AppState;
