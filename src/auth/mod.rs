//! Authentication and authorization module

pub mod gate;
pub mod identity;
pub mod password;
pub mod role;
pub mod service;
pub mod token;

// Re-export main components
pub use gate::{authorize, gate, require, AccessDecision};
pub use identity::{Identity, IdentityResolver, LoginHint};
pub use password::PasswordHasher;
pub use role::Role;
pub use service::AuthService;
pub use token::{extract_bearer_token, ClaimSet, Claims, Clock, ManualClock, SystemClock, TokenIssuer, TokenVerifier};
