//! Per-request role gate
//!
//! Every request starts without a token, is either authenticated or rejected
//! by the verifier, and is then either allowed or forbidden by role. No state
//! carries over between requests.

use crate::auth::role::Role;
use crate::auth::token::{Claims, TokenVerifier};
use crate::error::{ClinicError, Result};

/// Terminal state of the gate for one request
#[derive(Debug)]
pub enum AccessDecision {
    Allowed(Claims),
    /// Missing, malformed, expired or forged token
    Unauthorized(ClinicError),
    /// Valid token whose role is not permitted
    Forbidden(Claims),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed(_))
    }

}

/// Membership test; an empty allow-list admits nobody
pub fn authorize(claims: &Claims, allowed: &[Role]) -> bool {
    allowed.contains(&claims.identity.role)
}

pub fn require(claims: &Claims, allowed: &[Role]) -> Result<()> {
    if authorize(claims, allowed) {
        Ok(())
    } else {
        Err(ClinicError::Forbidden)
    }
}

/// Run verification then authorization for a raw `Authorization` header
pub fn gate(raw_header: Option<&str>, verifier: &TokenVerifier, allowed: &[Role]) -> AccessDecision {
    match verifier.verify_header(raw_header) {
        Ok(claims) if authorize(&claims, allowed) => AccessDecision::Allowed(claims),
        Ok(claims) => AccessDecision::Forbidden(claims),
        Err(err) => AccessDecision::Unauthorized(err),
    }
}
