use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::role::Role;
use crate::error::{ClinicError, Result};

/// Upper bound on an encoded token accepted for verification
pub const MAX_TOKEN_LEN: usize = 4096;

/// The only signing algorithm issued or accepted
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Source of the current time as a UNIX timestamp in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Identity claims embedded in a token, before expiry is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Subject (email)
    pub sub: String,
    pub role: Role,
    /// Display name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Numeric id of the client or staff row
    pub client_id: i64,
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: ClaimSet,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
}

impl Claims {
    /// Check expiry against the given time; the token is valid through `exp` itself
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }
}

/// Mints signed bearer tokens
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    header: Header,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(secret: &str, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            header: Header::new(SIGNING_ALGORITHM),
            default_ttl,
            clock,
        }
    }

    /// Sign `claims` with `exp = now + ttl`
    pub fn issue(&self, claims: &ClaimSet, ttl: Duration) -> Result<String> {
        if ttl.is_zero() {
            return Err(ClinicError::InvalidInput(
                "Token lifetime must be positive".to_string(),
            ));
        }
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| ClinicError::InvalidInput("Token lifetime too large".to_string()))?;

        let now = self.clock.now();
        let payload = Claims {
            identity: claims.clone(),
            iat: now,
            exp: now.saturating_add(ttl_secs.max(1)),
        };

        encode(&self.header, &payload, &self.encoding_key)
            .map_err(|e| ClinicError::SystemError(format!("Failed to generate token: {}", e)))
    }

    /// Sign `claims` with the configured lifetime
    pub fn issue_default(&self, claims: &ClaimSet) -> Result<String> {
        self.issue(claims, self.default_ttl)
    }
}

/// Validates bearer tokens
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        // Only HS256 passes; `none` has no variant and cannot even be parsed.
        // Expiry is checked against `clock` instead of the library's wall clock.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        }
    }

    /// Check signature, algorithm and expiry, returning the claims unmodified
    pub fn verify(&self, token: &str) -> Result<Claims> {
        if token.is_empty() || token.len() > MAX_TOKEN_LEN {
            return Err(ClinicError::InvalidToken("Token length out of range".to_string()));
        }
        if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(ClinicError::InvalidToken(
                "Token contains invalid characters".to_string(),
            ));
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ClinicError::ExpiredToken,
                _ => ClinicError::InvalidToken(e.to_string()),
            }
        })?;

        if data.claims.is_expired_at(self.clock.now()) {
            return Err(ClinicError::ExpiredToken);
        }

        Ok(data.claims)
    }

    /// Verify the token carried by a raw `Authorization` header value
    pub fn verify_header(&self, raw_header: Option<&str>) -> Result<Claims> {
        let header = raw_header.ok_or(ClinicError::Unauthorized)?;
        let token = extract_bearer_token(header).ok_or(ClinicError::Unauthorized)?;
        self.verify(token)
    }
}

/// Build an issuer and verifier sharing one secret and clock
pub fn token_pair(
    secret: &str,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
) -> (TokenIssuer, TokenVerifier) {
    (
        TokenIssuer::new(secret, default_ttl, clock.clone()),
        TokenVerifier::new(secret, clock),
    )
}

/// Extracts bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        None
    } else {
        Some(token)
    }
}
