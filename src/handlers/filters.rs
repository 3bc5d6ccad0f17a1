//! Shared warp filters: state injection and the per-request role gate

use serde::de::DeserializeOwned;
use std::convert::Infallible;
use warp::path::FullPath;
use warp::{Filter, Rejection};

use crate::auth::role::Role;
use crate::auth::token::{extract_bearer_token, Claims};
use crate::auth::{gate, AccessDecision};
use crate::constants::JSON_BODY_LIMIT;
use crate::error::ClinicError;
use crate::security_logger::{token_fingerprint, SecurityEvent};
use crate::state::AppState;

pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

pub fn reject(err: ClinicError) -> Rejection {
    warp::reject::custom(err)
}

/// Size-limited JSON request body
pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(JSON_BODY_LIMIT).and(warp::body::json())
}

fn fingerprint_of(header: Option<&str>) -> Option<String> {
    header.and_then(extract_bearer_token).map(token_fingerprint)
}

/// Admit requests whose bearer token carries one of `allowed`
pub fn with_role(
    state: AppState,
    allowed: &'static [Role],
) -> impl Filter<Extract = (Claims,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::path::full())
        .and(with_state(state))
        .and_then(move |header: Option<String>, path: FullPath, state: AppState| async move {
            match gate(header.as_deref(), &state.verifier, allowed) {
                AccessDecision::Allowed(claims) => Ok(claims),
                AccessDecision::Unauthorized(err) => {
                    state
                        .security
                        .log_event(SecurityEvent::TokenRejected {
                            fingerprint: fingerprint_of(header.as_deref()),
                            reason: err.to_string(),
                        })
                        .await;
                    Err(reject(err))
                }
                AccessDecision::Forbidden(claims) => {
                    state
                        .security
                        .log_event(SecurityEvent::PermissionDenied {
                            subject: claims.identity.sub,
                            role: claims.identity.role,
                            resource: path.as_str().to_string(),
                        })
                        .await;
                    Err(reject(ClinicError::Forbidden))
                }
            }
        })
}

/// Claims when a token is presented, `None` when the header is absent.
/// A presented but invalid token is still rejected.
pub fn optional_claims(
    state: AppState,
) -> impl Filter<Extract = (Option<Claims>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(with_state(state))
        .and_then(|header: Option<String>, state: AppState| async move {
            let Some(raw) = header else {
                return Ok(None);
            };
            match state.verifier.verify_header(Some(raw.as_str())) {
                Ok(claims) => Ok(Some(claims)),
                Err(err) => {
                    state
                        .security
                        .log_event(SecurityEvent::TokenRejected {
                            fingerprint: fingerprint_of(Some(raw.as_str())),
                            reason: err.to_string(),
                        })
                        .await;
                    Err(reject(err))
                }
            }
        })
}
