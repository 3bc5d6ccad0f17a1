//! REST routes of the clinic API
//!
//! Every route matches its path and method first, then runs the role gate,
//! then reads the body, so an unknown path is a 404 rather than a 401.

pub mod appointments;
pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod diagnoses;
pub mod filters;
pub mod pets;
pub mod rejection;
pub mod staff;
pub mod upload;
pub mod vaccines;

use std::convert::Infallible;
use warp::{Filter, Reply};

use crate::models::MessageResponse;
use crate::security::api_security_headers;
use crate::state::AppState;

pub use rejection::handle_rejection;

/// The complete API, including error recovery and response headers
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let root = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::json(&MessageResponse::new("API funcionando correctamente")));

    let health = warp::path!("health").and(warp::get()).map(|| "OK");

    let api = auth::routes(state.clone())
        .boxed()
        .or(clients::routes(state.clone()).boxed())
        .or(staff::routes(state.clone()).boxed())
        .or(pets::routes(state.clone()).boxed())
        .or(appointments::routes(state.clone()).boxed())
        .or(vaccines::routes(state.clone()).boxed())
        .or(diagnoses::routes(state.clone()).boxed())
        .or(dashboard::routes(state.clone()).boxed())
        .or(upload::routes(state).boxed());

    root.or(health)
        .or(api)
        .recover(handle_rejection)
        .with(warp::reply::with::headers(api_security_headers()))
        .with(warp::log("vet_clinic::http"))
}
