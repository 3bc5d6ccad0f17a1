//! Login route

use warp::{Filter, Rejection, Reply};

use crate::handlers::filters::{json_body, reject, with_state};
use crate::models::{LoginRequest, LoginResponse};
use crate::state::AppState;

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("auth" / "login")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state))
        .and_then(login)
}

async fn login(body: LoginRequest, state: AppState) -> Result<impl Reply, Rejection> {
    let token = state
        .auth
        .login(&body.correo, &body.password, body.role)
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&LoginResponse::bearer(token)))
}
