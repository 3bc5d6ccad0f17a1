//! Staff accounts

use warp::{Filter, Rejection, Reply};

use crate::auth::identity::without_password;
use crate::auth::role::STAFF;
use crate::auth::Claims;
use crate::handlers::filters::{json_body, optional_claims, reject, with_role, with_state};
use crate::models::{DataResponse, MessageResponse, NewStaff};
use crate::state::AppState;
use crate::storage::Table;

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("funcionarios")
        .and(warp::get())
        .and(with_role(state.clone(), STAFF))
        .and(with_state(state.clone()))
        .and_then(list_staff);

    // Admin check happens in the service: the first account needs no token
    let create = warp::path!("funcionarios")
        .and(warp::post())
        .and(optional_claims(state.clone()))
        .and(json_body())
        .and(with_state(state))
        .and_then(create_staff);

    list.or(create)
}

async fn list_staff(_claims: Claims, state: AppState) -> Result<impl Reply, Rejection> {
    let rows = state.store.select_all(Table::Funcionario).await.map_err(reject)?;
    let data = rows.into_iter().map(without_password).collect();
    Ok(warp::reply::json(&DataResponse { data }))
}

async fn create_staff(
    requester: Option<Claims>,
    body: NewStaff,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let rows = state
        .auth
        .register_staff(body, requester.as_ref())
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&MessageResponse::with_data("Funcionario creado", rows)))
}
