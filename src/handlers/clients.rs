//! Client accounts: staff listing and open registration

use warp::{Filter, Rejection, Reply};

use crate::auth::identity::without_password;
use crate::auth::role::STAFF;
use crate::auth::Claims;
use crate::handlers::filters::{json_body, reject, with_role, with_state};
use crate::models::{DataResponse, MessageResponse, NewClient};
use crate::state::AppState;
use crate::storage::Table;

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("clientes")
        .and(warp::get())
        .and(with_role(state.clone(), STAFF))
        .and(with_state(state.clone()))
        .and_then(list_clients);

    let register = warp::path!("clientes")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state))
        .and_then(register_client);

    list.or(register)
}

async fn list_clients(_claims: Claims, state: AppState) -> Result<impl Reply, Rejection> {
    let rows = state.store.select_all(Table::Clientes).await.map_err(reject)?;
    let data = rows.into_iter().map(without_password).collect();
    Ok(warp::reply::json(&DataResponse { data }))
}

async fn register_client(body: NewClient, state: AppState) -> Result<impl Reply, Rejection> {
    let rows = state.auth.register_client(body).await.map_err(reject)?;
    Ok(warp::reply::json(&MessageResponse::with_data("Cliente creado", rows)))
}
