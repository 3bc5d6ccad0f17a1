//! Pet records

use serde_json::json;
use warp::{Filter, Rejection, Reply};

use crate::auth::role::ANY;
use crate::auth::Claims;
use crate::error::ClinicError;
use crate::handlers::filters::{json_body, reject, with_role, with_state};
use crate::models::{DataResponse, MessageResponse, PetRequest, Validate};
use crate::state::AppState;
use crate::storage::traits::to_record;
use crate::storage::Table;

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("mascotas")
        .and(warp::get())
        .and(with_role(state.clone(), ANY))
        .and(with_state(state.clone()))
        .and_then(list_pets);

    let create = warp::path!("mascotas")
        .and(warp::post())
        .and(with_role(state.clone(), ANY))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(create_pet);

    let update = warp::path!("mascotas" / i64 / "editar")
        .and(warp::put())
        .and(with_role(state.clone(), ANY))
        .and(json_body())
        .and(with_state(state))
        .and_then(update_pet);

    list.or(create).or(update)
}

async fn list_pets(_claims: Claims, state: AppState) -> Result<impl Reply, Rejection> {
    let data = state.store.select_all(Table::Mascotas).await.map_err(reject)?;
    Ok(warp::reply::json(&DataResponse { data }))
}

async fn create_pet(claims: Claims, body: PetRequest, state: AppState) -> Result<impl Reply, Rejection> {
    body.validate().map_err(reject)?;
    let record = to_record(&body).map_err(reject)?;
    let rows = state.store.insert(Table::Mascotas, record).await.map_err(reject)?;
    log::info!("Pet '{}' registered by {}", body.nombre_mascota, claims.identity.sub);
    Ok(warp::reply::json(&MessageResponse::with_data("Mascota creada", rows)))
}

async fn update_pet(
    id: i64,
    claims: Claims,
    body: PetRequest,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    body.validate().map_err(reject)?;
    let patch = to_record(&body).map_err(reject)?;
    let rows = state
        .store
        .update_eq(Table::Mascotas, patch, "id", &json!(id))
        .await
        .map_err(reject)?;
    if rows.is_empty() {
        return Err(reject(ClinicError::NotFound("Mascota".to_string())));
    }
    log::info!("Pet {} updated by {}", id, claims.identity.sub);
    Ok(warp::reply::json(&MessageResponse::with_data("Mascota actualizada", rows)))
}
