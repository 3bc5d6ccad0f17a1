//! Vaccine catalogue and pet vaccinations

use serde_json::{json, Value};
use warp::{Filter, Rejection, Reply};

use crate::auth::role::{ANY, CLINICAL};
use crate::auth::Claims;
use crate::error::ClinicError;
use crate::handlers::filters::{reject, with_role, with_state};
use crate::models::{DataResponse, MessageResponse, VaccineLink};
use crate::state::AppState;
use crate::storage::{Record, Table};

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let by_pet = warp::path!("vacunas" / "mascotas" / i64)
        .and(warp::get())
        .and(with_role(state.clone(), ANY))
        .and(with_state(state.clone()))
        .and_then(vaccines_for_pet);

    let by_id = warp::path!("vacunas" / i64)
        .and(warp::get())
        .and(with_role(state.clone(), ANY))
        .and(with_state(state.clone()))
        .and_then(vaccine_by_id);

    let link = warp::path!("vacunas" / "asociar")
        .and(warp::post())
        .and(with_role(state.clone(), CLINICAL))
        .and(warp::query::<VaccineLink>())
        .and(with_state(state))
        .and_then(link_vaccine);

    by_pet.or(by_id).or(link)
}

async fn vaccine_by_id(id: i64, _claims: Claims, state: AppState) -> Result<impl Reply, Rejection> {
    let data = state
        .store
        .select_eq(Table::Vacunas, "id", &json!(id))
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&DataResponse { data }))
}

async fn vaccines_for_pet(pet_id: i64, _claims: Claims, state: AppState) -> Result<impl Reply, Rejection> {
    let data = state
        .store
        .select_eq(Table::VacunasMascotas, "mascota", &json!(pet_id))
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&DataResponse { data }))
}

async fn link_vaccine(claims: Claims, link: VaccineLink, state: AppState) -> Result<impl Reply, Rejection> {
    if link.mascota_id <= 0 || link.vacuna_id <= 0 {
        return Err(reject(ClinicError::ValidationError(
            "mascota_id y vacuna_id deben ser positivos".to_string(),
        )));
    }

    let mut record = Record::new();
    record.insert("mascota".to_string(), Value::from(link.mascota_id));
    record.insert("vacuna".to_string(), Value::from(link.vacuna_id));

    let rows = state
        .store
        .insert(Table::VacunasMascotas, record)
        .await
        .map_err(reject)?;
    if rows.is_empty() {
        return Err(reject(ClinicError::StorageError(
            "Vaccine link insert returned no rows".to_string(),
        )));
    }
    log::info!(
        "Vaccine {} linked to pet {} by {}",
        link.vacuna_id,
        link.mascota_id,
        claims.identity.sub
    );
    Ok(warp::reply::json(&MessageResponse::with_data(
        "Mascota y vacuna asociadas correctamente",
        rows,
    )))
}
