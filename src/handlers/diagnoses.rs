//! Diagnoses and the per-pet visit history

use serde_json::json;
use warp::{Filter, Rejection, Reply};

use crate::auth::role::{ANY, CLINICAL};
use crate::auth::Claims;
use crate::handlers::appointments::{complete_appointment, COMPLETED_MESSAGE};
use crate::handlers::filters::{json_body, reject, with_role, with_state};
use crate::models::{CompleteAppointment, DataResponse, MessageResponse, NewDiagnosis, Validate};
use crate::state::AppState;
use crate::storage::traits::to_record;
use crate::storage::Table;

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let create = warp::path!("diagnosticos")
        .and(warp::post())
        .and(with_role(state.clone(), CLINICAL))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(create_diagnosis);

    let complete = warp::path!("diagnosticos" / "citas" / i64 / "completar")
        .and(warp::post())
        .and(with_role(state.clone(), CLINICAL))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(complete);

    let history = warp::path!("diagnosticos" / "historial" / i64)
        .and(warp::get())
        .and(with_role(state.clone(), ANY))
        .and(with_state(state))
        .and_then(history_for_pet);

    create.or(complete).or(history)
}

async fn create_diagnosis(
    claims: Claims,
    body: NewDiagnosis,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    body.validate().map_err(reject)?;
    let record = to_record(&body).map_err(reject)?;
    let rows = state
        .store
        .insert(Table::Diagnosticos, record)
        .await
        .map_err(reject)?;
    log::info!("Diagnosis for evaluation {} recorded by {}", body.id_evaluacion, claims.identity.sub);
    Ok(warp::reply::json(&MessageResponse::with_data("Diagnóstico creado", rows)))
}

async fn complete(
    id: i64,
    claims: Claims,
    body: CompleteAppointment,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    complete_appointment(state.store.as_ref(), id, body)
        .await
        .map_err(reject)?;
    log::info!("Appointment {} completed by {}", id, claims.identity.sub);
    Ok(warp::reply::json(&MessageResponse::new(COMPLETED_MESSAGE)))
}

async fn history_for_pet(pet_id: i64, _claims: Claims, state: AppState) -> Result<impl Reply, Rejection> {
    let data = state
        .store
        .select_eq(Table::Historial, "id_mascota", &json!(pet_id))
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&DataResponse { data }))
}
