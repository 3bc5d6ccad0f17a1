//! Appointments and their completion into the visit history

use serde_json::{json, Value};
use warp::{Filter, Rejection, Reply};

use crate::auth::role::{ANY, CLINICAL, STAFF};
use crate::auth::Claims;
use crate::error::ClinicError;
use crate::handlers::filters::{json_body, reject, with_role, with_state};
use crate::models::{CompleteAppointment, DataResponse, MessageResponse, NewAppointment, Validate};
use crate::state::AppState;
use crate::storage::traits::to_record;
use crate::storage::{Record, Table, TableStore};

pub const COMPLETED_MESSAGE: &str = "Cita completada y movida al historial exitosamente";

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("citas")
        .and(warp::get())
        .and(with_role(state.clone(), STAFF))
        .and(with_state(state.clone()))
        .and_then(list_appointments);

    let by_pet = warp::path!("citas" / i64)
        .and(warp::get())
        .and(with_role(state.clone(), ANY))
        .and(with_state(state.clone()))
        .and_then(appointments_for_pet);

    // Looks up by appointment id despite the path name
    let by_id = warp::path!("citas" / i64 / "fecha")
        .and(warp::get())
        .and(with_role(state.clone(), ANY))
        .and(with_state(state.clone()))
        .and_then(appointment_by_id);

    let by_vet = warp::path!("citas" / "veterinario" / i64)
        .and(warp::get())
        .and(with_role(state.clone(), STAFF))
        .and(with_state(state.clone()))
        .and_then(history_for_vet);

    let create = warp::path!("citas")
        .and(warp::post())
        .and(with_role(state.clone(), ANY))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(create_appointment);

    let complete = warp::path!("citas" / i64 / "completar")
        .and(warp::post())
        .and(with_role(state.clone(), CLINICAL))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(complete);

    let cancel = warp::path!("citas" / i64 / "cancelar")
        .and(warp::delete())
        .and(with_role(state.clone(), ANY))
        .and(with_state(state))
        .and_then(cancel_appointment);

    list.or(by_vet)
        .or(by_pet)
        .or(by_id)
        .or(create)
        .or(complete)
        .or(cancel)
}

/// Copy a booked appointment into `Historial` with its outcome, then remove it
/// from `Citas`
pub(crate) async fn complete_appointment(
    store: &dyn TableStore,
    id: i64,
    outcome: CompleteAppointment,
) -> crate::error::Result<()> {
    outcome.validate()?;

    let appointment = store
        .select_eq(Table::Citas, "id", &json!(id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ClinicError::NotFound("Cita".to_string()))?;

    let field = |name: &str| appointment.get(name).cloned().unwrap_or(Value::Null);
    let mut entry = Record::new();
    entry.insert("id_mascota".to_string(), field("id_mascota"));
    entry.insert("fecha".to_string(), field("fecha_cita"));
    entry.insert("tipo".to_string(), Value::String(outcome.tipo));
    entry.insert("descripcion".to_string(), Value::String(outcome.motivo));
    entry.insert("veterinario_id".to_string(), field("id_veterinario"));
    entry.insert("resultado".to_string(), Value::String(outcome.resultado));

    if store.insert(Table::Historial, entry).await?.is_empty() {
        return Err(ClinicError::StorageError(format!(
            "History insert for appointment {} returned no rows",
            id
        )));
    }
    if store.delete_eq(Table::Citas, "id", &json!(id)).await?.is_empty() {
        return Err(ClinicError::StorageError(format!(
            "Appointment {} was not removed after completion",
            id
        )));
    }
    Ok(())
}

async fn select(
    state: &AppState,
    table: Table,
    column: &str,
    id: i64,
) -> Result<impl Reply, Rejection> {
    let data = state
        .store
        .select_eq(table, column, &json!(id))
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&DataResponse { data }))
}

async fn list_appointments(_claims: Claims, state: AppState) -> Result<impl Reply, Rejection> {
    let data = state.store.select_all(Table::Citas).await.map_err(reject)?;
    Ok(warp::reply::json(&DataResponse { data }))
}

async fn appointments_for_pet(
    pet_id: i64,
    _claims: Claims,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    select(&state, Table::Citas, "id_mascota", pet_id).await
}

async fn appointment_by_id(
    id: i64,
    _claims: Claims,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    select(&state, Table::Citas, "id", id).await
}

async fn history_for_vet(
    vet_id: i64,
    _claims: Claims,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    select(&state, Table::Historial, "veterinario_id", vet_id).await
}

async fn create_appointment(
    claims: Claims,
    body: NewAppointment,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    body.validate().map_err(reject)?;
    let record = to_record(&body).map_err(reject)?;
    let rows = state.store.insert(Table::Citas, record).await.map_err(reject)?;
    log::info!("Appointment for pet {} booked by {}", body.id_mascota, claims.identity.sub);
    Ok(warp::reply::json(&MessageResponse::with_data("Cita creada", rows)))
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

async fn cancel_appointment(
    id: i64,
    claims: Claims,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let rows = state
        .store
        .delete_eq(Table::Citas, "id", &json!(id))
        .await
        .map_err(reject)?;
    if rows.is_empty() {
        return Err(reject(ClinicError::NotFound("Cita".to_string())));
    }
    log::info!("Appointment {} cancelled by {}", id, claims.identity.sub);
    Ok(warp::reply::json(&MessageResponse::with_data("Cita cancelada exitosamente", rows)))
}
