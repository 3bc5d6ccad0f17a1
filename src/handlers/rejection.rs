//! Maps every rejection to a JSON `{"detail": ...}` reply

use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::error::ClinicError;
use crate::models::ErrorBody;

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, detail) = if let Some(e) = err.find::<ClinicError>() {
        if e.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed: {}", e);
        }
        (e.status_code(), e.public_message())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Ruta no encontrada".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Cuerpo de la petición inválido: {}", e))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Parámetros de consulta inválidos".to_string())
    } else if err.find::<warp::reject::InvalidHeader>().is_some() {
        (StatusCode::BAD_REQUEST, "Cabecera inválida".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Se requiere Content-Length".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Cuerpo de la petición demasiado grande".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Tipo de contenido no soportado".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Método no permitido".to_string())
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor".to_string())
    };

    let body = warp::reply::json(&ErrorBody { detail });
    Ok(warp::reply::with_status(body, status))
}
