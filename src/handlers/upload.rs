//! Pet image upload into object storage

use futures_util::TryStreamExt;
use serde_json::{json, Value};
use warp::multipart::{FormData, Part};
use warp::{Buf, Filter, Rejection, Reply};

use crate::auth::role::ANY;
use crate::auth::Claims;
use crate::constants::MAX_UPLOAD_BYTES;
use crate::error::{ClinicError, Result};
use crate::handlers::filters::{reject, with_role, with_state};
use crate::models::UploadResponse;
use crate::state::AppState;
use crate::storage::{Record, Table};

const FILE_FIELD: &str = "file";
const MAX_FILENAME_LEN: usize = 128;
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

struct UploadedFile {
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("upload" / "mascota-image" / i64)
        .and(warp::post())
        .and(with_role(state.clone(), ANY))
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_state(state))
        .and_then(upload_pet_image)
}

/// Reduce a client-supplied filename to a single safe path segment
fn sanitize_filename(raw: Option<&str>) -> String {
    let base = raw
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(MAX_FILENAME_LEN)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        cleaned.to_string()
    }
}

async fn read_part(part: Part) -> Result<Vec<u8>> {
    let mut stream = Box::pin(part.stream());
    let mut data = Vec::new();
    while let Some(mut chunk) = stream
        .try_next()
        .await
        .map_err(|e| ClinicError::ValidationError(format!("Archivo ilegible: {}", e)))?
    {
        while chunk.has_remaining() {
            let bytes = chunk.chunk();
            let len = bytes.len();
            data.extend_from_slice(bytes);
            chunk.advance(len);
        }
    }
    Ok(data)
}

async fn read_file_field(form: FormData) -> Result<UploadedFile> {
    let mut parts = Box::pin(form);
    while let Some(part) = parts
        .try_next()
        .await
        .map_err(|e| ClinicError::ValidationError(format!("Formulario inválido: {}", e)))?
    {
        if part.name() != FILE_FIELD {
            continue;
        }
        let filename = sanitize_filename(part.filename());
        let content_type = part.content_type().unwrap_or(DEFAULT_CONTENT_TYPE).to_string();
        let data = read_part(part).await?;
        if data.is_empty() {
            return Err(ClinicError::ValidationError("El archivo está vacío".to_string()));
        }
        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }
    Err(ClinicError::ValidationError(format!(
        "Falta el campo '{}'",
        FILE_FIELD
    )))
}

async fn store_pet_image(state: &AppState, pet_id: i64, form: FormData) -> Result<String> {
    let pet_key = json!(pet_id);
    if state.store.select_eq(Table::Mascotas, "id", &pet_key).await?.is_empty() {
        return Err(ClinicError::NotFound("Mascota".to_string()));
    }

    let file = read_file_field(form).await?;
    let path = format!("mascotas/{}/{}", pet_id, file.filename);
    state
        .objects
        .upload(&state.image_bucket, &path, file.data, &file.content_type)
        .await?;

    let image_url = state.objects.public_url(&state.image_bucket, &path);
    let mut patch = Record::new();
    patch.insert("image_url".to_string(), Value::String(image_url.clone()));
    state
        .store
        .update_eq(Table::Mascotas, patch, "id", &pet_key)
        .await?;
    Ok(image_url)
}

async fn upload_pet_image(
    pet_id: i64,
    claims: Claims,
    form: FormData,
    state: AppState,
) -> std::result::Result<impl Reply, Rejection> {
    let image_url = store_pet_image(&state, pet_id, form)
        .await
        .map_err(reject)?;
    log::info!("Image for pet {} uploaded by {}", pet_id, claims.identity.sub);
    Ok(warp::reply::json(&UploadResponse {
        message: "Imagen subida correctamente".to_string(),
        image_url,
    }))
}
