//! Request and response bodies of the REST surface

use serde::{Deserialize, Serialize};

use crate::auth::identity::LoginHint;
use crate::error::{ClinicError, Result};
use crate::storage::Record;

/// Field-level checks run after deserialization
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ClinicError::ValidationError(format!("El campo '{}' es obligatorio", field)))
    } else {
        Ok(())
    }
}

fn require_email(value: &str) -> Result<()> {
    require_non_empty("correo", value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ClinicError::ValidationError(format!("Correo inválido '{}'", value))),
    }
}

fn require_id(field: &str, value: i64) -> Result<()> {
    if value <= 0 {
        Err(ClinicError::ValidationError(format!("El campo '{}' debe ser positivo", field)))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub correo: String,
    #[serde(rename = "contraseña")]
    pub password: String,
    pub role: LoginHint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

impl LoginResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    pub nombre_usuario: String,
    pub correo: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

impl Validate for NewClient {
    fn validate(&self) -> Result<()> {
        require_non_empty("nombre_usuario", &self.nombre_usuario)?;
        require_email(&self.correo)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaff {
    pub nombre: String,
    pub puesto: String,
    pub correo: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

impl Validate for NewStaff {
    fn validate(&self) -> Result<()> {
        require_non_empty("nombre", &self.nombre)?;
        require_non_empty("puesto", &self.puesto)?;
        require_email(&self.correo)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetRequest {
    pub nombre_mascota: String,
    pub especie: String,
    pub raza: String,
    pub fecha_nacimiento: String,
    #[serde(rename = "id_dueño")]
    pub owner_id: i64,
}

impl Validate for PetRequest {
    fn validate(&self) -> Result<()> {
        require_non_empty("nombre_mascota", &self.nombre_mascota)?;
        require_non_empty("especie", &self.especie)?;
        require_non_empty("fecha_nacimiento", &self.fecha_nacimiento)?;
        require_id("id_dueño", self.owner_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub id_mascota: i64,
    pub fecha_cita: String,
    pub id_veterinario: i64,
    pub hora_cita: String,
}

impl Validate for NewAppointment {
    fn validate(&self) -> Result<()> {
        require_id("id_mascota", self.id_mascota)?;
        require_id("id_veterinario", self.id_veterinario)?;
        require_non_empty("fecha_cita", &self.fecha_cita)?;
        require_non_empty("hora_cita", &self.hora_cita)
    }
}

/// Outcome recorded when an appointment is completed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAppointment {
    pub tipo: String,
    pub motivo: String,
    pub resultado: String,
}

impl Validate for CompleteAppointment {
    fn validate(&self) -> Result<()> {
        require_non_empty("tipo", &self.tipo)?;
        require_non_empty("resultado", &self.resultado)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDiagnosis {
    pub id_evaluacion: i64,
    pub diagnostico: String,
    pub tratamiento: String,
}

impl Validate for NewDiagnosis {
    fn validate(&self) -> Result<()> {
        require_id("id_evaluacion", self.id_evaluacion)?;
        require_non_empty("diagnostico", &self.diagnostico)
    }
}

/// Query parameters of the pet/vaccine association route
#[derive(Debug, Clone, Deserialize)]
pub struct VaccineLink {
    pub mascota_id: i64,
    pub vacuna_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub data: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Record>>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: Vec<Record>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
