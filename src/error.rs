use std::error::Error;
use std::fmt;

use warp::http::StatusCode;

/// Message returned for every failed login, whatever the cause.
pub const LOGIN_FAILED_MESSAGE: &str = "Correo o contraseña incorrectos";

/// Message returned for every rejected bearer token.
pub const TOKEN_REJECTED_MESSAGE: &str = "Token inválido o expirado";

#[derive(Debug)]
pub enum ClinicError {
    // Credential errors
    InvalidInput(String),
    MalformedHash(String),
    InvalidCredentials,

    // Token errors
    ExpiredToken,
    InvalidToken(String),

    // Access errors
    Unauthorized,
    Forbidden,

    // Data errors
    NotFound(String),
    ValidationError(String),

    // Collaborator errors
    StorageError(String),

    // System errors
    SystemError(String),

    // Configuration errors
    ConfigError(String),
}

impl fmt::Display for ClinicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::MalformedHash(msg) => write!(f, "Malformed password hash: {}", msg),
            Self::InvalidCredentials => write!(f, "Invalid credentials"),
            Self::ExpiredToken => write!(f, "Token expired"),
            Self::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized access"),
            Self::Forbidden => write!(f, "Forbidden: insufficient permissions"),
            Self::NotFound(what) => write!(f, "Not found: {}", what),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for ClinicError {}

impl warp::reject::Reject for ClinicError {}

impl ClinicError {
    /// HTTP status the error maps to at the routing boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::ValidationError(_) | Self::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            Self::ExpiredToken | Self::InvalidToken(_) | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MalformedHash(_)
            | Self::StorageError(_)
            | Self::SystemError(_)
            | Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Token failures collapse into one message and server-side failures are
    /// opaque, so neither leaks why a request was refused.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidCredentials => LOGIN_FAILED_MESSAGE.to_string(),
            Self::ExpiredToken | Self::InvalidToken(_) | Self::Unauthorized => {
                TOKEN_REJECTED_MESSAGE.to_string()
            }
            Self::Forbidden => "No tiene permisos para realizar esta acción".to_string(),
            Self::NotFound(what) => format!("{} no encontrado", what),
            Self::InvalidInput(msg) | Self::ValidationError(msg) => msg.clone(),
            Self::MalformedHash(_)
            | Self::StorageError(_)
            | Self::SystemError(_)
            | Self::ConfigError(_) => "Error interno del servidor".to_string(),
        }
    }
}

// Blocking hash work runs on tokio's blocking pool
impl From<tokio::task::JoinError> for ClinicError {
    fn from(err: tokio::task::JoinError) -> Self {
        ClinicError::SystemError(format!("Blocking task failed: {}", err))
    }
}

impl From<reqwest::Error> for ClinicError {
    fn from(err: reqwest::Error) -> Self {
        ClinicError::StorageError(err.to_string())
    }
}

// Generic result type for the clinic backend
pub type Result<T> = std::result::Result<T, ClinicError>;
