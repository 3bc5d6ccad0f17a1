use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ClinicError, Result};

/// Roles that can appear in a token.
///
/// Clients always carry `cliente`; staff carry their job title, which must be
/// one of the staff variants below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "cliente")]
    Client,
    #[serde(rename = "Administrador")]
    Administrator,
    #[serde(rename = "Recepcionista")]
    Receptionist,
    #[serde(rename = "Veterinario")]
    Veterinarian,
}

/// Every staff job title
pub const STAFF: &[Role] = &[Role::Administrator, Role::Receptionist, Role::Veterinarian];

/// Any authenticated caller
pub const ANY: &[Role] = &[
    Role::Client,
    Role::Administrator,
    Role::Receptionist,
    Role::Veterinarian,
];

/// Staff allowed to record clinical outcomes
pub const CLINICAL: &[Role] = &[Role::Administrator, Role::Veterinarian];

/// Staff allowed to see clinic-wide reports
pub const FRONT_DESK: &[Role] = &[Role::Administrator, Role::Receptionist];

/// Staff allowed to create staff accounts
pub const ADMIN_ONLY: &[Role] = &[Role::Administrator];

impl Role {
    /// Wire form, as stored in the `role` claim
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "cliente",
            Role::Administrator => "Administrador",
            Role::Receptionist => "Recepcionista",
            Role::Veterinarian => "Veterinario",
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Client)
    }

    /// Parse a staff job title. `cliente` is not a job title.
    pub fn from_job_title(title: &str) -> Result<Role> {
        let title = title.trim();
        STAFF
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(title))
            .ok_or_else(|| {
                ClinicError::ValidationError(format!(
                    "Puesto desconocido '{}'. Valores permitidos: Administrador, Recepcionista, Veterinario",
                    title
                ))
            })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self> {
        if s == Role::Client.as_str() {
            Ok(Role::Client)
        } else {
            Role::from_job_title(s)
        }
    }
}
