//! Identity lookup for login
//!
//! Clients and staff live in disjoint tables. The resolver picks the table
//! from the login hint, finds the row by exact email, and turns it into the
//! claim set that goes into the token.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::auth::role::Role;
use crate::auth::token::ClaimSet;
use crate::constants::{EMAIL_COLUMN, PASSWORD_COLUMN};
use crate::error::{ClinicError, Result};
use crate::storage::{Record, Table, TableStore};

/// Which identity table a login targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginHint {
    Cliente,
    Funcionario,
}

impl LoginHint {
    pub fn table(&self) -> Table {
        match self {
            LoginHint::Cliente => Table::Clientes,
            LoginHint::Funcionario => Table::Funcionario,
        }
    }
}

impl FromStr for LoginHint {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cliente" => Ok(LoginHint::Cliente),
            "funcionario" => Ok(LoginHint::Funcionario),
            other => Err(ClinicError::ValidationError(format!(
                "Rol de inicio de sesión desconocido '{}'",
                other
            ))),
        }
    }
}

/// Row of the `Clientes` table
#[derive(Debug, Clone, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    pub nombre_usuario: String,
    pub correo: String,
    #[serde(rename = "contraseña")]
    pub password_hash: String,
}

/// Row of the `Funcionario` table
#[derive(Debug, Clone, Deserialize)]
pub struct StaffRecord {
    pub id: i64,
    pub nombre: String,
    pub puesto: String,
    pub correo: String,
    #[serde(rename = "contraseña")]
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub enum Identity {
    Client(ClientRecord),
    Staff(StaffRecord),
}

impl Identity {
    pub fn id(&self) -> i64 {
        match self {
            Identity::Client(c) => c.id,
            Identity::Staff(s) => s.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Identity::Client(c) => &c.nombre_usuario,
            Identity::Staff(s) => &s.nombre,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::Client(c) => &c.correo,
            Identity::Staff(s) => &s.correo,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Identity::Client(c) => &c.password_hash,
            Identity::Staff(s) => &s.password_hash,
        }
    }

    /// Role claim: `cliente` for clients, the parsed job title for staff
    pub fn role(&self) -> Result<Role> {
        match self {
            Identity::Client(_) => Ok(Role::Client),
            Identity::Staff(s) => Role::from_job_title(&s.puesto),
        }
    }
}

/// Drop the password column before a row leaves the server
pub fn without_password(mut record: Record) -> Record {
    record.remove(PASSWORD_COLUMN);
    record
}

/// Finds identities in the client and staff tables
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn TableStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Look up the identity for a login. `None` when no row has this email.
    pub async fn resolve_login(&self, email: &str, hint: LoginHint) -> Result<Option<Identity>> {
        let table = hint.table();
        let rows = self
            .store
            .select_eq(table, EMAIL_COLUMN, &Value::String(email.to_string()))
            .await?;

        if rows.len() > 1 {
            log::warn!("{} rows in {} share one email; using the first", rows.len(), table);
        }

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let identity = match hint {
            LoginHint::Cliente => serde_json::from_value::<ClientRecord>(Value::Object(row))
                .map(Identity::Client),
            LoginHint::Funcionario => serde_json::from_value::<StaffRecord>(Value::Object(row))
                .map(Identity::Staff),
        }
        .map_err(|e| ClinicError::StorageError(format!("Unexpected {} row shape: {}", table, e)))?;

        Ok(Some(identity))
    }

    /// Claims for a resolved identity
    pub fn build_claims(identity: &Identity) -> Result<ClaimSet> {
        Ok(ClaimSet {
            sub: identity.email().to_string(),
            role: identity.role()?,
            name: identity.display_name().to_string(),
            client_id: identity.id(),
        })
    }
}
