//! Abstract storage interfaces for pluggable backends
//!
//! The clinic keeps its data in named remote tables and its images in an
//! object store. Both are reached only through these traits, so handlers and
//! the auth core never know which backend is behind them.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{ClinicError, Result};

/// A flat row: column name to scalar value
pub type Record = Map<String, Value>;

/// Tables the clinic reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Clientes,
    Funcionario,
    Mascotas,
    Citas,
    Historial,
    Diagnosticos,
    Vacunas,
    VacunasMascotas,
}

impl Table {
    /// Remote table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Clientes => "Clientes",
            Table::Funcionario => "Funcionario",
            Table::Mascotas => "Mascotas",
            Table::Citas => "Citas",
            Table::Historial => "Historial",
            Table::Diagnosticos => "Diagnosticos",
            Table::Vacunas => "Vacunas",
            Table::VacunasMascotas => "VacunasMascotas",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Remote table accessor
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Every row of a table
    async fn select_all(&self, table: Table) -> Result<Vec<Record>>;

    /// Whether the table holds no rows at all
    async fn is_empty(&self, table: Table) -> Result<bool>;

    /// Rows where `column` equals `value`
    async fn select_eq(&self, table: Table, column: &str, value: &Value) -> Result<Vec<Record>>;

    /// Insert a row, returning the stored row (with its assigned `id`)
    async fn insert(&self, table: Table, record: Record) -> Result<Vec<Record>>;

    /// Apply `patch` to rows where `column` equals `value`, returning them updated
    async fn update_eq(
        &self,
        table: Table,
        patch: Record,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>>;

    /// Delete rows where `column` equals `value`, returning what was deleted
    async fn delete_eq(&self, table: Table, column: &str, value: &Value) -> Result<Vec<Record>>;
}

/// Binary object storage with public URLs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` at `path` inside `bucket`
    async fn upload(&self, bucket: &str, path: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Public URL of an object
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Serialize a request body into a row
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ClinicError::ValidationError(format!(
            "Expected an object, got {}",
            other
        ))),
        Err(e) => Err(ClinicError::ValidationError(e.to_string())),
    }
}

/// Textual form of a scalar, as used in equality filters
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Equality as the remote store applies it: values compare by textual form
pub fn values_match(stored: &Value, wanted: &Value) -> bool {
    stored == wanted || (!stored.is_null() && scalar_to_string(stored) == scalar_to_string(wanted))
}
