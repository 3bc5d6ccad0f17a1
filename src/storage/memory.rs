//! In-memory storage implementation for development and testing
//!
//! Keeps every table and object in process memory. Rows get an
//! auto-incremented `id` per table when inserted without one.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::*;
use crate::error::Result;

#[derive(Default)]
struct TableData {
    rows: Vec<Record>,
    next_id: i64,
}

impl TableData {
    fn assign_id(&mut self, record: &mut Record) {
        match record.get("id").and_then(Value::as_i64) {
            Some(id) => self.next_id = self.next_id.max(id),
            None => {
                self.next_id += 1;
                record.insert("id".to_string(), Value::from(self.next_id));
            }
        }
    }
}

/// In-memory table storage
#[derive(Clone, Default)]
pub struct MemoryTableStore {
    tables: Arc<RwLock<HashMap<Table, TableData>>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, bypassing nothing but the trait
    pub async fn seed(&self, table: Table, rows: Vec<Record>) {
        let mut tables = self.tables.write().await;
        let data = tables.entry(table).or_default();
        for mut row in rows {
            data.assign_id(&mut row);
            data.rows.push(row);
        }
    }

    pub async fn row_count(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map_or(0, |data| data.rows.len())
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn select_all(&self, table: Table) -> Result<Vec<Record>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|data| data.rows.clone())
            .unwrap_or_default())
    }

    async fn is_empty(&self, table: Table) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.get(&table).map_or(true, |data| data.rows.is_empty()))
    }

    async fn select_eq(&self, table: Table, column: &str, value: &Value) -> Result<Vec<Record>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|data| {
                data.rows
                    .iter()
                    .filter(|row| row.get(column).map_or(false, |v| values_match(v, value)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: Table, mut record: Record) -> Result<Vec<Record>> {
        let mut tables = self.tables.write().await;
        let data = tables.entry(table).or_default();
        data.assign_id(&mut record);
        data.rows.push(record.clone());
        log::debug!("Inserted row into {}", table);
        Ok(vec![record])
    }

    async fn update_eq(
        &self,
        table: Table,
        patch: Record,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>> {
        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();

        if let Some(data) = tables.get_mut(&table) {
            for row in data.rows.iter_mut() {
                if row.get(column).map_or(false, |v| values_match(v, value)) {
                    for (key, val) in &patch {
                        row.insert(key.clone(), val.clone());
                    }
                    updated.push(row.clone());
                }
            }
        }

        Ok(updated)
    }

    async fn delete_eq(&self, table: Table, column: &str, value: &Value) -> Result<Vec<Record>> {
        let mut tables = self.tables.write().await;
        let mut deleted = Vec::new();

        if let Some(data) = tables.get_mut(&table) {
            let (gone, kept): (Vec<Record>, Vec<Record>) = data
                .rows
                .drain(..)
                .partition(|row| row.get(column).map_or(false, |v| values_match(v, value)));
            data.rows = kept;
            deleted = gone;
        }

        Ok(deleted)
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// In-memory object storage
#[derive(Clone)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: Arc<RwLock<HashMap<(String, String), StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Stored bytes and content type of an object
    pub async fn get_object(&self, bucket: &str, path: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), path.to_string()))
            .map(|obj| (obj.data.clone(), obj.content_type.clone()))
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("http://localhost")
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, bucket: &str, path: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let object = StoredObject {
            data,
            content_type: content_type.to_string(),
        };
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), path.to_string()), object);
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_incrementing_ids() {
        let store = MemoryTableStore::new();
        let first = store.insert(Table::Mascotas, row(json!({"nombre_mascota": "Toby"}))).await.unwrap();
        let second = store.insert(Table::Mascotas, row(json!({"nombre_mascota": "Luna"}))).await.unwrap();
        assert_eq!(first[0]["id"], json!(1));
        assert_eq!(second[0]["id"], json!(2));

        // Ids are per table
        let other = store.insert(Table::Citas, row(json!({"id_mascota": 1}))).await.unwrap();
        assert_eq!(other[0]["id"], json!(1));
    }

    #[tokio::test]
    async fn test_is_empty_tracks_rows() {
        let store = MemoryTableStore::new();
        assert!(store.is_empty(Table::Funcionario).await.unwrap());
        store.insert(Table::Funcionario, row(json!({"correo": "a@x.com"}))).await.unwrap();
        assert!(!store.is_empty(Table::Funcionario).await.unwrap());
        assert!(store.is_empty(Table::Clientes).await.unwrap());
    }

    #[tokio::test]
    async fn test_seeded_ids_are_respected() {
        let store = MemoryTableStore::new();
        store.seed(Table::Vacunas, vec![row(json!({"id": 10, "nombre": "Rabia"}))]).await;
        let inserted = store.insert(Table::Vacunas, row(json!({"nombre": "Moquillo"}))).await.unwrap();
        assert_eq!(inserted[0]["id"], json!(11));
    }

    #[tokio::test]
    async fn test_update_and_delete_by_filter() {
        let store = MemoryTableStore::new();
        store
            .seed(
                Table::Citas,
                vec![
                    row(json!({"id_mascota": 1, "hora_cita": "10:00"})),
                    row(json!({"id_mascota": 2, "hora_cita": "11:00"})),
                ],
            )
            .await;

        let updated = store
            .update_eq(Table::Citas, row(json!({"hora_cita": "12:00"})), "id_mascota", &json!(2))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["hora_cita"], json!("12:00"));

        let deleted = store.delete_eq(Table::Citas, "id", &json!(1)).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(store.row_count(Table::Citas).await, 1);

        let none = store.delete_eq(Table::Citas, "id", &json!(99)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_object_store_public_url() {
        let store = MemoryObjectStore::new("https://demo.example/");
        store.upload("images", "mascotas/1/a.png", vec![1, 2, 3], "image/png").await.unwrap();
        assert_eq!(
            store.public_url("images", "mascotas/1/a.png"),
            "https://demo.example/storage/v1/object/public/images/mascotas/1/a.png"
        );
        let (data, content_type) = store.get_object("images", "mascotas/1/a.png").await.unwrap();
        assert_eq!(data, vec![1, 2, 3]);
        assert_eq!(content_type, "image/png");
    }
}
