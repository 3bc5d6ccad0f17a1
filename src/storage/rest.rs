//! HTTP storage backend speaking the hosted store's REST dialect
//!
//! Tables live under `{base}/rest/v1/{table}` with PostgREST filters
//! (`column=eq.value`); objects live under `{base}/storage/v1/object/...`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use super::traits::*;
use crate::error::{ClinicError, Result};

const RETURN_REPRESENTATION: &str = "return=representation";

fn auth_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let key = HeaderValue::from_str(api_key)
        .map_err(|_| ClinicError::ConfigError("Storage API key is not a valid header value".to_string()))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|_| ClinicError::ConfigError("Storage API key is not a valid header value".to_string()))?;
    headers.insert("apikey", key);
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

/// Normalise the base so `join` appends instead of replacing the last segment
fn normalise_base(base: &Url) -> Url {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

/// Read a row list, turning non-success statuses into storage errors
async fn read_rows(context: &str, response: Response) -> Result<Vec<Record>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClinicError::StorageError(format!(
            "{} returned {}: {}",
            context, status, body
        )));
    }
    Ok(response.json::<Vec<Record>>().await?)
}

/// Table storage over HTTP
#[derive(Clone)]
pub struct RestTableStore {
    client: Client,
    base: Url,
}

impl RestTableStore {
    pub fn new(base: &Url, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .default_headers(auth_headers(api_key)?)
            .build()
            .map_err(|e| ClinicError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: normalise_base(base),
        })
    }

    fn table_url(&self, table: Table) -> Result<Url> {
        self.base
            .join(&format!("rest/v1/{}", table.name()))
            .map_err(|e| ClinicError::ConfigError(format!("Invalid table URL: {}", e)))
    }

    fn filtered(&self, builder: RequestBuilder, column: &str, value: &Value) -> RequestBuilder {
        builder.query(&[(column, format!("eq.{}", scalar_to_string(value)))])
    }

    /// At most one row id, enough to tell whether the table has rows
    fn first_row_request(&self, table: Table) -> Result<RequestBuilder> {
        Ok(self
            .client
            .get(self.table_url(table)?)
            .query(&[("select", "id"), ("limit", "1")]))
    }

    async fn send(&self, table: Table, builder: RequestBuilder) -> Result<Vec<Record>> {
        let response = builder.send().await?;
        read_rows(table.name(), response).await
    }
}

#[async_trait]
impl TableStore for RestTableStore {
    async fn select_all(&self, table: Table) -> Result<Vec<Record>> {
        let builder = self
            .client
            .get(self.table_url(table)?)
            .query(&[("select", "*")]);
        self.send(table, builder).await
    }

    async fn is_empty(&self, table: Table) -> Result<bool> {
        let builder = self.first_row_request(table)?;
        Ok(self.send(table, builder).await?.is_empty())
    }

    async fn select_eq(&self, table: Table, column: &str, value: &Value) -> Result<Vec<Record>> {
        let builder = self
            .client
            .get(self.table_url(table)?)
            .query(&[("select", "*")]);
        self.send(table, self.filtered(builder, column, value)).await
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Vec<Record>> {
        let builder = self
            .client
            .post(self.table_url(table)?)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&record);
        self.send(table, builder).await
    }

    async fn update_eq(
        &self,
        table: Table,
        patch: Record,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>> {
        let builder = self
            .client
            .patch(self.table_url(table)?)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        self.send(table, self.filtered(builder, column, value)).await
    }

    async fn delete_eq(&self, table: Table, column: &str, value: &Value) -> Result<Vec<Record>> {
        let builder = self
            .client
            .delete(self.table_url(table)?)
            .header("Prefer", RETURN_REPRESENTATION);
        self.send(table, self.filtered(builder, column, value)).await
    }
}

/// Object storage over HTTP
#[derive(Clone)]
pub struct RestObjectStore {
    client: Client,
    base: Url,
}

impl RestObjectStore {
    pub fn new(base: &Url, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .default_headers(auth_headers(api_key)?)
            .build()
            .map_err(|e| ClinicError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: normalise_base(base),
        })
    }
}

#[async_trait]
impl ObjectStore for RestObjectStore {
    async fn upload(&self, bucket: &str, path: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let url = self
            .base
            .join(&format!("storage/v1/object/{}/{}", bucket, path))
            .map_err(|e| ClinicError::StorageError(format!("Invalid object path: {}", e)))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClinicError::StorageError(format!(
                "Upload to {}/{} returned {}: {}",
                bucket, path, status, body
            )));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}storage/v1/object/public/{}/{}", self.base, bucket, path)
    }
}
