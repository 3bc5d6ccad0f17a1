//! Shared request-handling state
//!
//! Every collaborator is built once at startup and handed to the routes;
//! nothing is reached through a global.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::token::{token_pair, Clock, SystemClock};
use crate::auth::{AuthService, PasswordHasher, TokenVerifier};
use crate::config::{ServerConfig, StorageBackend};
use crate::error::Result;
use crate::security_logger::SecurityLogger;
use crate::storage::{
    MemoryObjectStore, MemoryTableStore, ObjectStore, RestObjectStore, RestTableStore, TableStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub auth: Arc<AuthService>,
    pub verifier: Arc<TokenVerifier>,
    pub security: Arc<SecurityLogger>,
    pub image_bucket: String,
}

impl AppState {
    /// Wire the state from explicit collaborators
    pub fn new(
        store: Arc<dyn TableStore>,
        objects: Arc<dyn ObjectStore>,
        jwt_secret: &str,
        token_ttl: Duration,
        clock: Arc<dyn Clock>,
        image_bucket: impl Into<String>,
    ) -> Result<Self> {
        let security = Arc::new(SecurityLogger::new());
        let (issuer, verifier) = token_pair(jwt_secret, token_ttl, clock);
        let auth = AuthService::new(store.clone(), PasswordHasher::new(), issuer, security.clone())?;

        Ok(Self {
            store,
            objects,
            auth: Arc::new(auth),
            verifier: Arc::new(verifier),
            security,
            image_bucket: image_bucket.into(),
        })
    }

    /// Build the storage backends named by the configuration
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let (store, objects): (Arc<dyn TableStore>, Arc<dyn ObjectStore>) = match &config.storage {
            StorageBackend::Rest { url, api_key } => {
                log::info!("Using REST storage backend at {}", url);
                (
                    Arc::new(RestTableStore::new(url, api_key)?),
                    Arc::new(RestObjectStore::new(url, api_key)?),
                )
            }
            StorageBackend::Memory => {
                log::warn!("Using in-memory storage backend; data will not survive a restart");
                let base = format!("http://{}:{}", config.host, config.port);
                (
                    Arc::new(MemoryTableStore::new()),
                    Arc::new(MemoryObjectStore::new(base)),
                )
            }
        };

        Self::new(
            store,
            objects,
            &config.jwt_secret,
            config.token_ttl,
            Arc::new(SystemClock),
            config.image_bucket.clone(),
        )
    }
}
