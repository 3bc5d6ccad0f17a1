//! Login and registration
//!
//! Orchestrates the resolver, hasher and issuer. Every login failure that
//! could reveal whether an account exists leaves this module as the single
//! `InvalidCredentials` error.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::auth::gate::require;
use crate::auth::identity::{without_password, IdentityResolver, LoginHint};
use crate::auth::password::PasswordHasher;
use crate::auth::role::{Role, ADMIN_ONLY};
use crate::auth::token::{ClaimSet, Claims, TokenIssuer};
use crate::constants::{EMAIL_COLUMN, PASSWORD_COLUMN};
use crate::error::{ClinicError, Result};
use crate::models::{NewClient, NewStaff, Validate};
use crate::security_logger::{SecurityEvent, SecurityLogger};
use crate::storage::traits::to_record;
use crate::storage::{Record, Table, TableStore};

// Verified against when the email is unknown, so both failure paths cost one hash check
const TIMING_DUMMY_SECRET: &str = "timing-equaliser";

pub struct AuthService {
    store: Arc<dyn TableStore>,
    resolver: IdentityResolver,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    security: Arc<SecurityLogger>,
    dummy_hash: String,
    // Serialises the check-then-insert steps of registration
    registration: Mutex<()>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn TableStore>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        security: Arc<SecurityLogger>,
    ) -> Result<Self> {
        let dummy_hash = hasher.hash(TIMING_DUMMY_SECRET)?;
        Ok(Self {
            resolver: IdentityResolver::new(store.clone()),
            store,
            hasher,
            issuer,
            security,
            dummy_hash,
            registration: Mutex::new(()),
        })
    }

    /// Authenticate and mint a bearer token
    pub async fn login(&self, email: &str, secret: &str, hint: LoginHint) -> Result<String> {
        match self.authenticate(email, secret, hint).await {
            Ok(claims) => {
                let token = self.issuer.issue_default(&claims)?;
                self.security
                    .log_event(SecurityEvent::LoginSucceeded {
                        email: claims.sub.clone(),
                        role: claims.role,
                    })
                    .await;
                Ok(token)
            }
            Err(err @ (ClinicError::StorageError(_) | ClinicError::SystemError(_))) => Err(err),
            Err(err) => {
                if matches!(err, ClinicError::MalformedHash(_) | ClinicError::ValidationError(_)) {
                    log::error!("Account {} in {} cannot log in: {}", email, hint.table(), err);
                }
                self.security
                    .log_event(SecurityEvent::LoginFailed {
                        email: email.to_string(),
                        reason: err.to_string(),
                    })
                    .await;
                Err(ClinicError::InvalidCredentials)
            }
        }
    }

    /// Resolve the identity and check the secret, reporting the precise cause
    async fn authenticate(&self, email: &str, secret: &str, hint: LoginHint) -> Result<ClaimSet> {
        let identity = match self.resolver.resolve_login(email, hint).await? {
            Some(identity) => identity,
            None => {
                let _ = self
                    .hasher
                    .verify_off_thread(secret.to_string(), self.dummy_hash.clone())
                    .await;
                return Err(ClinicError::NotFound(format!("{} {}", hint.table(), email)));
            }
        };

        let matches = self
            .hasher
            .verify_off_thread(secret.to_string(), identity.password_hash().to_string())
            .await?;
        if !matches {
            return Err(ClinicError::InvalidCredentials);
        }

        IdentityResolver::build_claims(&identity)
    }

    /// Register a client account. Open to anyone.
    pub async fn register_client(&self, client: NewClient) -> Result<Vec<Record>> {
        client.validate()?;

        let password = client.password.clone();
        let mut record = to_record(&client)?;
        let hash = self.hasher.hash_off_thread(password).await?;
        record.insert(PASSWORD_COLUMN.to_string(), Value::String(hash));

        let rows = {
            let _guard = self.registration.lock().await;
            self.ensure_email_free(Table::Clientes, &client.correo).await?;
            self.store.insert(Table::Clientes, record).await?
        };
        log::info!("Client registered: {}", client.correo);
        Ok(rows.into_iter().map(without_password).collect())
    }

    /// Register a staff account.
    ///
    /// Needs an Administrador token, except for the very first account, which
    /// may be created without one and must itself be an Administrador.
    pub async fn register_staff(
        &self,
        staff: NewStaff,
        requester: Option<&Claims>,
    ) -> Result<Vec<Record>> {
        staff.validate()?;
        let role = Role::from_job_title(&staff.puesto)?;

        if let Some(claims) = requester {
            if let Err(err) = require(claims, ADMIN_ONLY) {
                self.security
                    .log_event(SecurityEvent::PermissionDenied {
                        subject: claims.identity.sub.clone(),
                        role: claims.identity.role,
                        resource: "POST /funcionarios".to_string(),
                    })
                    .await;
                return Err(err);
            }
        }

        let password = staff.password.clone();
        let mut record = to_record(&staff)?;
        let hash = self.hasher.hash_off_thread(password).await?;
        record.insert(PASSWORD_COLUMN.to_string(), Value::String(hash));
        record.insert("puesto".to_string(), Value::String(role.as_str().to_string()));

        // Bootstrap check, uniqueness check and insert must not interleave
        let rows = {
            let _guard = self.registration.lock().await;
            if requester.is_none() {
                if !self.store.is_empty(Table::Funcionario).await? {
                    return Err(ClinicError::Unauthorized);
                }
                if role != Role::Administrator {
                    return Err(ClinicError::ValidationError(
                        "La primera cuenta de personal debe ser Administrador".to_string(),
                    ));
                }
            }
            self.ensure_email_free(Table::Funcionario, &staff.correo).await?;
            self.store.insert(Table::Funcionario, record).await?
        };

        if requester.is_none() {
            self.security
                .log_event(SecurityEvent::StaffBootstrap {
                    email: staff.correo.clone(),
                })
                .await;
        }
        self.security
            .log_event(SecurityEvent::StaffCreated {
                email: staff.correo.clone(),
                role,
                created_by: requester.map(|c| c.identity.sub.clone()),
            })
            .await;
        Ok(rows.into_iter().map(without_password).collect())
    }

    async fn ensure_email_free(&self, table: Table, email: &str) -> Result<()> {
        let existing = self
            .store
            .select_eq(table, EMAIL_COLUMN, &Value::String(email.to_string()))
            .await?;
        if existing.is_empty() {
            Ok(())
        } else {
            Err(ClinicError::ValidationError(format!(
                "El correo '{}' ya está registrado",
                email
            )))
        }
    }
}
