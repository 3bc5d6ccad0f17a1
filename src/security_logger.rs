//! Security-focused logging module to track authentication and access events

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::role::Role;

/// Types of security events to track
#[derive(Debug, Clone)]
pub enum SecurityEvent {
    // Authentication events
    LoginFailed { email: String, reason: String },
    LoginSucceeded { email: String, role: Role },
    TokenRejected { fingerprint: Option<String>, reason: String },

    // Authorization events
    PermissionDenied { subject: String, role: Role, resource: String },

    // Account events
    StaffBootstrap { email: String },
    StaffCreated { email: String, role: Role, created_by: Option<String> },
}

impl SecurityEvent {
    fn key(&self) -> &'static str {
        match self {
            SecurityEvent::LoginFailed { .. } => "login_failed",
            SecurityEvent::LoginSucceeded { .. } => "login_success",
            SecurityEvent::TokenRejected { .. } => "token_rejected",
            SecurityEvent::PermissionDenied { .. } => "permission_denied",
            SecurityEvent::StaffBootstrap { .. } => "staff_bootstrap",
            SecurityEvent::StaffCreated { .. } => "staff_created",
        }
    }
}

/// Short SHA-256 fingerprint of a token, safe to log
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..16].to_string()
}

/// Security logger counting events and alerting past thresholds
pub struct SecurityLogger {
    event_counts: Arc<RwLock<HashMap<&'static str, usize>>>,
    alert_thresholds: HashMap<&'static str, usize>,
}

impl Default for SecurityLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityLogger {
    /// Create a new security logger
    pub fn new() -> Self {
        let mut alert_thresholds = HashMap::new();
        alert_thresholds.insert("login_failed", 5);
        alert_thresholds.insert("token_rejected", 10);
        alert_thresholds.insert("permission_denied", 20);
        alert_thresholds.insert("staff_bootstrap", 1);

        Self {
            event_counts: Arc::new(RwLock::new(HashMap::new())),
            alert_thresholds,
        }
    }

    /// Log a security event
    pub async fn log_event(&self, event: SecurityEvent) {
        let key = event.key();

        {
            let mut counts = self.event_counts.write().await;
            let count = counts.entry(key).or_insert(0);
            *count += 1;

            if let Some(&threshold) = self.alert_thresholds.get(key) {
                if *count % threshold == 0 {
                    log::error!("SECURITY ALERT: {} events of type '{}' detected", *count, key);
                    log::error!("Sample event: {:?}", event);
                }
            }
        }

        match event {
            SecurityEvent::LoginFailed { email, reason } => {
                log::warn!("SECURITY: Login failed - Email: {}, Reason: {}", email, reason);
            }
            SecurityEvent::LoginSucceeded { email, role } => {
                log::info!("SECURITY: Login success - Email: {}, Role: {}", email, role);
            }
            SecurityEvent::TokenRejected { fingerprint, reason } => {
                log::warn!("SECURITY: Token rejected - Token: {:?}, Reason: {}", fingerprint, reason);
            }
            SecurityEvent::PermissionDenied { subject, role, resource } => {
                log::warn!(
                    "SECURITY: Permission denied - User: {}, Role: {}, Resource: {}",
                    subject, role, resource
                );
            }
            SecurityEvent::StaffBootstrap { email } => {
                log::warn!("SECURITY: First staff account created without a token - Email: {}", email);
            }
            SecurityEvent::StaffCreated { email, role, created_by } => {
                log::info!(
                    "SECURITY: Staff account created - Email: {}, Role: {}, By: {:?}",
                    email, role, created_by
                );
            }
        }
    }

    /// Get event statistics
    pub async fn event_stats(&self) -> HashMap<&'static str, usize> {
        self.event_counts.read().await.clone()
    }
}
