//! In-memory credential store
//!
//! Holds the session's bearer token and implements both credential ports.
//! Persistent or encrypted storage is left to the embedding application,
//! which can seed this store at startup.

use async_trait::async_trait;
use chrono::Utc;
use larkexport_core::{CredentialInvalidator, CredentialProvider};
use larkexport_domain::constants::CREDENTIAL_TTL_HINT_MS;
use larkexport_domain::{Credential, ExportError, Result};
use parking_lot::RwLock;
use tracing::{info, warn};

/// Observer notified when the session must re-authenticate
pub type CriticalFailureCallback = Box<dyn Fn() + Send + Sync>;

/// Session credential with an optional single critical-failure observer
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credential: RwLock<Option<Credential>>,
    on_critical_failure: Option<CriticalFailureCallback>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that calls `callback` on every critical invalidation.
    pub fn with_critical_failure_callback(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self { credential: RwLock::new(None), on_critical_failure: Some(Box::new(callback)) }
    }

    /// Store `token` (trimmed) with an advisory 24 hour expiry hint.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` for a blank token; the previous
    /// credential is kept.
    pub fn set_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            warn!("Refusing to store a blank API token");
            return Err(ExportError::MissingCredential);
        }

        let expires_at = Utc::now().timestamp_millis().saturating_add(CREDENTIAL_TTL_HINT_MS);
        *self.credential.write() = Some(Credential::new(token, Some(expires_at)));
        info!("API token stored");
        Ok(())
    }

    pub fn has_credential(&self) -> bool {
        self.credential.read().is_some()
    }

    /// Whether the advisory expiry is within the safety buffer, or no
    /// credential is stored at all. Never consulted by the retrieval layer;
    /// the server decides validity.
    pub fn expiry_hint_reached(&self) -> bool {
        let now = Utc::now().timestamp_millis();
        self.credential.read().as_ref().map_or(true, |credential| credential.expiry_hint_reached(now))
    }
}

#[async_trait]
impl CredentialProvider for InMemoryCredentialStore {
    async fn access_token(&self) -> Result<String> {
        self.credential
            .read()
            .as_ref()
            .map(|credential| credential.token().to_string())
            .ok_or(ExportError::MissingCredential)
    }
}

impl CredentialInvalidator for InMemoryCredentialStore {
    fn invalidate(&self, critical: bool) {
        let had_credential = self.credential.write().take().is_some();
        info!(critical, had_credential, "Credential cleared");

        if critical {
            if let Some(callback) = &self.on_critical_failure {
                warn!("Critical authentication failure; notifying observer");
                callback();
            }
        }
    }
}
