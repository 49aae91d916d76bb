//! Credential port interfaces
//!
//! The retrieval layer never caches a credential: every outbound call asks
//! the provider again, so a rotated or cleared token is seen on the next call.

use async_trait::async_trait;
use larkexport_domain::Result;

/// Supplies the bearer token for each outbound call
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current access token, or [`ExportError::MissingCredential`] when none
    /// is stored.
    ///
    /// [`ExportError::MissingCredential`]: larkexport_domain::ExportError::MissingCredential
    async fn access_token(&self) -> Result<String>;
}

/// Clears stored credential state
pub trait CredentialInvalidator: Send + Sync {
    /// Clear the credential. When `critical` is true the implementation also
    /// notifies its upstream observer that the session must re-authenticate.
    fn invalidate(&self, critical: bool);
}
