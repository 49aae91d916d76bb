//! Bearer credential held by the session

use std::fmt;

use crate::constants::CREDENTIAL_EXPIRY_BUFFER_MS;

/// API access token with an optional client-side expiry hint
///
/// The hint is advisory; the server remains the authority on validity.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at_ms: Option<i64>,
}

impl Credential {
    /// Wrap a token with an optional expiry hint.
    pub fn new(token: impl Into<String>, expires_at_ms: Option<i64>) -> Self {
        Self { token: token.into(), expires_at_ms }
    }

    /// The raw token value.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether `now_ms` is within the safety buffer of the expiry hint.
    pub fn expiry_hint_reached(&self, now_ms: i64) -> bool {
        self.expires_at_ms
            .is_some_and(|expires| now_ms.saturating_add(CREDENTIAL_EXPIRY_BUFFER_MS) >= expires)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}
