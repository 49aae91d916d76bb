//! Error types used throughout the retrieval layer

use std::time::Duration;

use thiserror::Error;

/// Main error type for larkexport
///
/// Every variant is produced once, at the transport boundary (or at input
/// validation); paginators and the queue pass it through unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("API token is missing; provide a valid token")]
    MissingCredential,

    #[error("Authentication failed ({0}); check your API token")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded ({detail})")]
    RateLimited { detail: String, retry_after: Option<Duration> },

    #[error("API error: {message} (code {code})")]
    Api { code: i64, message: String },

    #[error("HTTP error: {status} {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request setup failed: {0}")]
    RequestSetup(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse grouping of [`ExportError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential missing or rejected - the session must re-authenticate
    Authentication,
    /// Server-side throttling
    RateLimit,
    /// Structured API failure or HTTP error status
    Api,
    /// Network, request construction or response decoding
    Transport,
    /// Caller-requested cancellation
    Cancelled,
    /// Invalid input or configuration
    Input,
    /// Bugs and dropped tasks
    Internal,
}

impl ExportError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential | Self::AuthenticationFailed(_) => {
                ErrorCategory::Authentication
            }
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Api { .. } | Self::Http { .. } => ErrorCategory::Api,
            Self::Network(_) | Self::RequestSetup(_) | Self::InvalidResponse(_) => {
                ErrorCategory::Transport
            }
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::InvalidInput(_) | Self::Config(_) => ErrorCategory::Input,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether this failure forces a return to re-authentication.
    pub fn is_auth_failure(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::RateLimited { .. } => "rate_limited",
            Self::Api { .. } => "api_error",
            Self::Http { .. } => "http_error",
            Self::Cancelled => "cancelled",
            Self::Network(_) => "network",
            Self::RequestSetup(_) => "request_setup",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for larkexport operations
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_identified() {
        assert!(ExportError::MissingCredential.is_auth_failure());
        assert!(ExportError::AuthenticationFailed("Code: 99991663".into()).is_auth_failure());
        assert!(!ExportError::RateLimited { detail: "HTTP 429".into(), retry_after: None }
            .is_auth_failure());
        assert!(!ExportError::Network("timeout".into()).is_auth_failure());
    }

    #[test]
    fn categories_group_variants() {
        assert_eq!(
            ExportError::Http { status: 500, status_text: "Internal Server Error".into() }
                .category(),
            ErrorCategory::Api
        );
        assert_eq!(ExportError::RequestSetup("bad url".into()).category(), ErrorCategory::Transport);
        assert_eq!(ExportError::Cancelled.category(), ErrorCategory::Cancelled);
        assert_eq!(ExportError::InvalidInput("range".into()).category(), ErrorCategory::Input);
    }

    #[test]
    fn messages_carry_codes() {
        let err = ExportError::Api { code: 230_002, message: "bot not in chat".into() };
        assert_eq!(err.to_string(), "API error: bot not in chat (code 230002)");
        assert_eq!(err.label(), "api_error");

        let auth = ExportError::AuthenticationFailed("Code: 99991664".into());
        assert!(auth.to_string().contains("99991664"));
    }
}
