//! Conversions from external infrastructure errors into domain errors.

use larkexport_domain::ExportError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ExportError);

impl From<InfraError> for ExportError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ExportError> for InfraError {
    fn from(value: ExportError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoExportError {
    fn into_export(self) -> ExportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ExportError */
/* -------------------------------------------------------------------------- */

impl IntoExportError for HttpError {
    fn into_export(self) -> ExportError {
        if self.is_timeout() {
            return ExportError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return ExportError::Network("HTTP connection failure".into());
        }

        // Credential failures are classified by the API transport, which
        // also invalidates; a status seen here is reported as-is.
        if let Some(status) = self.status() {
            return ExportError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown status").into(),
            };
        }

        if self.is_builder() {
            return ExportError::RequestSetup(self.to_string());
        }

        if self.is_decode() || self.is_body() {
            return ExportError::InvalidResponse(self.to_string());
        }

        if self.is_request() {
            return ExportError::Network(self.to_string());
        }

        ExportError::RequestSetup(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_export())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ExportError */
/* -------------------------------------------------------------------------- */

impl IntoExportError for serde_json::Error {
    fn into_export(self) -> ExportError {
        ExportError::InvalidResponse(format!("malformed JSON payload: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_export())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
