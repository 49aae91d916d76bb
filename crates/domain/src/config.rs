//! Configuration structures
//!
//! Every field has a default, so a partial TOML/JSON document (or none at
//! all) still yields a usable configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_REQUESTS_PER_SECOND,
    DEFAULT_REQUEST_TIMEOUT_SECS, MAX_PAGE_SIZE,
};
use crate::errors::{ExportError, Result};

/// Top-level configuration for the exporter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl ExportConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.logging.validate()
    }
}

/// Remote API access settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the open platform (e.g. "https://open.feishu.cn")
    pub base_url: String,
    /// Fixed per-request timeout
    pub timeout_secs: u64,
    /// Outbound request budget; determines the queue's task spacing
    pub requests_per_second: u32,
    /// Items requested per page
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Minimum spacing between queued request starts (40 rps => 25 ms).
    pub fn min_request_spacing(&self) -> Duration {
        let per_second = u64::from(self.requests_per_second.max(1));
        Duration::from_micros(1_000_000 / per_second)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ExportError::Config("api.base_url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ExportError::Config("api.timeout_secs must be greater than 0".into()));
        }
        if self.requests_per_second == 0 {
            return Err(ExportError::Config(
                "api.requests_per_second must be greater than 0".into(),
            ));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ExportError::Config(format!(
                "api.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl LoggingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.level.trim().is_empty() {
            return Err(ExportError::Config("logging.level must not be empty".into()));
        }
        Ok(())
    }
}
