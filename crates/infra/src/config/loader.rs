//! Configuration loader
//!
//! Loads exporter configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `LARKEXPORT_API_BASE_URL` is unset, falls back to a config file
//! 3. Probes multiple paths for config files
//! 4. Uses built-in defaults when no file exists
//!
//! ## Environment Variables
//! - `LARKEXPORT_API_BASE_URL`: API base URL (required for env loading)
//! - `LARKEXPORT_API_TIMEOUT_SECS`: Request timeout in seconds
//! - `LARKEXPORT_REQUESTS_PER_SECOND`: Outbound request budget
//! - `LARKEXPORT_PAGE_SIZE`: Items per page (1-50)
//! - `LARKEXPORT_LOG_LEVEL`: Default log filter
//! - `LARKEXPORT_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./larkexport.toml` or `./larkexport.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use larkexport_domain::{ApiConfig, ExportConfig, ExportError, LoggingConfig, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["larkexport.toml", "larkexport.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Environment first, then a probed config file, then defaults.
///
/// # Errors
/// Returns `ExportError::Config` if a discovered source is malformed or
/// fails validation.
pub fn load() -> Result<ExportConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            return Ok(config);
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
        }
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No config file found; using defaults");
            Ok(ExportConfig::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `LARKEXPORT_API_BASE_URL` must be present; every other variable falls
/// back to its default.
///
/// # Errors
/// Returns `ExportError::Config` if the base URL is missing or a value
/// cannot be parsed.
pub fn load_from_env() -> Result<ExportConfig> {
    let defaults = ExportConfig::default();

    let config = ExportConfig {
        api: ApiConfig {
            base_url: env_var("LARKEXPORT_API_BASE_URL")?,
            timeout_secs: env_parse("LARKEXPORT_API_TIMEOUT_SECS", defaults.api.timeout_secs)?,
            requests_per_second: env_parse(
                "LARKEXPORT_REQUESTS_PER_SECOND",
                defaults.api.requests_per_second,
            )?,
            page_size: env_parse("LARKEXPORT_PAGE_SIZE", defaults.api.page_size)?,
        },
        logging: LoggingConfig {
            level: std::env::var("LARKEXPORT_LOG_LEVEL").unwrap_or(defaults.logging.level),
            json: env_bool("LARKEXPORT_LOG_JSON", defaults.logging.json),
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ExportError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ExportConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ExportError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ExportError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ExportError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ExportConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ExportError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ExportError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ExportError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current directory, its parent and grandparent, then the
/// same relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ExportError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ExportError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
