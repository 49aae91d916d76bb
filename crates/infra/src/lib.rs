//! # larkexport Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest HTTP client and the classifying API transport
//! - The `ApiService` facade owning one rate-limited queue per session
//! - The in-memory credential store
//! - Configuration loading and tracing initialisation
//!
//! ## Architecture
//! - Implements traits defined in `larkexport-core`
//! - Contains all "impure" code (network, environment, files)

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiService, ApiServiceBuilder, ApiTransport};
pub use auth::InMemoryCredentialStore;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
