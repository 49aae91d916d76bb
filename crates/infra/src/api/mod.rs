//! Open platform API access
//!
//! [`ApiTransport`] performs and classifies single calls; [`ApiService`]
//! routes every call through one rate-limited queue.

pub mod service;
pub mod transport;

pub use service::{ApiService, ApiServiceBuilder};
pub use transport::ApiTransport;
