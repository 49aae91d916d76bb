//! Observability infrastructure
//!
//! Structured logging via `tracing`; see [`init_tracing`].

pub mod logging;

pub use logging::init_tracing;
