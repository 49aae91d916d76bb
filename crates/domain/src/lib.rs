//! # larkexport Domain
//!
//! Business domain types for the chat history exporter.
//!
//! This crate contains:
//! - Chat, message and pagination records
//! - The retrieval error taxonomy and `Result` alias
//! - Configuration structures
//! - Wire-level constants of the Lark/Feishu open API
//!
//! ## Architecture
//! - No dependencies on other larkexport crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
