//! # larkexport Core
//!
//! Retrieval and export logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for credentials and page sources
//! - The chat and message paginators, driven through the shared
//!   rate-limited queue
//! - Per-chat export orchestration
//! - Pure presentation helpers over chat and message records
//!
//! ## Architecture Principles
//! - Only depends on `larkexport-common` and `larkexport-domain`
//! - No HTTP or storage code
//! - All external dependencies via traits

pub mod auth;
pub mod export;
pub mod presentation;
pub mod retrieval;

pub use auth::ports::{CredentialInvalidator, CredentialProvider};
pub use export::{ChatExport, ExportService};
pub use retrieval::ports::{ChatPageSource, MessagePageSource, MessageQuery};
pub use retrieval::{run_queued, ChatPaginator, MessagePaginator, ProgressTracker};
