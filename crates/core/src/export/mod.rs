//! Per-chat export orchestration

mod service;

pub use service::{ChatExport, ChatProgressCallback, ExportService};
