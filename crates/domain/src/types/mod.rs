//! Domain types and models
//!
//! Chat and message records are passed through from the API unmodified: the
//! typed fields cover what the exporter reads, and everything else is kept
//! in a flattened `extra` map.

pub mod chat;
pub mod credential;
pub mod message;
pub mod page;
pub mod window;

pub use chat::Chat;
pub use credential::Credential;
pub use message::{sort_by_create_time, Mention, Message, Sender, UserIds, UserRef};
pub use page::{Page, ProgressEstimate};
pub use window::TimeWindow;
