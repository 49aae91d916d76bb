//! Pure helpers turning chat and message records into display text
//!
//! Used by exporters and pickers; nothing here performs I/O.

pub mod chat;
pub mod message;

pub use chat::{chat_description, chat_display_name, filter_chats, sort_chats};
pub use message::{
    group_by_date, has_attachment, message_text, sender_display_name, sender_id,
};
