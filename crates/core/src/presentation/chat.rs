//! Chat naming, sorting and filtering

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use larkexport_domain::Chat;
use tracing::debug;

const SEPARATOR: &str = " \u{2022} ";

/// Human-readable chat name.
///
/// Falls back to `Direct Message` for p2p chats and to a truncated chat id
/// for unnamed groups.
pub fn chat_display_name(chat: &Chat) -> String {
    if let Some(name) = chat.name.as_deref().filter(|name| !name.trim().is_empty()) {
        return name.to_string();
    }
    if chat.is_p2p() {
        return "Direct Message".to_string();
    }
    let prefix: String = chat.chat_id.chars().take(8).collect();
    format!("Group Chat ({prefix}...)")
}

/// One-line summary: kind, member count, creation date, description.
pub fn chat_description(chat: &Chat) -> String {
    let mut parts = Vec::new();

    if chat.is_group() {
        parts.push("Group Chat".to_string());
        if let Some(count) = chat.member_count {
            parts.push(format!("{count} members"));
        }
    } else if chat.is_p2p() {
        parts.push("Direct Message".to_string());
    }

    if chat.create_time.is_some() {
        match chat.create_time_ms().and_then(DateTime::<Utc>::from_timestamp_millis) {
            Some(created) => parts.push(format!("Created: {}", created.format("%Y-%m-%d"))),
            None => debug!(chat_id = %chat.chat_id, "Unparseable chat create_time"),
        }
    }

    if let Some(description) = chat.description.as_deref().filter(|d| !d.trim().is_empty()) {
        parts.push(format!("\"{description}\""));
    }

    parts.join(SEPARATOR)
}

/// Groups before direct messages, then by display name ignoring case.
pub fn sort_chats(chats: &[Chat]) -> Vec<Chat> {
    let mut sorted = chats.to_vec();
    sorted.sort_by(|a, b| match (a.is_group(), b.is_group()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => chat_display_name(a).to_lowercase().cmp(&chat_display_name(b).to_lowercase()),
    });
    sorted
}

/// Chats whose display name, description or id contains `query`, ignoring
/// case. A blank query keeps every chat.
pub fn filter_chats(chats: &[Chat], query: &str) -> Vec<Chat> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return chats.to_vec();
    }

    chats
        .iter()
        .filter(|chat| {
            chat_display_name(chat).to_lowercase().contains(&query)
                || chat.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&query))
                || chat.chat_id.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}
