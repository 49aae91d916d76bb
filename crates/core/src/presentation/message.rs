//! Message text extraction, sender naming and grouping

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use larkexport_domain::{Mention, Message, Sender};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

const ATTACHMENT_TYPES: [&str; 5] = ["image", "file", "audio", "video", "media"];

lazy_static! {
    /// `<at user_id="..">@name</at>` and the `open_id` form
    static ref MENTION_TAG: Regex = Regex::new(r#"<at (?:user_id|open_id)="[^"]+">@([^<]+)</at>"#)
        .expect("MENTION_TAG should compile - this is a bug");
}

/// Readable text for a message, with placeholders for non-text content.
pub fn message_text(message: &Message) -> String {
    let kind = message.kind();
    match kind {
        "image" => return "[Image]".to_string(),
        "audio" => return "[Audio]".to_string(),
        "video" => return "[Video]".to_string(),
        "sticker" => return "[Sticker]".to_string(),
        "interactive" => return "[Interactive Message Card]".to_string(),
        "text" | "file" | "post" | "share_chat" | "share_user" | "system" => {}
        other => return format!("[{other} message]"),
    }

    let content = match serde_json::from_str::<Value>(message.content.as_deref().unwrap_or_default()) {
        Ok(content) => content,
        Err(err) => {
            warn!(message_id = %message.message_id, kind, error = %err, "Unparseable message content");
            return format!("[Error parsing {kind} content]");
        }
    };
    let field = |name: &str| content.get(name).and_then(Value::as_str);

    match kind {
        "text" => MENTION_TAG.replace_all(field("text").unwrap_or_default(), "@$1").trim().to_string(),
        "file" => {
            let name = field("file_name").unwrap_or("Unknown File");
            let size = content
                .get("file_size")
                .and_then(|size| size.as_f64().or_else(|| size.as_str()?.parse().ok()))
                .map_or_else(|| "N/A".to_string(), |bytes| format!("{:.2}MB", bytes / (1024.0 * 1024.0)));
            format!("[File: {name}] (Size: {size})")
        }
        "post" => {
            let title = content
                .pointer("/pc/title")
                .and_then(Value::as_str)
                .or_else(|| field("title"))
                .filter(|title| !title.is_empty())
                .unwrap_or("Rich Text Post");
            format!("[Post: {title}]")
        }
        "share_chat" => format!("[Shared Chat: {}]", field("chat_name").unwrap_or("Unknown Chat")),
        "share_user" => format!("[Shared User: {}]", field("user_name").unwrap_or("Unknown User")),
        _ => {
            let text = field("text").or_else(|| field("template")).unwrap_or("Notification");
            format!("[System: {text}]")
        }
    }
}

/// Sender identifier: the bare `id`, else user id, open id, union id.
pub fn sender_id(message: &Message) -> Option<&str> {
    message.sender.as_ref().and_then(Sender::preferred_id)
}

/// Best available sender name without a user directory lookup.
///
/// Bots are `Bot`; otherwise a mention of the sender supplies the name,
/// then a truncated id, then `Unknown User`.
pub fn sender_display_name(message: &Message) -> String {
    if message.sender.as_ref().is_some_and(Sender::is_bot) {
        return "Bot".to_string();
    }

    let Some(id) = sender_id(message) else {
        return "Unknown User".to_string();
    };

    let mentioned = message
        .mentions
        .iter()
        .flatten()
        .filter(|mention| mention.refers_to(id))
        .find_map(Mention::display_name);
    if let Some(name) = mentioned {
        return name.to_string();
    }

    let prefix: String = id.chars().take(6).collect();
    format!("User ({prefix}...)")
}

/// Whether the message carries a file, image or other media.
pub fn has_attachment(message: &Message) -> bool {
    ATTACHMENT_TYPES.contains(&message.kind())
}

/// Messages keyed by UTC calendar date of creation, in date order.
///
/// Messages without a valid creation time are left out.
pub fn group_by_date(messages: &[Message]) -> BTreeMap<NaiveDate, Vec<Message>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Message>> = BTreeMap::new();
    for message in messages {
        match message.create_time_ms().and_then(DateTime::<Utc>::from_timestamp_millis) {
            Some(created) => grouped.entry(created.date_naive()).or_default().push(message.clone()),
            None => debug!(message_id = %message.message_id, "Skipping message without valid create_time"),
        }
    }
    grouped
}
