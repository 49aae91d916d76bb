//! Message records returned by the message list endpoint

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier triple used for senders and mentions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub union_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id: Option<String>,
}

impl UserIds {
    /// Preferred identifier: user id, then open id, then union id.
    pub fn preferred(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .or(self.open_id.as_deref())
            .or(self.union_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Whether any of the identifiers equals `id`.
    pub fn matches(&self, id: &str) -> bool {
        [&self.user_id, &self.open_id, &self.union_id]
            .into_iter()
            .any(|candidate| candidate.as_deref() == Some(id))
    }
}

/// Identifier of a mentioned user
///
/// The message list endpoint sends a bare id with a sibling `id_type`;
/// other endpoints send the full identifier triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Ids(UserIds),
}

impl UserRef {
    pub fn preferred(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id.as_str()).filter(|id| !id.is_empty()),
            Self::Ids(ids) => ids.preferred(),
        }
    }

    pub fn matches(&self, id: &str) -> bool {
        match self {
            Self::Id(own) => own == id,
            Self::Ids(ids) => ids.matches(id),
        }
    }
}

/// Author of a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    /// Bare sender id; its kind is named by `id_type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserIds>,
    /// `user` or `app`/`bot`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sender {
    /// Bare id if present, otherwise the preferred entry of `sender_id`.
    pub fn preferred_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.sender_id.as_ref().and_then(UserIds::preferred))
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.sender_type.as_deref(), Some("bot" | "app"))
    }
}

/// User or bot mentioned in a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Mention {
    pub fn refers_to(&self, id: &str) -> bool {
        self.id.as_ref().is_some_and(|own| own.matches(id))
    }

    /// Mentioned name, if non-blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

/// Single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    /// Unix timestamp in milliseconds, string-encoded; the sort key
    #[serde(default)]
    pub create_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    /// e.g. `text`, `image`, `file`, `post`, `interactive`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    /// JSON-encoded payload whose shape depends on `message_type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<Mention>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Sender>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Minimal message carrying only an identifier and creation time.
    pub fn new(message_id: impl Into<String>, create_time_ms: i64) -> Self {
        Self {
            message_id: message_id.into(),
            create_time: create_time_ms.to_string(),
            update_time: None,
            parent_id: None,
            root_id: None,
            chat_id: None,
            chat_type: None,
            message_type: None,
            content: None,
            mentions: None,
            sender: None,
            extra: Map::new(),
        }
    }

    /// Creation time in epoch milliseconds, if numeric.
    pub fn create_time_ms(&self) -> Option<i64> {
        self.create_time.trim().parse().ok()
    }

    /// Message type, `unknown` when absent.
    pub fn kind(&self) -> &str {
        self.message_type.as_deref().unwrap_or("unknown")
    }
}

/// Sort messages by creation time, oldest first.
///
/// The sort is stable; messages without a numeric creation time keep their
/// relative order and move to the end.
pub fn sort_by_create_time(messages: &mut [Message]) {
    messages.sort_by_key(|message| message.create_time_ms().unwrap_or(i64::MAX));
}
