//! Chat (conversation) records returned by the chat list endpoint

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chat the exporting bot/tenant can read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    /// Unix timestamp in milliseconds, string-encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// `group` or `p2p`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    /// `standard` or `topic`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chat {
    /// Minimal chat carrying only its identifier.
    pub fn with_id(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            name: None,
            avatar: None,
            description: None,
            owner_id: None,
            owner_id_type: None,
            external: None,
            tenant_key: None,
            create_time: None,
            chat_type: None,
            chat_mode: None,
            member_count: None,
            extra: Map::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.chat_type.as_deref() == Some("group")
    }

    pub fn is_p2p(&self) -> bool {
        self.chat_type.as_deref() == Some("p2p")
    }

    /// Creation time in epoch milliseconds, if present and numeric.
    pub fn create_time_ms(&self) -> Option<i64> {
        self.create_time.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}
