//! Page source port interfaces
//!
//! A page source performs exactly one list call and classifies its outcome;
//! paginators decide whether to continue.

use async_trait::async_trait;
use larkexport_domain::{Chat, Message, Page, Result, TimeWindow};

/// One page of the chat list
#[async_trait]
pub trait ChatPageSource: Send + Sync {
    /// Fetch the chat page starting at `page_token` (`None` for the first).
    async fn fetch_chat_page(&self, page_size: u32, page_token: Option<String>)
        -> Result<Page<Chat>>;
}

/// Fixed parameters of one message pagination run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    pub chat_id: String,
    pub window: TimeWindow,
    pub page_size: u32,
}

/// One page of a chat's message history
#[async_trait]
pub trait MessagePageSource: Send + Sync {
    /// Fetch the message page for `query` starting at `page_token`.
    ///
    /// Implementations request ascending creation-time order.
    async fn fetch_message_page(
        &self,
        query: &MessageQuery,
        page_token: Option<String>,
    ) -> Result<Page<Message>>;
}
