//! Scripted page sources for paginator and export tests

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use larkexport_domain::{Chat, ExportError, Message, Page, Result};
use parking_lot::Mutex;

use super::ports::{ChatPageSource, MessagePageSource, MessageQuery};

pub(crate) fn chat(id: &str) -> Chat {
    Chat::with_id(id)
}

pub(crate) fn message(id: &str, create_time_ms: i64) -> Message {
    Message::new(id, create_time_ms)
}

fn exhausted() -> ExportError {
    ExportError::Internal("script exhausted".into())
}

/// Returns scripted chat pages in order and records requested tokens
pub(crate) struct ScriptedChats {
    pages: Mutex<VecDeque<Result<Page<Chat>>>>,
    tokens: Mutex<Vec<Option<String>>>,
}

impl ScriptedChats {
    pub(crate) fn new(pages: Vec<Result<Page<Chat>>>) -> Self {
        Self { pages: Mutex::new(pages.into()), tokens: Mutex::new(Vec::new()) }
    }

    pub(crate) fn reload(&self, pages: Vec<Result<Page<Chat>>>) {
        *self.pages.lock() = pages.into();
    }

    pub(crate) fn requested_tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().clone()
    }
}

#[async_trait]
impl ChatPageSource for ScriptedChats {
    async fn fetch_chat_page(
        &self,
        _page_size: u32,
        page_token: Option<String>,
    ) -> Result<Page<Chat>> {
        self.tokens.lock().push(page_token);
        self.pages.lock().pop_front().unwrap_or_else(|| Err(exhausted()))
    }
}

/// Returns scripted message pages, per chat or shared, and records calls
pub(crate) struct ScriptedMessages {
    pages: Mutex<VecDeque<Result<Page<Message>>>>,
    per_chat: Mutex<HashMap<String, VecDeque<Result<Page<Message>>>>>,
    calls: Mutex<Vec<(MessageQuery, Option<String>)>>,
}

impl ScriptedMessages {
    pub(crate) fn new(pages: Vec<Result<Page<Message>>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            per_chat: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the pages served for `chat_id` only.
    pub(crate) fn with_chat(self, chat_id: &str, pages: Vec<Result<Page<Message>>>) -> Self {
        self.per_chat.lock().insert(chat_id.to_string(), pages.into());
        self
    }

    pub(crate) fn calls(&self) -> Vec<(MessageQuery, Option<String>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl MessagePageSource for ScriptedMessages {
    async fn fetch_message_page(
        &self,
        query: &MessageQuery,
        page_token: Option<String>,
    ) -> Result<Page<Message>> {
        self.calls.lock().push((query.clone(), page_token));
        let scripted = match self.per_chat.lock().get_mut(&query.chat_id) {
            Some(pages) => pages.pop_front(),
            None => self.pages.lock().pop_front(),
        };
        scripted.unwrap_or_else(|| Err(exhausted()))
    }
}
