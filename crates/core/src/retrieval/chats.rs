//! Chat list pagination

use std::sync::Arc;

use larkexport_common::resilience::RateLimitedQueue;
use larkexport_domain::{Chat, Result};
use tracing::{debug, info, instrument};

use super::ports::ChatPageSource;
use super::{run_queued, PageCursor};

/// Retrieves the complete chat list, one queued task per page
pub struct ChatPaginator {
    queue: Arc<RateLimitedQueue>,
    source: Arc<dyn ChatPageSource>,
    page_size: u32,
}

impl ChatPaginator {
    pub fn new(queue: Arc<RateLimitedQueue>, source: Arc<dyn ChatPageSource>, page_size: u32) -> Self {
        Self { queue, source, page_size }
    }

    /// Fetch every chat page until the server reports no more.
    ///
    /// The first failing page aborts the run; chats from earlier pages are
    /// discarded with it.
    #[instrument(skip(self), fields(page_size = self.page_size))]
    pub async fn fetch_all(&self) -> Result<Vec<Chat>> {
        let mut chats = Vec::new();
        let mut cursor = PageCursor::new();

        while cursor.has_more() {
            let source = Arc::clone(&self.source);
            let page_size = self.page_size;
            let token = cursor.token();
            let page = run_queued(&self.queue, move || async move {
                source.fetch_chat_page(page_size, token).await
            })
            .await?;

            cursor.advance(&page, "chats");
            let count = page.items.len();
            chats.extend(page.items);
            debug!(
                page = cursor.pages(),
                items = count,
                total = chats.len(),
                has_more = cursor.has_more(),
                "Fetched chat page"
            );
        }

        info!(total = chats.len(), pages = cursor.pages(), "Chat list retrieved");
        Ok(chats)
    }
}

#[cfg(test)]
mod tests {
    use larkexport_domain::{ExportError, Page};

    use super::*;
    use crate::retrieval::testing::{chat, ScriptedChats};

    fn paginator(source: Arc<ScriptedChats>) -> ChatPaginator {
        let queue = Arc::new(RateLimitedQueue::from_rate(40));
        ChatPaginator::new(queue, source, 50)
    }

    #[tokio::test(start_paused = true)]
    async fn follows_continuation_token() {
        let source = Arc::new(ScriptedChats::new(vec![
            Ok(Page::more(vec![chat("oc_1")], "T1")),
            Ok(Page::last(vec![chat("oc_2")])),
        ]));

        let chats = paginator(Arc::clone(&source)).fetch_all().await.unwrap();

        let ids: Vec<&str> = chats.iter().map(|c| c.chat_id.as_str()).collect();
        assert_eq!(ids, vec!["oc_1", "oc_2"]);
        assert_eq!(source.requested_tokens(), vec![None, Some("T1".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_discards_earlier_pages() {
        let source = Arc::new(ScriptedChats::new(vec![
            Ok(Page::more(vec![chat("oc_1")], "T1")),
            Err(ExportError::Api { code: 1, message: "boom".into() }),
        ]));

        let err = paginator(Arc::clone(&source)).fetch_all().await.unwrap_err();

        assert_eq!(err, ExportError::Api { code: 1, message: "boom".into() });
        assert_eq!(source.requested_tokens().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_runs_are_identical() {
        let script = || {
            vec![Ok(Page::more(vec![chat("oc_1")], "T1")), Ok(Page::last(vec![chat("oc_2")]))]
        };
        let queue = Arc::new(RateLimitedQueue::from_rate(40));
        let source = Arc::new(ScriptedChats::new(script()));
        let paginator = ChatPaginator::new(Arc::clone(&queue), source.clone(), 50);

        let first = paginator.fetch_all().await.unwrap();
        source.reload(script());
        let second = paginator.fetch_all().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(queue.pending(), 0);
    }
}
