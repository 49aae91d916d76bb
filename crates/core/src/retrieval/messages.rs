//! Message history pagination with progress reporting

use std::sync::Arc;

use larkexport_common::resilience::RateLimitedQueue;
use larkexport_domain::{sort_by_create_time, Message, ProgressEstimate, Result, TimeWindow};
use tracing::{debug, info, instrument};

use super::ports::{MessagePageSource, MessageQuery};
use super::progress::ProgressTracker;
use super::{run_queued, PageCursor};

/// Callback invoked after every received page
pub type ProgressCallback<'a> = &'a mut (dyn FnMut(ProgressEstimate) + Send + 'a);

/// Retrieves one chat's messages within a time window, oldest first
pub struct MessagePaginator {
    queue: Arc<RateLimitedQueue>,
    source: Arc<dyn MessagePageSource>,
    page_size: u32,
}

impl MessagePaginator {
    pub fn new(
        queue: Arc<RateLimitedQueue>,
        source: Arc<dyn MessagePageSource>,
        page_size: u32,
    ) -> Self {
        Self { queue, source, page_size }
    }

    /// Fetch every message of `chat_id` created inside `window`.
    ///
    /// `on_progress` runs synchronously after each page, intermediate pages
    /// included. The result is sorted by creation time even when pages
    /// arrive out of order.
    #[instrument(skip(self, on_progress), fields(page_size = self.page_size))]
    pub async fn fetch_all(
        &self,
        chat_id: &str,
        window: TimeWindow,
        mut on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<Message>> {
        let query = Arc::new(MessageQuery {
            chat_id: chat_id.to_string(),
            window,
            page_size: self.page_size,
        });
        let mut messages = Vec::new();
        let mut cursor = PageCursor::new();
        let mut tracker = ProgressTracker::new(self.page_size);

        while cursor.has_more() {
            let source = Arc::clone(&self.source);
            let query = Arc::clone(&query);
            let token = cursor.token();
            let page = run_queued(&self.queue, move || async move {
                source.fetch_message_page(&query, token).await
            })
            .await?;

            cursor.advance(&page, "messages");
            let count = page.items.len();
            messages.extend(page.items);

            let estimate = tracker.record_page(count, cursor.has_more());
            debug!(
                page = cursor.pages(),
                items = count,
                processed = estimate.processed,
                estimated_total = estimate.estimated_total,
                has_more = estimate.has_more,
                "Fetched message page"
            );
            if let Some(callback) = on_progress.as_deref_mut() {
                callback(estimate);
            }
        }

        sort_by_create_time(&mut messages);
        let summary = tracker.finish();
        info!(
            total = summary.processed,
            pages = tracker.pages(),
            "Message history retrieved"
        );
        Ok(messages)
    }
}
