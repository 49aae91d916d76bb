//! Paginated retrieval through the rate-limited queue
//!
//! Every page fetch is one queued task, so concurrent paginators sharing a
//! queue interleave strictly in submission order.

mod chats;
mod messages;
pub mod ports;
mod progress;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

pub use chats::ChatPaginator;
use larkexport_common::resilience::RateLimitedQueue;
use larkexport_domain::{ExportError, Page, Result};
pub use messages::{MessagePaginator, ProgressCallback};
pub use progress::ProgressTracker;
use tracing::warn;

/// Submit `task` to `queue` and wait for its result.
///
/// A task the queue dropped before completion surfaces as
/// [`ExportError::Internal`].
pub async fn run_queued<F, Fut, T>(queue: &RateLimitedQueue, task: F) -> Result<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    queue.submit(task).await.map_err(|err| {
        err.into_task_error(|| ExportError::Internal("queued task dropped before completion".into()))
    })
}

/// Continuation state of one pagination run
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageCursor {
    token: Option<String>,
    has_more: bool,
    pages: usize,
}

impl PageCursor {
    pub(crate) fn new() -> Self {
        Self { token: None, has_more: true, pages: 0 }
    }

    pub(crate) fn has_more(&self) -> bool {
        self.has_more
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.token.clone()
    }

    pub(crate) fn pages(&self) -> usize {
        self.pages
    }

    /// Advance past `page`.
    ///
    /// `has_more` without a continuation token ends the run: continuing
    /// would request the first page again.
    pub(crate) fn advance<T>(&mut self, page: &Page<T>, resource: &'static str) {
        self.pages += 1;
        let token = page.page_token.as_deref().filter(|token| !token.is_empty());
        match (page.has_more, token) {
            (true, Some(token)) => {
                self.token = Some(token.to_string());
                self.has_more = true;
            }
            (true, None) => {
                warn!(resource, page = self.pages, "has_more set without page_token; stopping");
                self.token = None;
                self.has_more = false;
            }
            (false, _) => {
                self.token = None;
                self.has_more = false;
            }
        }
    }
}
