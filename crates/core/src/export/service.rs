//! Export service - fetches message history for a selection of chats
//!
//! Chats are processed one after another. A failure in one chat is recorded
//! on that chat's outcome and the run moves on; an authentication failure
//! ends the whole run, since every later call would fail the same way.

use larkexport_domain::{ExportError, Message, ProgressEstimate, Result, TimeWindow};
use tracing::{error, info, instrument, warn};

use crate::retrieval::MessagePaginator;

/// Progress callback receiving the chat id with each estimate
pub type ChatProgressCallback<'a> = &'a mut (dyn FnMut(&str, ProgressEstimate) + Send + 'a);

/// Outcome of exporting one chat
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExport {
    pub chat_id: String,
    pub outcome: Result<Vec<Message>>,
}

impl ChatExport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&ExportError> {
        self.outcome.as_ref().err()
    }

    /// Number of exported messages, zero on failure.
    pub fn message_count(&self) -> usize {
        self.outcome.as_ref().map_or(0, Vec::len)
    }
}

/// Export orchestrator over the message paginator
pub struct ExportService {
    paginator: MessagePaginator,
}

impl ExportService {
    pub fn new(paginator: MessagePaginator) -> Self {
        Self { paginator }
    }

    /// Fetch messages inside `window` for every chat in `chat_ids`.
    ///
    /// Returns one [`ChatExport`] per chat, in selection order. Fails as a
    /// whole only on an authentication failure.
    #[instrument(skip(self, chat_ids, on_progress), fields(chats = chat_ids.len()))]
    pub async fn export_chats(
        &self,
        chat_ids: &[String],
        window: TimeWindow,
        mut on_progress: Option<ChatProgressCallback<'_>>,
    ) -> Result<Vec<ChatExport>> {
        let mut exports = Vec::with_capacity(chat_ids.len());

        for chat_id in chat_ids {
            let outcome = match on_progress.as_deref_mut() {
                Some(callback) => {
                    let mut forward =
                        |estimate: ProgressEstimate| callback(chat_id.as_str(), estimate);
                    self.paginator.fetch_all(chat_id, window, Some(&mut forward)).await
                }
                None => self.paginator.fetch_all(chat_id, window, None).await,
            };

            match outcome {
                Err(err) if err.is_auth_failure() => {
                    error!(chat_id = %chat_id, error = %err, "Authentication failed; aborting export");
                    return Err(err);
                }
                Err(err) => {
                    warn!(chat_id = %chat_id, error = %err, kind = err.label(), "Chat export failed");
                    exports.push(ChatExport { chat_id: chat_id.clone(), outcome: Err(err) });
                }
                Ok(messages) => {
                    info!(chat_id = %chat_id, messages = messages.len(), "Chat exported");
                    exports.push(ChatExport { chat_id: chat_id.clone(), outcome: Ok(messages) });
                }
            }
        }

        let failed = exports.iter().filter(|export| !export.is_success()).count();
        info!(exported = exports.len() - failed, failed, "Export run finished");
        Ok(exports)
    }

    /// Validate `start_ms`/`end_ms` and export.
    pub async fn export_range(
        &self,
        chat_ids: &[String],
        start_ms: i64,
        end_ms: i64,
        on_progress: Option<ChatProgressCallback<'_>>,
    ) -> Result<Vec<ChatExport>> {
        let window = TimeWindow::new(start_ms, end_ms)?;
        self.export_chats(chat_ids, window, on_progress).await
    }
}
