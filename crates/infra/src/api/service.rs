//! API service facade
//!
//! Owns the rate-limited queue for one session. Every outbound call made
//! through the service, from either paginator or from credential
//! validation, is a task on that queue, so calls never overlap and start at
//! least one spacing interval apart.

use std::sync::Arc;

use larkexport_common::resilience::RateLimitedQueue;
use larkexport_core::export::ChatProgressCallback;
use larkexport_core::retrieval::ProgressCallback;
use larkexport_core::{
    run_queued, ChatExport, ChatPageSource, ChatPaginator, CredentialInvalidator,
    CredentialProvider, ExportService, MessagePaginator,
};
use larkexport_domain::{ApiConfig, Chat, ExportError, Message, Result, TimeWindow};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::transport::ApiTransport;
use crate::auth::InMemoryCredentialStore;

/// Chat and message retrieval for one authenticated session
pub struct ApiService {
    queue: Arc<RateLimitedQueue>,
    transport: Arc<ApiTransport>,
    invalidator: Arc<dyn CredentialInvalidator>,
    chats: ChatPaginator,
    messages: MessagePaginator,
    exporter: ExportService,
}

impl ApiService {
    /// Create a builder for fluent configuration
    pub fn builder() -> ApiServiceBuilder {
        ApiServiceBuilder::default()
    }

    /// Assemble the service around an existing transport.
    pub fn from_transport(
        transport: ApiTransport,
        invalidator: Arc<dyn CredentialInvalidator>,
        config: &ApiConfig,
    ) -> Self {
        let queue = Arc::new(RateLimitedQueue::new(config.min_request_spacing()));
        let transport = Arc::new(transport);
        let page_size = config.page_size;

        let chats = ChatPaginator::new(Arc::clone(&queue), transport.clone(), page_size);
        let messages = MessagePaginator::new(Arc::clone(&queue), transport.clone(), page_size);
        let exporter = ExportService::new(MessagePaginator::new(
            Arc::clone(&queue),
            transport.clone(),
            page_size,
        ));

        Self { queue, transport, invalidator, chats, messages, exporter }
    }

    /// The queue all calls of this service run on.
    pub fn queue(&self) -> &RateLimitedQueue {
        &self.queue
    }

    /// Every chat visible to the current credential.
    pub async fn fetch_all_chats(&self) -> Result<Vec<Chat>> {
        self.chats.fetch_all().await
    }

    /// Messages of `chat_id` created between `start_ms` and `end_ms`
    /// (inclusive), oldest first.
    pub async fn fetch_all_messages(
        &self,
        chat_id: &str,
        start_ms: i64,
        end_ms: i64,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> Result<Vec<Message>> {
        let window = TimeWindow::new(start_ms, end_ms)?;
        self.messages.fetch_all(chat_id, window, on_progress).await
    }

    /// Export every chat in `chat_ids`, isolating per-chat failures.
    pub async fn export_chats(
        &self,
        chat_ids: &[String],
        start_ms: i64,
        end_ms: i64,
        on_progress: Option<ChatProgressCallback<'_>>,
    ) -> Result<Vec<ChatExport>> {
        self.exporter.export_range(chat_ids, start_ms, end_ms, on_progress).await
    }

    /// Check the stored credential with a single one-item chat list call.
    ///
    /// A credential that cannot be verified is discarded: any failure other
    /// than cancellation ends with a critical invalidation.
    #[instrument(skip(self))]
    pub async fn validate_credential(&self) -> Result<()> {
        let source = Arc::clone(&self.transport);
        let outcome =
            run_queued(&self.queue, move || async move { source.fetch_chat_page(1, None).await })
                .await;

        match outcome {
            Ok(_) => {
                info!("Credential validated");
                Ok(())
            }
            // the transport has already invalidated
            Err(err) if err.is_auth_failure() => Err(err),
            Err(ExportError::Cancelled) => Err(ExportError::Cancelled),
            Err(err) => {
                warn!(error = %err, kind = err.label(), "Credential validation failed; invalidating");
                self.invalidator.invalidate(true);
                Err(err)
            }
        }
    }
}

/// Builder for [`ApiService`].
#[derive(Default)]
pub struct ApiServiceBuilder {
    config: Option<ApiConfig>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    invalidator: Option<Arc<dyn CredentialInvalidator>>,
    cancellation: Option<CancellationToken>,
}

impl ApiServiceBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential provider
    pub fn credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Set the credential invalidator
    pub fn invalidator(mut self, invalidator: Arc<dyn CredentialInvalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    /// Use `store` as both provider and invalidator.
    pub fn credential_store(self, store: Arc<InMemoryCredentialStore>) -> Self {
        self.credentials(store.clone()).invalidator(store)
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the API service
    ///
    /// # Errors
    ///
    /// Returns `Config` if credentials are missing or the configuration is
    /// invalid.
    pub fn build(self) -> Result<ApiService> {
        let config = self.config.unwrap_or_default();
        let credentials = self
            .credentials
            .ok_or_else(|| ExportError::Config("Credential provider not set".to_string()))?;
        let invalidator = self
            .invalidator
            .ok_or_else(|| ExportError::Config("Credential invalidator not set".to_string()))?;

        let mut transport = ApiTransport::from_config(&config, credentials, invalidator.clone())?;
        if let Some(token) = self.cancellation {
            transport = transport.with_cancellation(token);
        }

        Ok(ApiService::from_transport(transport, invalidator, &config))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(server: &MockServer) -> ApiConfig {
        ApiConfig { base_url: server.uri(), ..ApiConfig::default() }
    }

    fn store_with_counter() -> (Arc<InMemoryCredentialStore>, Arc<AtomicUsize>) {
        let critical = Arc::new(AtomicUsize::new(0));
        let counter = critical.clone();
        let store = Arc::new(InMemoryCredentialStore::with_critical_failure_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        store.set_token("t-abc").unwrap();
        (store, critical)
    }

    #[test]
    fn build_requires_credentials() {
        let err = ApiService::builder().build().err();
        assert!(matches!(err, Some(ExportError::Config(_))));
    }

    #[tokio::test]
    async fn validation_uses_a_single_item_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/open-apis/im/v1/chats"))
            .and(query_param("page_size", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({ "code": 0, "data": { "items": [], "has_more": false } }),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (store, critical) = store_with_counter();
        let service =
            ApiService::builder().config(config(&server)).credential_store(store.clone()).build().unwrap();

        service.validate_credential().await.unwrap();
        assert!(store.has_credential());
        assert_eq!(critical.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_validation_discards_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (store, critical) = store_with_counter();
        let service =
            ApiService::builder().config(config(&server)).credential_store(store.clone()).build().unwrap();

        let err = service.validate_credential().await.unwrap_err();
        assert!(matches!(err, ExportError::Http { status: 500, .. }));
        assert!(!store.has_credential());
        assert_eq!(critical.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_token_invalidates_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "code": 99_991_663, "msg": "invalid" })),
            )
            .mount(&server)
            .await;

        let (store, critical) = store_with_counter();
        let service =
            ApiService::builder().config(config(&server)).credential_store(store.clone()).build().unwrap();

        let err = service.validate_credential().await.unwrap_err();
        assert!(err.is_auth_failure());
        assert_eq!(critical.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected_before_any_call() {
        let server = MockServer::start().await;
        let (store, _) = store_with_counter();
        let service =
            ApiService::builder().config(config(&server)).credential_store(store).build().unwrap();

        let err = service.fetch_all_messages("oc_1", 2_000, 1_000, None).await.unwrap_err();
        assert!(matches!(err, ExportError::InvalidInput(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
