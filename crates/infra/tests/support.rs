#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use larkexport_domain::ApiConfig;
use larkexport_infra::{ApiService, InMemoryCredentialStore};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CHATS: &str = "/open-apis/im/v1/chats";
pub const MESSAGES: &str = "/open-apis/im/v1/messages";

/// Credential store seeded with a token, counting critical notifications.
pub struct TestSession {
    pub store: Arc<InMemoryCredentialStore>,
    critical: Arc<AtomicUsize>,
}

impl TestSession {
    pub fn new() -> Self {
        let critical = Arc::new(AtomicUsize::new(0));
        let counter = critical.clone();
        let store = Arc::new(InMemoryCredentialStore::with_critical_failure_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        store.set_token("t-integration").expect("token should be accepted");
        Self { store, critical }
    }

    pub fn critical_failures(&self) -> usize {
        self.critical.load(Ordering::SeqCst)
    }

    pub fn service(&self, server: &MockServer) -> ApiService {
        ApiService::builder()
            .config(ApiConfig { base_url: server.uri(), ..ApiConfig::default() })
            .credential_store(self.store.clone())
            .build()
            .expect("service should build")
    }
}

pub fn page(items: Value, has_more: bool, page_token: Option<&str>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 0,
        "msg": "success",
        "data": { "items": items, "has_more": has_more, "page_token": page_token }
    }))
}

pub fn api_error(code: i64, msg: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": code, "msg": msg }))
}

/// Mount `response` for the first page (no `page_token`) of `endpoint`,
/// optionally restricted to one chat.
pub async fn mount_first_page(
    server: &MockServer,
    endpoint: &str,
    chat_id: Option<&str>,
    response: ResponseTemplate,
) {
    let mut mock = Mock::given(method("GET")).and(path(endpoint)).and(query_param_is_missing("page_token"));
    if let Some(chat_id) = chat_id {
        mock = mock.and(query_param("container_id", chat_id));
    }
    mock.respond_with(response).mount(server).await;
}

/// Mount `response` for the page requested with `token`.
pub async fn mount_page(server: &MockServer, endpoint: &str, token: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("page_token", token))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn message(id: &str, create_time: i64) -> Value {
    json!({
        "message_id": id,
        "create_time": create_time.to_string(),
        "message_type": "text",
        "content": "{\"text\":\"hello\"}"
    })
}

/// `page_token` values of received requests to `endpoint`, in arrival order.
pub async fn requested_tokens(server: &MockServer, endpoint: &str) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|request| request.url.path() == endpoint)
        .map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "page_token")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}
