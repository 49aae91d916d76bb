//! Transport wrapper for the open platform list endpoints
//!
//! Every call resolves a fresh token from the credential provider, sends one
//! GET request and classifies the outcome into an [`ExportError`]. This is
//! the only place errors are classified; paginators pass them through.
//!
//! Classification order:
//! 1. HTTP 401/403 - critical invalidation, `AuthenticationFailed`
//! 2. HTTP 429 - `RateLimited` with any `Retry-After` hint
//! 3. Numeric body `code` - 0 passes, reserved token codes invalidate,
//!    the rate limit code maps to `RateLimited`, anything else is `Api`
//! 4. No body code and status >= 400 - `Http`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larkexport_core::{
    ChatPageSource, CredentialInvalidator, CredentialProvider, MessagePageSource, MessageQuery,
};
use larkexport_domain::constants::{
    API_SUCCESS_CODE, CHAT_LIST_PATH, CHAT_USER_ID_TYPE, MESSAGE_CONTAINER_ID_TYPE,
    MESSAGE_LIST_PATH, MESSAGE_SORT_ASCENDING, RATE_LIMITED_CODE, TOKEN_EXPIRED_CODE,
    TOKEN_INVALID_CODE,
};
use larkexport_domain::{ApiConfig, Chat, ExportError, Message, Page, Result};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Authenticated, classifying client for the list endpoints
pub struct ApiTransport {
    http: HttpClient,
    credentials: Arc<dyn CredentialProvider>,
    invalidator: Arc<dyn CredentialInvalidator>,
    cancellation: Option<CancellationToken>,
}

impl ApiTransport {
    pub fn new(
        http: HttpClient,
        credentials: Arc<dyn CredentialProvider>,
        invalidator: Arc<dyn CredentialInvalidator>,
    ) -> Self {
        Self { http, credentials, invalidator, cancellation: None }
    }

    /// Build the transport and its HTTP client from `config`.
    pub fn from_config(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialProvider>,
        invalidator: Arc<dyn CredentialInvalidator>,
    ) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::builder()
            .base_url(config.base_url.clone())
            .timeout(config.timeout())
            .user_agent(concat!("larkexport/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(http, credentials, invalidator))
    }

    /// Fail in-flight and later calls with [`ExportError::Cancelled`] once
    /// `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// GET one page of `T` from `path`.
    #[instrument(skip(self, query))]
    pub async fn get_page<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Page<T>> {
        if self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
            warn!("Request cancelled before sending");
            return Err(ExportError::Cancelled);
        }

        let token = self.resolve_token().await?;
        let request = self.http.request(Method::GET, path).bearer_auth(token).query(query);
        let exchange = self.exchange(request);

        match &self.cancellation {
            Some(cancel) => tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    warn!("Request cancelled");
                    Err(ExportError::Cancelled)
                }
                outcome = exchange => outcome,
            },
            None => exchange.await,
        }
    }

    async fn resolve_token(&self) -> Result<String> {
        match self.credentials.access_token().await {
            Ok(token) => Ok(token),
            Err(err) => {
                error!(error = %err, "Failed to resolve access token; invalidating credentials");
                self.invalidator.invalidate(true);
                Err(ExportError::MissingCredential)
            }
        }
    }

    async fn exchange<T: DeserializeOwned + Send>(&self, request: RequestBuilder) -> Result<Page<T>> {
        let response = self.http.send(request).await?;
        let status = response.status();
        let retry_after = retry_after(response.headers());
        let body = response.bytes().await.map_err(|err| ExportError::from(InfraError::from(err)))?;
        self.classify(status, retry_after, &body)
    }

    fn classify<T: DeserializeOwned>(
        &self,
        status: StatusCode,
        retry_after: Option<Duration>,
        body: &[u8],
    ) -> Result<Page<T>> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!(status = status.as_u16(), "Token rejected by the server");
            return Err(self.authentication_failed(format!("HTTP {}", status.as_u16())));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(retry_after_secs = retry_after.map(|d| d.as_secs()), "HTTP 429 rate limit exceeded");
            return Err(ExportError::RateLimited { detail: "HTTP 429".into(), retry_after });
        }

        let payload: Option<Value> = serde_json::from_slice(body).ok();
        let code = payload.as_ref().and_then(|p| p.get("code")).and_then(Value::as_i64);

        match (code, payload) {
            (Some(API_SUCCESS_CODE), Some(payload)) => decode_page(payload),
            (Some(code), Some(payload)) => {
                let message = payload
                    .get("msg")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                warn!(code, msg = %message, status = status.as_u16(), "API returned an error code");
                Err(self.api_failure(code, message))
            }
            _ if status.as_u16() >= 400 => {
                error!(status = status.as_u16(), "HTTP error without API status code");
                Err(ExportError::Http {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("Unknown Status").into(),
                })
            }
            _ => Err(ExportError::InvalidResponse(format!(
                "HTTP {} response carries no numeric status code",
                status.as_u16()
            ))),
        }
    }

    fn api_failure(&self, code: i64, message: String) -> ExportError {
        match code {
            TOKEN_INVALID_CODE | TOKEN_EXPIRED_CODE => {
                self.authentication_failed(format!("Code: {code}"))
            }
            RATE_LIMITED_CODE => {
                ExportError::RateLimited { detail: format!("Code: {code}"), retry_after: None }
            }
            _ => ExportError::Api { code, message },
        }
    }

    fn authentication_failed(&self, detail: String) -> ExportError {
        warn!(detail = %detail, "Invalidating credentials after authentication failure");
        self.invalidator.invalidate(true);
        ExportError::AuthenticationFailed(detail)
    }
}

fn decode_page<T: DeserializeOwned>(mut payload: Value) -> Result<Page<T>> {
    match payload.get_mut("data").map(Value::take) {
        None | Some(Value::Null) => {
            debug!("Successful response without data; treating as final empty page");
            Ok(Page::default())
        }
        Some(data) => serde_json::from_value(data)
            .map_err(|err| ExportError::InvalidResponse(format!("unexpected page shape: {err}"))),
    }
}

/// `Retry-After` as either delay seconds or an HTTP date.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    (at - Utc::now()).to_std().ok()
}

#[async_trait]
impl ChatPageSource for ApiTransport {
    async fn fetch_chat_page(
        &self,
        page_size: u32,
        page_token: Option<String>,
    ) -> Result<Page<Chat>> {
        let mut query = vec![
            ("page_size", page_size.to_string()),
            ("user_id_type", CHAT_USER_ID_TYPE.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("page_token", token));
        }
        self.get_page(CHAT_LIST_PATH, &query).await
    }
}

#[async_trait]
impl MessagePageSource for ApiTransport {
    async fn fetch_message_page(
        &self,
        query: &MessageQuery,
        page_token: Option<String>,
    ) -> Result<Page<Message>> {
        let mut params = vec![
            ("container_id_type", MESSAGE_CONTAINER_ID_TYPE.to_string()),
            ("container_id", query.chat_id.clone()),
            ("start_time", query.window.start_param()),
            ("end_time", query.window.end_param()),
            ("page_size", query.page_size.to_string()),
            ("sort_type", MESSAGE_SORT_ASCENDING.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("page_token", token));
        }
        self.get_page(MESSAGE_LIST_PATH, &params).await
    }
}
