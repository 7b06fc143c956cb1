//! Authenticated JSON transport with retry
//!
//! Retries network failures, 5xx and 429 with exponential backoff
//! (`base_delay * 2^attempt`, capped at `max_delay`). Every other non-2xx
//! status is surfaced immediately as [`Error::HttpStatus`].
//!
//! POST requests that time out are not retried, so a trade the server may
//! already have accepted is never sent twice by the transport. A 5xx on a
//! POST is still retried; the server reported the request as failed.

use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::schema::ValidationError;
use crate::{Error, Result};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry and backoff settings for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is `max_retries + 1`
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt + 1` (zero-based attempt index).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// 429 and 5xx are transient; every other status is final.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Pull the human-readable message out of an error body.
///
/// Prefers an `error` or `message` string field; falls back to the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

/// HTTP client for one API base URL and bearer token
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client with the default timeout and retry policy.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self> {
        Self::with_options(base_url, api_key, DEFAULT_TIMEOUT, RetryPolicy::default())
    }

    /// Create a client with an explicit per-attempt timeout and retry policy.
    pub fn with_options(
        base_url: &str,
        api_key: SecretString,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        url::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL {:?}: {}", base_url, e)))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path?query`, returning the decoded JSON body.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.send(Method::GET, path, query, None).await
    }

    /// `POST path` with a JSON body, returning the decoded JSON body.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, &[], Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.url(path);
        let attempts = self.retry.max_retries + 1;
        let mut attempt = 0;

        loop {
            debug!(method = %method, url = %url, attempt = attempt + 1, "Sending API request");

            match self.attempt(method.clone(), &url, query, body.as_ref()).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retry.max_retries && Self::is_transient(&method, &err) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "API request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// A POST that failed after it may have reached the server (timeout,
    /// dropped response) is not resent; only connection failures are.
    fn is_transient(method: &Method, err: &Error) -> bool {
        match err {
            Error::Network(e) => *method != Method::POST || e.is_connect(),
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    async fn attempt(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(self.api_key.expose_secret());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                message: error_message(status, &text),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::Validation(ValidationError::single(
                "response body",
                "$",
                format!("expected JSON: {}", e),
            ))
        })
    }
}
