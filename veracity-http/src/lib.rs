//! Minimal HTTP client with safe logging, retries, and flexible auth.
//!
//! - Request options: headers, [`Auth`], query params, timeout, retries
//! - Redacts sensitive query params and never logs secret values
//! - Retries 429/5xx with exponential backoff and `Retry-After` support
//! - JSON helpers plus [`HttpClient::post_text`] for endpoints that answer
//!   with a plain (streaming-concatenated) text body
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), veracity_http::HttpError> {
//! let client = veracity_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", veracity_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: logs only ever include the auth kind (bearer/header/query/none),
//! not the secret itself.

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, Url};
/// Re-exported so callers can build [`Auth::Header`] values and match on
/// [`HttpError::Api`] statuses without a direct `reqwest` dependency.
pub use reqwest::StatusCode;
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl HttpError {
    /// Whether the failure was a client-side deadline rather than a server answer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout(_))
    }

    /// Numeric status for API-level failures, `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpError::Api { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }
}

/// Authentication strategies supported by the HTTP client helpers.
#[derive(Clone, Debug, Default)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Custom header (e.g. `X-API-Key` or `X-RapidAPI-Key`)
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    /// Auth via query param (e.g. YouTube Data API `key`)
    Query { name: &'a str, value: Cow<'a, str> },
    #[default]
    None,
}

/// Per-request tuning knobs for the HTTP client.
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Auth<'a>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(30),
            max_retries: 2,
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the default retry budget returned by [`HttpClient::new`].
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// GET a JSON document.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let (bytes, snippet) = self.request::<()>(Method::GET, path, None, opts).await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| HttpError::Decode(e.to_string(), snippet))
    }

    /// POST a JSON body and decode a JSON answer.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (bytes, snippet) = self.request(Method::POST, path, Some(body), opts).await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| HttpError::Decode(e.to_string(), snippet))
    }

    /// POST a JSON body and return the raw text answer.
    ///
    /// Upstreams that stream `text/plain` chunks are consumed to completion
    /// here; callers always see the fully concatenated body.
    pub async fn post_text<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<String, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let (bytes, _snippet) = self.request(Method::POST, path, Some(body), opts).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<(Vec<u8>, String), HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let auth_kind = match &opts.auth {
            Auth::Bearer(_) => "bearer",
            Auth::Header { .. } => "header",
            Auth::Query { .. } => "query",
            Auth::None => "none",
        };

        let mut attempt = 0usize;
        loop {
            let mut rb = self.inner.request(method.clone(), url.clone());
            rb = rb.timeout(timeout);

            if let Some(q) = &opts.query {
                let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
                rb = rb.query(&pairs);
            }
            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }
            match &opts.auth {
                Auth::Bearer(tok) => rb = rb.bearer_auth(tok.trim()),
                Auth::Header { name, value } => rb = rb.header(name, value),
                Auth::Query { name, value } => rb = rb.query(&[(*name, value.as_ref())]),
                Auth::None => {}
            }
            if let Some(b) = body {
                rb = rb.json(b);
            }

            tracing::debug!(
                attempt = attempt + 1,
                max_retries,
                method = %method,
                host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
                query = ?redact_query(opts.query.as_deref()),
                timeout_ms = timeout.as_millis() as u64,
                auth_kind,
                has_body = body.is_some(),
                "http.request.start"
            );

            let t0 = std::time::Instant::now();
            let sent = rb.send().await;
            let resp = match sent {
                Ok(resp) => resp,
                Err(err) if err.is_timeout() => {
                    tracing::warn!(method = %method, path, timeout_ms = timeout.as_millis() as u64, "http.timeout");
                    return Err(HttpError::Timeout(timeout));
                }
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        tracing::warn!(attempt, backoff_ms = delay.as_millis() as u64, %message, "http.retrying.network");
                        sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(message));
                }
            };

            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = match resp.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(err) if err.is_timeout() => return Err(HttpError::Timeout(timeout)),
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        tracing::warn!(attempt, backoff_ms = delay.as_millis() as u64, %message, "http.retrying.body");
                        sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(message));
                }
            };

            let snippet = snip_body(&bytes);
            tracing::debug!(
                %status,
                duration_ms = t0.elapsed().as_millis() as u64,
                body_len = bytes.len(),
                "http.response"
            );
            tracing::trace!(body_snippet = %snippet, "http.response.body_snippet");

            if status.is_success() {
                return Ok((bytes, snippet));
            }

            let message = extract_error_message(&bytes);
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < max_retries {
                attempt += 1;
                let delay = retry_after_delay_secs(&headers)
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| {
                        let exp = backoff_delay(attempt);
                        if status == StatusCode::TOO_MANY_REQUESTS {
                            // default floor for 429 when no Retry-After is present
                            exp.max(Duration::from_millis(1100))
                        } else {
                            exp
                        }
                    });
                tracing::warn!(%status, attempt, backoff_ms = delay.as_millis() as u64, %message, "http.retrying");
                sleep(delay).await;
                continue;
            }

            tracing::warn!(%status, %message, body_snippet = %snippet, "http.error");
            return Err(HttpError::Api { status, message });
        }
    }
}

fn backoff_delay(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt - 1)))
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let mut cut = 500;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

/// Best-effort extraction of a human-readable error from common JSON envelopes:
/// `{"error":{"message":..}}`, `{"errors":[..]}`, `{"message"|"detail"|"error":..}`.
fn extract_error_message(body: &[u8]) -> String {
    let Ok(val) = serde_json::from_slice::<serde_json::Value>(body) else {
        return snip_body(body);
    };

    let candidates = [
        val.pointer("/error/message"),
        val.pointer("/errors/0/message"),
        val.pointer("/errors/0/detail"),
        val.get("message"),
        val.get("detail"),
        val.get("error"),
    ];
    for c in candidates.into_iter().flatten() {
        if let Some(s) = c.as_str() {
            if !s.is_empty() {
                return s.to_string();
            }
        }
    }
    snip_body(body)
}

fn redact_query(query: Option<&[(&str, Cow<'_, str>)]>) -> Vec<(String, String)> {
    query
        .map(|q| {
            q.iter()
                .map(|(k, v)| {
                    let is_secret = matches!(
                        k.to_ascii_lowercase().as_str(),
                        "access_token"
                            | "authorization"
                            | "auth"
                            | "key"
                            | "api_key"
                            | "token"
                            | "secret"
                            | "client_secret"
                            | "bearer"
                    );
                    (
                        (*k).to_string(),
                        if is_secret {
                            "<redacted>".to_string()
                        } else {
                            v.as_ref().to_string()
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_nested_envelope() {
        let body = br#"{"error":{"message":"quota exceeded"}}"#;
        assert_eq!(extract_error_message(body), "quota exceeded");
    }

    #[test]
    fn error_message_from_flat_detail() {
        let body = br#"{"detail":"not found"}"#;
        assert_eq!(extract_error_message(body), "not found");
    }

    #[test]
    fn error_message_falls_back_to_snippet() {
        let body = b"upstream exploded";
        assert_eq!(extract_error_message(body), "upstream exploded");
    }

    #[test]
    fn secret_query_params_are_redacted() {
        let q: Vec<(&str, Cow<'_, str>)> =
            vec![("key", "s3cret".into()), ("part", "snippet".into())];
        let redacted = redact_query(Some(&q));
        assert_eq!(redacted[0].1, "<redacted>");
        assert_eq!(redacted[1].1, "snippet");
    }
}
