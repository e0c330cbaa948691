//! Boundary with the external fact-checking AI service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;
use veracity_common::{Result, VeracityError};
use veracity_http::{Auth, HeaderName, HeaderValue, HttpClient, HttpError, RequestOpts};

use crate::types::QueryMetadata;

/// One outbound call per request; retries, if wanted, are the caller's
/// policy, never this client's.
#[async_trait]
pub trait VerificationClient: Send + Sync {
    /// Send a composed query and return the raw (streaming-concatenated)
    /// response text. The full body is read before returning; no partial
    /// text ever reaches the classifier.
    async fn send(&self, query: &str, metadata: &QueryMetadata) -> Result<String>;
}

#[derive(Serialize)]
struct ChatPayload<'a> {
    #[serde(rename = "userId")]
    user_id: String,
    query: &'a str,
    metadata: &'a QueryMetadata,
}

/// HTTP implementation talking to the verification API's `/chat` endpoint.
pub struct VerifyApiClient {
    http: HttpClient,
    api_key: String,
    timeout: Duration,
}

impl VerifyApiClient {
    pub fn new(endpoint: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let http = HttpClient::new(endpoint)
            .map_err(|e| VeracityError::Config(format!("bad verification endpoint: {e}")))?;
        Ok(Self {
            http,
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl VerificationClient for VerifyApiClient {
    async fn send(&self, query: &str, metadata: &QueryMetadata) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(VeracityError::Upstream(
                "verification API key is not configured".to_string(),
            ));
        }

        let payload = ChatPayload {
            // Per-call id for upstream bookkeeping; deliberately outside the
            // composed query so composition stays deterministic.
            user_id: format!("{}-{}", metadata.source, Uuid::new_v4().simple()),
            query,
            metadata,
        };

        tracing::info!(
            source = %metadata.source,
            query_len = query.len(),
            media_count = metadata.media_urls.len(),
            "verify.request"
        );

        let raw = self
            .http
            .post_text(
                "chat",
                &payload,
                RequestOpts {
                    auth: Auth::Header {
                        name: HeaderName::from_static("x-api-key"),
                        value: HeaderValue::from_str(self.api_key.trim()).map_err(|e| {
                            VeracityError::Config(format!("invalid verification API key: {e}"))
                        })?,
                    },
                    timeout: Some(self.timeout),
                    // Single attempt by contract.
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .map_err(classify_http_error)?;

        tracing::debug!(response_len = raw.len(), "verify.response");
        Ok(raw)
    }
}

fn classify_http_error(e: HttpError) -> VeracityError {
    if e.is_timeout() {
        return VeracityError::Timeout;
    }
    match e.status_code() {
        Some(401) | Some(403) => VeracityError::Upstream(format!(
            "verification API rejected the configured key: {e}"
        )),
        _ => VeracityError::Upstream(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_the_timeout_variant() {
        let err = classify_http_error(HttpError::Timeout(Duration::from_secs(1)));
        assert!(matches!(err, VeracityError::Timeout));
    }

    #[test]
    fn auth_failures_mention_the_key() {
        let err = classify_http_error(HttpError::Api {
            status: veracity_http::StatusCode::UNAUTHORIZED,
            message: "bad key".into(),
        });
        match err {
            VeracityError::Upstream(msg) => assert!(msg.contains("rejected the configured key")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
