//! End-to-end orchestration: extract (maybe), compose, call, interpret.

use std::sync::Arc;

use uuid::Uuid;
use veracity_common::{Result, VeracityError};
use veracity_social::detect::detect_platform;
use veracity_social::extractor::PlatformExtractor;
use veracity_social::record::ContentRecord;

use crate::classify;
use crate::client::VerificationClient;
use crate::compose;
use crate::sources;
use crate::types::{CheckRequest, Status, VerificationResult};

/// The pipeline facade handed to the surrounding HTTP layer.
///
/// One call to [`check_content`](Self::check_content) is one sequential
/// pipeline: optional extraction, composition, a single bounded outbound
/// call, then classification and source mining. There is no shared mutable
/// state; every instance can serve concurrent requests freely.
pub struct ContentChecker {
    extractor: Arc<dyn PlatformExtractor>,
    client: Arc<dyn VerificationClient>,
}

impl ContentChecker {
    pub fn new(extractor: Arc<dyn PlatformExtractor>, client: Arc<dyn VerificationClient>) -> Self {
        Self { extractor, client }
    }

    /// Verify a chat message, optionally enriched with media URLs, history,
    /// and uploaded-file descriptors.
    ///
    /// Only an invalid request ever surfaces as `Err`. Every downstream
    /// failure (extraction, upstream call, timeout) is caught here and
    /// degraded into an ERROR-verdict result so nothing unhandled reaches
    /// the HTTP layer.
    pub async fn check_content(&self, req: &CheckRequest) -> Result<VerificationResult> {
        if req.message.trim().is_empty() {
            return Err(VeracityError::InvalidInput(
                "message is required and must be a non-empty string".to_string(),
            ));
        }

        match self.run(req).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::warn!(error = %err, "verify.pipeline.degraded");
                Ok(VerificationResult::error(err.to_string()))
            }
        }
    }

    /// Full media-verification path for an already-extracted record.
    /// Upstream failures propagate to the caller here; this entry point is
    /// used by bots that handle their own retries and reporting.
    pub async fn check_video(&self, record: &ContentRecord) -> Result<VerificationResult> {
        tracing::info!(
            platform = record.platform.key(),
            content_id = %record.content_id,
            "verify.video_path"
        );
        let composed = compose::video_prompt(record);
        let raw = self.client.send(&composed.query, &composed.metadata).await?;
        Ok(build_result(&raw))
    }

    async fn run(&self, req: &CheckRequest) -> Result<VerificationResult> {
        if let Some(conversation) = &req.conversation_id {
            tracing::debug!(%conversation, "verify.request.conversation");
        }

        if let Some(record) = self.first_platform_record(&req.media_urls).await {
            tracing::info!(
                platform = record.platform.key(),
                content_id = %record.content_id,
                "verify.platform_path"
            );
            let composed = compose::platform_context_prompt(&record);
            let raw = self.client.send(&composed.query, &composed.metadata).await?;
            return Ok(build_result(&raw));
        }

        let composed = compose::chat_prompt(req)?;
        let raw = self.client.send(&composed.query, &composed.metadata).await?;
        Ok(build_result(&raw))
    }

    /// Resolve URLs in caller order and stop at the first one that extracts
    /// into a real platform record. Later URLs are never fetched once a
    /// record is chosen, and a failing URL is logged and skipped rather than
    /// aborting the request.
    async fn first_platform_record(&self, urls: &[String]) -> Option<ContentRecord> {
        for url in urls {
            if !detect_platform(url).is_social() {
                continue;
            }
            match self.extractor.extract(url).await {
                Ok(record) if record.platform.is_social() => return Some(record),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%url, error = %err, "social.extract.failed");
                }
            }
        }
        None
    }
}

/// Interpret one raw response into the final structured result. The verdict
/// and score always come from the same classification rule.
fn build_result(raw: &str) -> VerificationResult {
    let classification = classify::classify(raw);
    let cited = sources::extract_sources(raw);
    let confidence = sources::confidence_score(raw, cited.len());

    tracing::debug!(
        verdict = ?classification.verdict,
        score = classification.score,
        confidence,
        source_count = cited.len(),
        "verify.classified"
    );

    VerificationResult {
        request_id: Uuid::new_v4().to_string(),
        status: Status::Completed,
        verdict: classification.verdict,
        score: classification.score,
        confidence,
        summary: classification.summary,
        flags: classification.flags,
        sources: cited,
        tools_used: classify::detect_tools(raw),
        explanation: raw.to_string(),
    }
}
