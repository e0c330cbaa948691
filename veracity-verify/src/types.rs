//! Data contracts for the verification pipeline.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Closed-set classification of content truthfulness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Verified,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
    Error,
}

/// Pipeline outcome marker, independent of the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Warning,
    Danger,
}

/// Structured annotation attached to a result, independent of the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub message: String,
}

/// One piece of cited evidence mined from the response text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub outlet: String,
}

/// Who wrote a conversation turn. Unknown labels are preserved verbatim and
/// rendered as-is into the context block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sender {
    User,
    Assistant,
    Other(String),
}

impl Sender {
    /// Role label used when rendering conversation context.
    pub fn label(&self) -> &str {
        match self {
            Sender::User => "User",
            Sender::Assistant => "Assistant",
            Sender::Other(raw) => raw,
        }
    }
}

impl From<String> for Sender {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "user" => Sender::User,
            "assistant" => Sender::Assistant,
            _ => Sender::Other(raw),
        }
    }
}

impl From<Sender> for String {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => "user".into(),
            Sender::Assistant => "assistant".into(),
            Sender::Other(raw) => raw,
        }
    }
}

/// One prior message supplied by the caller as context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub content: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

/// Media slot types understood by the verification API metadata envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSlot {
    Video,
    Image,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaMedia {
    #[serde(rename = "type")]
    pub kind: MediaSlot,
    pub url: String,
}

/// Metadata envelope accompanying one composed query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryMetadata {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub media_urls: Vec<MetaMedia>,
}

/// The composed prompt plus its metadata envelope. Transient; lives only for
/// the duration of one verification call.
#[derive(Debug, Clone)]
pub struct ComposedQuery {
    pub query: String,
    pub metadata: QueryMetadata,
}

/// Uploaded-file descriptor. Only the name and size matter here; the bytes
/// are never analyzed locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub size_bytes: u64,
}

/// One incoming verification request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    pub message: String,
    /// Caller-side conversation handle. The upstream service does not accept
    /// one, so it is only carried through for logging.
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub image_file: Option<UploadedFile>,
    #[serde(default)]
    pub video_file: Option<UploadedFile>,
}

/// Structured verification outcome returned to the caller.
///
/// `verdict` and `score` always come from the same classification rule and
/// are never overwritten independently afterwards. `sources` never exceeds
/// five entries. Results are request-scoped and never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub request_id: String,
    pub status: Status,
    pub verdict: Verdict,
    pub score: u8,
    /// Confidence percentage, 0-100.
    pub confidence: u8,
    pub summary: String,
    pub flags: Vec<Flag>,
    pub sources: Vec<SourceRef>,
    pub tools_used: Vec<String>,
    /// The raw, unmodified response text.
    pub explanation: String,
}

impl VerificationResult {
    /// Degraded outcome for any failure caught at the orchestration boundary.
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            status: Status::Error,
            verdict: Verdict::Error,
            score: 0,
            confidence: 0,
            summary: "Unable to verify this information right now.".to_string(),
            flags: Vec::new(),
            sources: Vec::new(),
            tools_used: Vec::new(),
            explanation: detail.into(),
        }
    }
}
