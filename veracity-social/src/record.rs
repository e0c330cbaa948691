//! Normalized content model shared by every platform extractor.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Where a piece of content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Youtube,
    Instagram,
    /// Direct image URL, no platform API behind it.
    Image,
    /// Direct video URL, no platform API behind it.
    Video,
    /// Any other web link.
    Web,
    /// Extraction failed; the record is an error stub.
    Unknown,
}

impl Platform {
    /// Platforms with a real extractor behind them.
    pub fn is_social(&self) -> bool {
        matches!(self, Platform::Tiktok | Platform::Youtube | Platform::Instagram)
    }

    /// Human-facing name used in composed prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Tiktok => "TikTok",
            Platform::Youtube => "YouTube",
            Platform::Instagram => "Instagram",
            Platform::Image => "Image",
            Platform::Video => "Video",
            Platform::Web => "Web",
            Platform::Unknown => "Unknown",
        }
    }

    /// Lowercase identifier used in request metadata.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Image => "image",
            Platform::Video => "video",
            Platform::Web => "web",
            Platform::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

/// One downloadable media asset attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

/// Engagement metrics as reported by the platform. Absent metrics are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

/// Normalized metadata for one extracted post/video.
///
/// Immutable once built; owned by the request that created it and dropped
/// when the verification round completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub platform: Platform,
    pub content_id: String,
    pub source_url: String,
    pub author: String,
    pub title: String,
    pub description: String,
    pub hashtags: Vec<String>,
    pub media: Vec<MediaRef>,
    pub engagement: Engagement,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl ContentRecord {
    /// Stub record for URLs that need no platform API (direct media, plain
    /// web links) or whose extraction failed (`Unknown`).
    pub fn stub(platform: Platform, url: &str) -> Self {
        let media = match platform {
            Platform::Image => vec![MediaRef {
                kind: MediaKind::Image,
                url: url.to_string(),
            }],
            Platform::Video => vec![MediaRef {
                kind: MediaKind::Video,
                url: url.to_string(),
            }],
            _ => Vec::new(),
        };
        Self {
            platform,
            content_id: url.to_string(),
            source_url: url.to_string(),
            author: String::new(),
            title: String::new(),
            description: String::new(),
            hashtags: Vec::new(),
            media,
            engagement: Engagement::default(),
            created_at: None,
        }
    }

    /// First attached video asset, if any.
    pub fn video_url(&self) -> Option<&str> {
        self.media
            .iter()
            .find(|m| m.kind == MediaKind::Video)
            .map(|m| m.url.as_str())
    }

    /// All attached image assets, in platform order.
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.media
            .iter()
            .filter(|m| m.kind == MediaKind::Image)
            .map(|m| m.url.as_str())
    }
}

/// Pull `#hashtags` out of a caption or description, without the `#`.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch != '#' {
            continue;
        }
        let rest = &text[idx + 1..];
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if end > 0 {
            tags.push(rest[..end].to_string());
            // Skip past the tag body so `##x` does not double-count.
            while let Some((i, _)) = chars.peek() {
                if *i <= idx + end {
                    chars.next();
                } else {
                    break;
                }
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtags_extracted_in_order() {
        let tags = extract_hashtags("breaking #news about #ai_models, allegedly");
        assert_eq!(tags, vec!["news", "ai_models"]);
    }

    #[test]
    fn hashtags_handle_unicode_and_empty_marks() {
        let tags = extract_hashtags("# plain #déjàvu end");
        assert_eq!(tags, vec!["déjàvu"]);
    }

    #[test]
    fn image_stub_carries_the_url_as_media() {
        let rec = ContentRecord::stub(Platform::Image, "https://cdn.example.com/x.png");
        assert_eq!(rec.media.len(), 1);
        assert_eq!(rec.media[0].kind, MediaKind::Image);
        assert!(rec.video_url().is_none());
    }

    #[test]
    fn web_stub_has_no_media() {
        let rec = ContentRecord::stub(Platform::Web, "https://example.com/article");
        assert!(rec.media.is_empty());
        assert_eq!(rec.content_id, "https://example.com/article");
    }
}
