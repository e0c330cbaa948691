//! YouTube extraction via the Data API v3 `videos` endpoint.

use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use veracity_http::{Auth, HttpClient, HttpError, RequestOpts};

use crate::extractor::ExtractError;
use crate::record::{ContentRecord, Engagement, MediaKind, MediaRef, Platform, extract_hashtags};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3/";

#[derive(Clone)]
pub struct YouTubeApi {
    http: HttpClient,
    api_key: String,
}

impl YouTubeApi {
    pub fn new(api_key: String) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(API_BASE)?,
            api_key,
        })
    }

    pub async fn extract_video(&self, url: &str) -> Result<ContentRecord, ExtractError> {
        let video_id = video_id_from_url(url).ok_or_else(|| ExtractError::InvalidUrl {
            platform: "youtube",
            url: url.to_string(),
        })?;

        let resp: VideoListResponse = self
            .http
            .get_json(
                "videos",
                RequestOpts {
                    auth: Auth::Query {
                        name: "key",
                        value: self.api_key.as_str().into(),
                    },
                    query: Some(vec![
                        ("part", "snippet,contentDetails,statistics".into()),
                        ("id", video_id.clone().into()),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        let item = resp
            .items
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::NotFound(format!("youtube video {video_id}")))?;
        Ok(to_record(item, &video_id, url))
    }
}

fn to_record(item: VideoItem, video_id: &str, url: &str) -> ContentRecord {
    let snippet = item.snippet.unwrap_or_default();
    let statistics = item.statistics.unwrap_or_default();
    let description = snippet.description.unwrap_or_default();

    // The Data API exposes no downloadable stream; the best thumbnail stands
    // in as the only media asset.
    let thumbnail = snippet.thumbnails.and_then(|t| {
        t.maxres
            .or(t.high)
            .or(t.default)
            .map(|thumb| thumb.url)
    });

    ContentRecord {
        platform: Platform::Youtube,
        content_id: video_id.to_string(),
        source_url: url.to_string(),
        author: snippet.channel_title.unwrap_or_default(),
        title: snippet.title.unwrap_or_default(),
        hashtags: extract_hashtags(&description),
        description,
        media: thumbnail
            .map(|url| {
                vec![MediaRef {
                    kind: MediaKind::Image,
                    url,
                }]
            })
            .unwrap_or_default(),
        engagement: Engagement {
            views: parse_count(statistics.view_count),
            likes: parse_count(statistics.like_count),
            comments: parse_count(statistics.comment_count),
            shares: 0,
        },
        created_at: snippet
            .published_at
            .and_then(|s| OffsetDateTime::parse(&s, &Rfc3339).ok()),
    }
}

// Statistics counts arrive as JSON strings.
fn parse_count(raw: Option<String>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Watch, short-link, embed, and shorts URL forms all resolve to the 11-char id.
fn video_id_from_url(url: &str) -> Option<String> {
    const MARKERS: &[&str] = &[
        "youtube.com/watch?v=",
        "youtu.be/",
        "youtube.com/embed/",
        "youtube.com/shorts/",
    ];
    for marker in MARKERS {
        if let Some(pos) = url.find(marker) {
            let id: String = url[pos + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .take(11)
                .collect();
            if id.len() == 11 {
                return Some(id);
            }
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoItem {
    #[serde(default)]
    snippet: Option<Snippet>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "channelTitle")]
    channel_title: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    maxres: Option<Thumbnail>,
    #[serde(default)]
    high: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct Statistics {
    #[serde(default, rename = "viewCount")]
    view_count: Option<String>,
    #[serde(default, rename = "likeCount")]
    like_count: Option<String>,
    #[serde(default, rename = "commentCount")]
    comment_count: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_id_parsed_from_every_url_form() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(video_id_from_url(url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
        assert_eq!(video_id_from_url("https://www.youtube.com/feed"), None);
    }

    #[test]
    fn item_normalises_with_string_counts() {
        let item: VideoItem = serde_json::from_value(json!({
            "snippet": {
                "title": "Moon landing footage",
                "description": "Archive reel #apollo",
                "channelTitle": "Archive Channel",
                "publishedAt": "2024-05-01T12:00:00Z",
                "thumbnails": { "high": { "url": "https://i.ytimg.example/hq.jpg" } }
            },
            "statistics": { "viewCount": "1234", "likeCount": "56" }
        }))
        .unwrap();

        let rec = to_record(item, "dQw4w9WgXcQ", "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(rec.title, "Moon landing footage");
        assert_eq!(rec.author, "Archive Channel");
        assert_eq!(rec.engagement.views, 1234);
        assert_eq!(rec.engagement.comments, 0);
        assert_eq!(rec.hashtags, vec!["apollo"]);
        assert_eq!(rec.media.len(), 1);
        assert!(rec.created_at.is_some());
    }
}
