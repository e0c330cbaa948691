//! Instagram extraction via a RapidAPI post-info gateway.

use serde::Deserialize;
use time::OffsetDateTime;
use veracity_http::{HttpClient, HttpError, RequestOpts};

use crate::extractor::ExtractError;
use crate::record::{ContentRecord, Engagement, MediaKind, MediaRef, Platform, extract_hashtags};
use crate::tiktok::{rapidapi_auth, rapidapi_host_header};

const DEFAULT_API_HOST: &str = "instagram-best-experience.p.rapidapi.com";

#[derive(Clone)]
pub struct InstagramApi {
    http: HttpClient,
    api_key: String,
    api_host: String,
}

impl InstagramApi {
    pub fn new(api_key: String, api_host: Option<String>) -> Result<Self, HttpError> {
        let api_host = api_host.unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let http = HttpClient::new(&format!("https://{api_host}/"))?;
        Ok(Self {
            http,
            api_key,
            api_host,
        })
    }

    pub async fn extract_post(&self, url: &str) -> Result<ContentRecord, ExtractError> {
        let shortcode = shortcode_from_url(url).ok_or_else(|| ExtractError::InvalidUrl {
            platform: "instagram",
            url: url.to_string(),
        })?;

        let post: PostInfo = self
            .http
            .get_json(
                "post",
                RequestOpts {
                    auth: rapidapi_auth(&self.api_key)?,
                    headers: Some(rapidapi_host_header(&self.api_host)?),
                    query: Some(vec![("shortcode", shortcode.clone().into())]),
                    ..Default::default()
                },
            )
            .await?;

        Ok(to_record(post, &shortcode, url))
    }
}

fn to_record(post: PostInfo, shortcode: &str, url: &str) -> ContentRecord {
    let caption = post.caption.and_then(|c| c.text).unwrap_or_default();
    let author = post
        .user
        .as_ref()
        .and_then(|u| u.username.clone())
        .unwrap_or_default();

    let mut media = Vec::new();
    if let Some(video) = post
        .video_versions
        .into_iter()
        .flatten()
        .next()
        .map(|v| v.url)
    {
        media.push(MediaRef {
            kind: MediaKind::Video,
            url: video,
        });
    }
    // Carousel posts carry one image per slide; single posts fall back to
    // the primary image candidates.
    let carousel: Vec<String> = post
        .carousel_media
        .into_iter()
        .flatten()
        .filter_map(|m| m.image_versions2.and_then(first_candidate))
        .collect();
    if carousel.is_empty() {
        if let Some(primary) = post.image_versions2.and_then(first_candidate) {
            media.push(MediaRef {
                kind: MediaKind::Image,
                url: primary,
            });
        }
    } else {
        media.extend(carousel.into_iter().map(|url| MediaRef {
            kind: MediaKind::Image,
            url,
        }));
    }

    ContentRecord {
        platform: Platform::Instagram,
        content_id: post
            .pk
            .or(post.id)
            .unwrap_or_else(|| shortcode.to_string()),
        source_url: url.to_string(),
        author,
        title: String::new(),
        hashtags: extract_hashtags(&caption),
        description: caption,
        media,
        engagement: Engagement {
            views: post
                .video_view_count
                .or(post.view_count)
                .or(post.play_count)
                .unwrap_or(0),
            likes: post.like_count.unwrap_or(0),
            comments: post.comment_count.unwrap_or(0),
            shares: 0,
        },
        created_at: post
            .taken_at
            .and_then(|t| OffsetDateTime::from_unix_timestamp(t).ok()),
    }
}

fn first_candidate(versions: ImageVersions) -> Option<String> {
    versions.candidates.into_iter().next().map(|c| c.url)
}

/// Post, reel, and IGTV URL forms all carry the shortcode as a path segment.
fn shortcode_from_url(url: &str) -> Option<String> {
    for marker in ["instagram.com/p/", "instagram.com/reel/", "instagram.com/tv/"] {
        if let Some(pos) = url.find(marker) {
            let code: String = url[pos + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect();
            if !code.is_empty() {
                return Some(code);
            }
        }
    }
    None
}

#[derive(Debug, Default, Deserialize)]
struct PostInfo {
    #[serde(default)]
    pk: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    user: Option<PostUser>,
    #[serde(default)]
    caption: Option<Caption>,
    #[serde(default)]
    image_versions2: Option<ImageVersions>,
    #[serde(default)]
    video_versions: Option<Vec<VideoVersion>>,
    #[serde(default)]
    carousel_media: Option<Vec<CarouselItem>>,
    #[serde(default)]
    like_count: Option<u64>,
    #[serde(default)]
    comment_count: Option<u64>,
    #[serde(default)]
    video_view_count: Option<u64>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    play_count: Option<u64>,
    #[serde(default)]
    taken_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct PostUser {
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Caption {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageVersions {
    #[serde(default)]
    candidates: Vec<ImageCandidate>,
}

#[derive(Debug, Deserialize)]
struct ImageCandidate {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideoVersion {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct CarouselItem {
    #[serde(default)]
    image_versions2: Option<ImageVersions>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shortcode_parsed_from_post_and_reel_urls() {
        assert_eq!(
            shortcode_from_url("https://www.instagram.com/p/Cx1_aB-cdEf/"),
            Some("Cx1_aB-cdEf".to_string())
        );
        assert_eq!(
            shortcode_from_url("https://instagram.com/reel/abc123/"),
            Some("abc123".to_string())
        );
        assert_eq!(shortcode_from_url("https://instagram.com/someuser"), None);
    }

    #[test]
    fn carousel_posts_yield_one_image_per_slide() {
        let post: PostInfo = serde_json::from_value(json!({
            "pk": "42",
            "user": { "username": "traveller" },
            "caption": { "text": "sunset thread #nofilter" },
            "carousel_media": [
                { "image_versions2": { "candidates": [ { "url": "https://ig.example/1.jpg" } ] } },
                { "image_versions2": { "candidates": [ { "url": "https://ig.example/2.jpg" } ] } }
            ],
            "like_count": 7,
            "comment_count": 3,
            "taken_at": 1700000000
        }))
        .unwrap();

        let rec = to_record(post, "abc", "https://instagram.com/p/abc/");
        assert_eq!(rec.content_id, "42");
        assert_eq!(rec.author, "traveller");
        assert_eq!(rec.image_urls().count(), 2);
        assert_eq!(rec.hashtags, vec!["nofilter"]);
        assert_eq!(rec.engagement.likes, 7);
    }
}
