//! TikTok extraction via a RapidAPI video-details gateway.

use serde::Deserialize;
use time::OffsetDateTime;
use veracity_http::{Auth, HeaderMap, HeaderName, HeaderValue, HttpClient, HttpError, RequestOpts};

use crate::extractor::ExtractError;
use crate::record::{ContentRecord, Engagement, MediaKind, MediaRef, Platform, extract_hashtags};

const DEFAULT_API_HOST: &str = "tiktok-video-no-watermark2.p.rapidapi.com";

#[derive(Clone)]
pub struct TikTokApi {
    http: HttpClient,
    api_key: String,
    api_host: String,
}

impl TikTokApi {
    pub fn new(api_key: String, api_host: Option<String>) -> Result<Self, HttpError> {
        let api_host = api_host.unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let http = HttpClient::new(&format!("https://{api_host}/"))?;
        Ok(Self {
            http,
            api_key,
            api_host,
        })
    }

    pub async fn extract_video(&self, url: &str) -> Result<ContentRecord, ExtractError> {
        let video_id = video_id_from_url(url).ok_or_else(|| ExtractError::InvalidUrl {
            platform: "tiktok",
            url: url.to_string(),
        })?;

        let resp: DetailsResponse = self
            .http
            .get_json(
                "video/details",
                RequestOpts {
                    auth: rapidapi_auth(&self.api_key)?,
                    headers: Some(rapidapi_host_header(&self.api_host)?),
                    query: Some(vec![("video_id", video_id.clone().into())]),
                    ..Default::default()
                },
            )
            .await?;

        let details = resp
            .details
            .ok_or_else(|| ExtractError::NotFound(format!("tiktok video {video_id}")))?;
        Ok(to_record(details, &video_id, url))
    }
}

pub(crate) fn rapidapi_auth(api_key: &str) -> Result<Auth<'static>, ExtractError> {
    Ok(Auth::Header {
        name: HeaderName::from_static("x-rapidapi-key"),
        value: HeaderValue::from_str(api_key)
            .map_err(|e| ExtractError::Upstream(HttpError::Build(e.to_string())))?,
    })
}

pub(crate) fn rapidapi_host_header(api_host: &str) -> Result<HeaderMap, ExtractError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-rapidapi-host"),
        HeaderValue::from_str(api_host)
            .map_err(|e| ExtractError::Upstream(HttpError::Build(e.to_string())))?,
    );
    Ok(headers)
}

fn to_record(details: VideoDetails, video_id: &str, url: &str) -> ContentRecord {
    let stats = details.statistics.unwrap_or_default();
    let description = details.description.unwrap_or_default();
    let author = details
        .author
        .and_then(|a| a.unique_id.or(a.author_name))
        .unwrap_or_default();

    let mut media = Vec::new();
    if let Some(video) = details
        .unwatermarked_download_url
        .or(details.download_url)
        .filter(|u| !u.is_empty())
    {
        media.push(MediaRef {
            kind: MediaKind::Video,
            url: video,
        });
    }
    if let Some(cover) = details.cover.filter(|u| !u.is_empty()) {
        media.push(MediaRef {
            kind: MediaKind::Image,
            url: cover,
        });
    }

    ContentRecord {
        platform: Platform::Tiktok,
        content_id: details.video_id.unwrap_or_else(|| video_id.to_string()),
        source_url: url.to_string(),
        author,
        // TikTok has no separate title; the caption plays both roles.
        title: description.clone(),
        hashtags: extract_hashtags(&description),
        description,
        media,
        engagement: Engagement {
            views: stats.number_of_plays.unwrap_or(0),
            likes: stats.number_of_hearts.unwrap_or(0),
            comments: stats.number_of_comments.unwrap_or(0),
            shares: stats.number_of_reposts.unwrap_or(0),
        },
        created_at: details
            .create_time
            .and_then(|t| t.parse::<i64>().ok())
            .and_then(|t| OffsetDateTime::from_unix_timestamp(t).ok()),
    }
}

/// Accepts canonical `/@user/video/<id>` links plus short `/v/<id>` forms.
fn video_id_from_url(url: &str) -> Option<String> {
    for marker in ["/video/", "/v/"] {
        if let Some(pos) = url.find(marker) {
            let digits: String = url[pos + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if !digits.is_empty() {
                return Some(digits);
            }
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    details: Option<VideoDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoDetails {
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    unwatermarked_download_url: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    create_time: Option<String>,
    #[serde(default)]
    statistics: Option<VideoStatistics>,
    #[serde(default)]
    author: Option<AuthorInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoStatistics {
    #[serde(default)]
    number_of_hearts: Option<u64>,
    #[serde(default)]
    number_of_comments: Option<u64>,
    #[serde(default)]
    number_of_reposts: Option<u64>,
    #[serde(default)]
    number_of_plays: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorInfo {
    #[serde(default, rename = "uniqueId")]
    unique_id: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_id_parsed_from_canonical_url() {
        assert_eq!(
            video_id_from_url("https://www.tiktok.com/@user/video/7234567890123456789"),
            Some("7234567890123456789".to_string())
        );
        assert_eq!(video_id_from_url("https://www.tiktok.com/@user"), None);
    }

    #[test]
    fn details_normalise_to_a_record() {
        let details: VideoDetails = serde_json::from_value(json!({
            "video_id": "123",
            "description": "storm footage #weather #breaking",
            "cover": "https://cdn.tiktok.example/cover.jpg",
            "download_url": "https://cdn.tiktok.example/video.mp4",
            "create_time": "1700000000",
            "statistics": {
                "number_of_hearts": 10,
                "number_of_comments": 2,
                "number_of_plays": 500,
                "number_of_reposts": 1
            },
            "author": { "uniqueId": "stormchaser" }
        }))
        .unwrap();

        let rec = to_record(details, "123", "https://www.tiktok.com/@stormchaser/video/123");
        assert_eq!(rec.platform, Platform::Tiktok);
        assert_eq!(rec.author, "stormchaser");
        assert_eq!(rec.hashtags, vec!["weather", "breaking"]);
        assert_eq!(rec.engagement.views, 500);
        assert_eq!(rec.video_url(), Some("https://cdn.tiktok.example/video.mp4"));
        assert!(rec.created_at.is_some());
    }
}
