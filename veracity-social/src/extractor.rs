//! Routing layer turning an arbitrary URL into a [`ContentRecord`].

use async_trait::async_trait;
use veracity_http::HttpError;

use crate::detect::detect_platform;
use crate::instagram::InstagramApi;
use crate::record::{ContentRecord, Platform};
use crate::tiktok::TikTokApi;
use crate::youtube::YouTubeApi;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid {platform} url: {url}")]
    InvalidUrl { platform: &'static str, url: String },

    #[error("content not found or private: {0}")]
    NotFound(String),

    #[error("platform rate limit exceeded")]
    RateLimited,

    #[error("no extractor configured for {0}")]
    NotConfigured(&'static str),

    #[error("platform request failed: {0}")]
    Upstream(HttpError),
}

impl From<HttpError> for ExtractError {
    fn from(e: HttpError) -> Self {
        match e.status_code() {
            Some(404) => ExtractError::NotFound("resource missing upstream".into()),
            Some(429) => ExtractError::RateLimited,
            _ => ExtractError::Upstream(e),
        }
    }
}

/// A collaborator that resolves one URL into a normalized record.
#[async_trait]
pub trait PlatformExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ContentRecord, ExtractError>;
}

/// Default extractor: routes by [`detect_platform`], delegating to whichever
/// platform clients were configured. Direct media links and plain web URLs
/// become stub records without any network call.
#[derive(Default)]
pub struct UrlExtractor {
    tiktok: Option<TikTokApi>,
    youtube: Option<YouTubeApi>,
    instagram: Option<InstagramApi>,
}

impl UrlExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tiktok(mut self, api: TikTokApi) -> Self {
        self.tiktok = Some(api);
        self
    }

    pub fn with_youtube(mut self, api: YouTubeApi) -> Self {
        self.youtube = Some(api);
        self
    }

    pub fn with_instagram(mut self, api: InstagramApi) -> Self {
        self.instagram = Some(api);
        self
    }
}

#[async_trait]
impl PlatformExtractor for UrlExtractor {
    async fn extract(&self, url: &str) -> Result<ContentRecord, ExtractError> {
        let platform = detect_platform(url);
        tracing::debug!(%url, platform = platform.key(), "social.extract.start");

        match platform {
            Platform::Tiktok => {
                let api = self
                    .tiktok
                    .as_ref()
                    .ok_or(ExtractError::NotConfigured("tiktok"))?;
                api.extract_video(url).await
            }
            Platform::Youtube => {
                let api = self
                    .youtube
                    .as_ref()
                    .ok_or(ExtractError::NotConfigured("youtube"))?;
                api.extract_video(url).await
            }
            Platform::Instagram => {
                let api = self
                    .instagram
                    .as_ref()
                    .ok_or(ExtractError::NotConfigured("instagram"))?;
                api.extract_post(url).await
            }
            Platform::Image | Platform::Video | Platform::Web | Platform::Unknown => {
                Ok(ContentRecord::stub(platform, url))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn direct_image_urls_become_stubs_without_clients() {
        let extractor = UrlExtractor::new();
        let rec = extractor
            .extract("https://cdn.example.com/evidence.png")
            .await
            .unwrap();
        assert_eq!(rec.platform, Platform::Image);
        assert_eq!(rec.media.len(), 1);
    }

    #[tokio::test]
    async fn social_urls_require_a_configured_client() {
        let extractor = UrlExtractor::new();
        let err = extractor
            .extract("https://www.tiktok.com/@x/video/123")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotConfigured("tiktok")));
    }
}
