//! Platform extractors used by the Veracity pipeline.
//!
//! Each supported platform (TikTok, YouTube, Instagram) gets a small API
//! client that turns a post/video URL into a normalized [`record::ContentRecord`].
//! The [`extractor::UrlExtractor`] routes an arbitrary URL to the right
//! client, or synthesises a stub record for direct image/video/web links.

pub mod detect;
pub mod extractor;
pub mod instagram;
pub mod record;
pub mod tiktok;
pub mod youtube;

pub use detect::detect_platform;
pub use extractor::{ExtractError, PlatformExtractor, UrlExtractor};
pub use record::{ContentRecord, Engagement, MediaKind, MediaRef, Platform};
