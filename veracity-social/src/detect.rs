//! URL classification heuristics.
//!
//! Two levels of matching live here: [`detect_platform`] decides which
//! extractor (if any) owns a URL, while [`looks_like_video`] /
//! [`looks_like_image`] are the looser partition used when rendering a
//! media section into a composed query.

use crate::record::Platform;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".webm"];

/// Map a URL to the platform that should handle it.
pub fn detect_platform(url: &str) -> Platform {
    let lower = url.to_lowercase();
    if lower.contains("tiktok.com") {
        Platform::Tiktok
    } else if lower.contains("youtube.com") || lower.contains("youtu.be") {
        Platform::Youtube
    } else if lower.contains("instagram.com") {
        Platform::Instagram
    } else if has_extension(&lower, IMAGE_EXTENSIONS) {
        Platform::Image
    } else if has_extension(&lower, VIDEO_EXTENSIONS) {
        Platform::Video
    } else {
        Platform::Web
    }
}

/// Loose check used to group prompt media: platform hosts and common video
/// container suffixes all count.
pub fn looks_like_video(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com")
        || lower.contains("youtu.be")
        || lower.contains("tiktok.com")
        || lower.contains("instagram.com")
        || lower.contains(".mp4")
        || lower.contains(".mov")
        || lower.contains(".avi")
}

/// Loose check used to group prompt media by image suffix.
pub fn looks_like_image(url: &str) -> bool {
    let lower = url.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

fn has_extension(lower_url: &str, extensions: &[&str]) -> bool {
    // Ignore query string and fragment before looking at the suffix.
    let path = lower_url.split(['?', '#']).next().unwrap_or(lower_url);
    extensions.iter().any(|ext| path.ends_with(ext))
}
