//! Prompt assembly for the verification API.
//!
//! Pure string building: no network, no clocks, no randomness. The same
//! inputs always produce the same composed query, which keeps the pipeline
//! replayable and the tests exact.

use veracity_common::{Result, VeracityError};
use veracity_social::detect::{looks_like_image, looks_like_video};
use veracity_social::record::{ContentRecord, MediaKind};

use crate::types::{CheckRequest, ComposedQuery, MediaSlot, MetaMedia, QueryMetadata, UploadedFile};

/// How many trailing conversation turns are folded into the context block.
const HISTORY_WINDOW: usize = 3;

const TOOL_DIRECTIVE: &str = "\
- Video Deepfake Detection -> scan videos for deepfakes\n\
- Synthetic Image Detection -> detect AI-generated images\n\
- Image Forgery and Localization -> locate manipulated image regions\n\
- Synthetic Speech Detection -> detect synthetic voices in the audio\n\
- Web Search -> check the claims against the web\n";

/// Full media-verification prompt for an extracted platform record. Embeds
/// the downloadable media URLs directly and instructs the upstream to run
/// its forensic tools on them.
pub fn video_prompt(record: &ContentRecord) -> ComposedQuery {
    let platform = record.platform.display_name();
    let mut query = format!("Analyze this {platform} content and verify its authenticity:\n\n");

    if !record.title.is_empty() {
        query.push_str(&format!("TITLE: {}\n", record.title));
    }
    if let Some(video) = record.video_url() {
        query.push_str(&format!("VIDEO TO ANALYZE: {video}\n"));
    }
    for (i, image) in record.image_urls().enumerate() {
        query.push_str(&format!("IMAGE {} TO ANALYZE: {image}\n", i + 1));
    }

    query.push_str("\nIMPORTANT: run the forensic tools directly on the media listed above:\n");
    query.push_str(TOOL_DIRECTIVE);

    query.push_str(&format!(
        "\nCONTEXT:\nPlatform: {platform}\nAuthor: @{}\nDescription: {}\nHashtags: {}\n",
        record.author,
        record.description,
        record.hashtags.join(", "),
    ));

    query.push_str(&format!(
        "\nMETRICS:\n- {} views\n- {} likes\n- {} comments\n",
        format_count(record.engagement.views),
        format_count(record.engagement.likes),
        format_count(record.engagement.comments),
    ));
    if record.engagement.shares > 0 {
        query.push_str(&format!("- {} shares\n", format_count(record.engagement.shares)));
    }

    query.push_str(
        "\nREQUIRED ANALYSIS:\n\
         1. Run the tools on the media URLs above\n\
         2. Check video and image authenticity (deepfake, manipulation)\n\
         3. Verify the factual claims made in the content\n\
         4. Detect disinformation\n\
         5. Assess overall credibility\n\
         \nAnswer with one verdict: VERIFIED, MOSTLY_TRUE, MIXED, MOSTLY_FALSE, or FALSE\n\
         and explain your reasoning with the tool evidence.",
    );

    ComposedQuery {
        query,
        metadata: QueryMetadata {
            source: record.platform.key().to_string(),
            content_id: Some(record.content_id.clone()),
            author: some_nonempty(&record.author),
            url: None,
            media_urls: record
                .media
                .iter()
                .map(|m| MetaMedia {
                    kind: match m.kind {
                        MediaKind::Video => MediaSlot::Video,
                        MediaKind::Image => MediaSlot::Image,
                    },
                    url: m.url.clone(),
                })
                .collect(),
        },
    }
}

/// Text-context prompt for a platform record, used on the chat path. The
/// upstream refuses raw platform media URLs there, so only the textual
/// metadata is sent and the task list is scoped to claims.
pub fn platform_context_prompt(record: &ContentRecord) -> ComposedQuery {
    let query = format!(
        "Analyze this {} content and verify the factual claims:\n\n\
         TITLE: {}\n\
         DESCRIPTION: {}\n\
         AUTHOR: @{}\n\
         HASHTAGS: {}\n\
         \nPOPULARITY:\n- {} views\n- {} likes\n- {} comments\n\
         \nTASK:\n\
         1. Check whether the claims in the title and description are true or false\n\
         2. Look for reliable sources covering the topic\n\
         3. Detect potential disinformation in the text\n\
         4. Assess the author's credibility where possible\n\
         \nNote: visual analysis of the video is not available at the moment.",
        record.platform.display_name(),
        or_placeholder(&record.title, "No title"),
        or_placeholder(&record.description, "No description"),
        or_placeholder(&record.author, "Unknown"),
        or_placeholder(&record.hashtags.join(", "), "None"),
        format_count(record.engagement.views),
        format_count(record.engagement.likes),
        format_count(record.engagement.comments),
    );

    ComposedQuery {
        query,
        metadata: QueryMetadata {
            source: record.platform.key().to_string(),
            content_id: Some(record.content_id.clone()),
            author: some_nonempty(&record.author),
            url: Some(record.source_url.clone()),
            media_urls: Vec::new(),
        },
    }
}

/// Generic chat prompt: context window, then the new message, then optional
/// media and upload sections.
pub fn chat_prompt(req: &CheckRequest) -> Result<ComposedQuery> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(VeracityError::InvalidInput(
            "message is required and must be a non-empty string".to_string(),
        ));
    }

    let mut query = if req.history.is_empty() {
        message.to_string()
    } else {
        let window_start = req.history.len().saturating_sub(HISTORY_WINDOW);
        let context = req.history[window_start..]
            .iter()
            .map(|turn| format!("{}: {}", turn.sender.label(), turn.content))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Conversation context:\n{context}\n\nNew question: {message}")
    };

    if !req.media_urls.is_empty() {
        let videos: Vec<&String> = req.media_urls.iter().filter(|u| looks_like_video(u)).collect();
        let images: Vec<&String> = req
            .media_urls
            .iter()
            .filter(|u| !looks_like_video(u) && looks_like_image(u))
            .collect();
        let others: Vec<&String> = req
            .media_urls
            .iter()
            .filter(|u| !looks_like_video(u) && !looks_like_image(u))
            .collect();

        query.push_str("\n\n");
        for (i, u) in videos.iter().enumerate() {
            query.push_str(&format!("VIDEO {} TO ANALYZE: {u}\n", i + 1));
        }
        for (i, u) in images.iter().enumerate() {
            query.push_str(&format!("IMAGE {} TO ANALYZE: {u}\n", i + 1));
        }
        for (i, u) in others.iter().enumerate() {
            query.push_str(&format!("LINK {} TO CHECK: {u}\n", i + 1));
        }

        query.push_str("\nIMPORTANT: run the forensic tools on these media items:\n");
        query.push_str(TOOL_DIRECTIVE);
        query.push_str(
            "\nREQUIRED ANALYSIS:\n\
             1. Analyze each media item with the appropriate tool\n\
             2. Check authenticity (deepfake, manipulation, AI generation)\n\
             3. Verify the factual claims in the content\n\
             4. Detect potential disinformation\n\
             5. Provide reliable sources for the checks\n\
             \nAnswer with a clear verdict and the tool evidence.",
        );
    }

    if let Some(image) = &req.image_file {
        query.push_str(&format!(
            "\n\nUploaded image: {} ({:.2} KB)",
            image.filename,
            kib(image)
        ));
        query.push_str(LOCAL_FILE_CAVEAT);
    }
    if let Some(video) = &req.video_file {
        query.push_str(&format!(
            "\n\nUploaded video: {} ({:.2} MB)",
            video.filename,
            kib(video) / 1024.0
        ));
        query.push_str(LOCAL_FILE_CAVEAT);
    }

    Ok(ComposedQuery {
        query,
        metadata: QueryMetadata {
            source: "web_chat".to_string(),
            content_id: None,
            author: None,
            url: None,
            media_urls: req
                .media_urls
                .iter()
                .map(|u| MetaMedia {
                    kind: if looks_like_video(u) {
                        MediaSlot::Video
                    } else if looks_like_image(u) {
                        MediaSlot::Image
                    } else {
                        MediaSlot::Url
                    },
                    url: u.clone(),
                })
                .collect(),
        },
    })
}

const LOCAL_FILE_CAVEAT: &str =
    "\nNote: analyzing local files requires a public URL. Ask the user to share a link.";

fn kib(file: &UploadedFile) -> f64 {
    file.size_bytes as f64 / 1024.0
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

fn some_nonempty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Render a count with grouped digits: 1234567 -> "1,234,567".
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConversationTurn, Sender};
    use veracity_social::record::{Engagement, Platform};

    fn record() -> ContentRecord {
        let mut rec = ContentRecord::stub(Platform::Tiktok, "https://www.tiktok.com/@sky/video/9");
        rec.content_id = "9".into();
        rec.author = "skywatcher".into();
        rec.title = "Comet hits the moon".into();
        rec.description = "Comet hits the moon #space".into();
        rec.hashtags = vec!["space".into()];
        rec.engagement = Engagement {
            views: 1_234_567,
            likes: 890,
            comments: 12,
            shares: 3,
        };
        rec
    }

    #[test]
    fn bare_message_with_no_history_is_passed_through() {
        let req = CheckRequest {
            message: "Is this true?".into(),
            ..Default::default()
        };
        let composed = chat_prompt(&req).unwrap();
        assert_eq!(composed.query, "Is this true?");
        assert_eq!(composed.metadata.source, "web_chat");
        assert!(composed.metadata.media_urls.is_empty());
    }

    #[test]
    fn empty_message_is_rejected() {
        let req = CheckRequest {
            message: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            chat_prompt(&req),
            Err(VeracityError::InvalidInput(_))
        ));
    }

    #[test]
    fn context_block_keeps_only_the_last_three_turns() {
        let turn = |sender: Sender, content: &str| ConversationTurn {
            sender,
            content: content.into(),
            timestamp: None,
        };
        let req = CheckRequest {
            message: "And the second clip?".into(),
            history: vec![
                turn(Sender::User, "first"),
                turn(Sender::Assistant, "second"),
                turn(Sender::User, "third"),
                turn(Sender::Other("moderator".into()), "fourth"),
            ],
            ..Default::default()
        };
        let composed = chat_prompt(&req).unwrap();
        assert!(!composed.query.contains("User: first"));
        assert!(composed.query.contains("Assistant: second"));
        assert!(composed.query.contains("moderator: fourth"));
        assert!(composed.query.ends_with("New question: And the second clip?"));
    }

    #[test]
    fn media_urls_are_partitioned_under_labeled_headings() {
        let req = CheckRequest {
            message: "Check these".into(),
            media_urls: vec![
                "https://youtu.be/dQw4w9WgXcQ".into(),
                "https://cdn.example.com/still.png".into(),
                "https://example.com/report".into(),
            ],
            ..Default::default()
        };
        let composed = chat_prompt(&req).unwrap();
        assert!(composed.query.contains("VIDEO 1 TO ANALYZE: https://youtu.be/dQw4w9WgXcQ"));
        assert!(composed.query.contains("IMAGE 1 TO ANALYZE: https://cdn.example.com/still.png"));
        assert!(composed.query.contains("LINK 1 TO CHECK: https://example.com/report"));
        assert!(composed.query.contains("Video Deepfake Detection"));
        assert!(composed.query.contains("Web Search"));

        let kinds: Vec<MediaSlot> = composed.metadata.media_urls.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MediaSlot::Video, MediaSlot::Image, MediaSlot::Url]);
    }

    #[test]
    fn uploads_append_size_notes_and_caveat() {
        let req = CheckRequest {
            message: "What about this file?".into(),
            image_file: Some(UploadedFile {
                filename: "evidence.png".into(),
                size_bytes: 2048,
            }),
            video_file: Some(UploadedFile {
                filename: "clip.mp4".into(),
                size_bytes: 3 * 1024 * 1024,
            }),
            ..Default::default()
        };
        let composed = chat_prompt(&req).unwrap();
        assert!(composed.query.contains("Uploaded image: evidence.png (2.00 KB)"));
        assert!(composed.query.contains("Uploaded video: clip.mp4 (3.00 MB)"));
        assert!(composed.query.contains("requires a public URL"));
    }

    #[test]
    fn platform_context_prompt_embeds_record_fields() {
        let composed = platform_context_prompt(&record());
        assert!(composed.query.starts_with("Analyze this TikTok content"));
        assert!(composed.query.contains("TITLE: Comet hits the moon"));
        assert!(composed.query.contains("AUTHOR: @skywatcher"));
        assert!(composed.query.contains("HASHTAGS: space"));
        assert!(composed.query.contains("- 1,234,567 views"));
        assert!(composed.query.contains("visual analysis of the video is not available"));
        assert_eq!(composed.metadata.source, "tiktok");
        assert_eq!(composed.metadata.content_id.as_deref(), Some("9"));
        assert_eq!(
            composed.metadata.url.as_deref(),
            Some("https://www.tiktok.com/@sky/video/9")
        );
    }

    #[test]
    fn video_prompt_lists_media_and_share_count() {
        let mut rec = record();
        rec.media = vec![
            veracity_social::record::MediaRef {
                kind: MediaKind::Video,
                url: "https://cdn.tiktok.example/v.mp4".into(),
            },
            veracity_social::record::MediaRef {
                kind: MediaKind::Image,
                url: "https://cdn.tiktok.example/cover.jpg".into(),
            },
        ];
        let composed = video_prompt(&rec);
        assert!(composed.query.contains("VIDEO TO ANALYZE: https://cdn.tiktok.example/v.mp4"));
        assert!(composed.query.contains("IMAGE 1 TO ANALYZE: https://cdn.tiktok.example/cover.jpg"));
        assert!(composed.query.contains("- 3 shares"));
        assert!(composed.query.contains("VERIFIED, MOSTLY_TRUE, MIXED, MOSTLY_FALSE, or FALSE"));
        assert_eq!(composed.metadata.media_urls.len(), 2);
    }

    #[test]
    fn composition_is_deterministic() {
        let req = CheckRequest {
            message: "Is this real?".into(),
            media_urls: vec!["https://example.com/a.png".into()],
            ..Default::default()
        };
        assert_eq!(chat_prompt(&req).unwrap().query, chat_prompt(&req).unwrap().query);
    }

    #[test]
    fn counts_group_digits() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
