//! Citation mining and confidence scoring over the raw response text.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::types::SourceRef;

/// Hard cap on the number of sources attached to one result.
pub const MAX_SOURCES: usize = 5;

fn attribution_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Outlet is everything up to the first comma; the URL is the first
    // url-shaped token on the same line after it, parentheses stripped.
    RE.get_or_init(|| {
        Regex::new(r"[Aa]ccording to ([^,]+),.*?\(?(https?://[^\s)]+)")
            .expect("attribution pattern")
    })
}

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s)]+").expect("url pattern"))
}

/// Mine cited evidence out of the response, in discovery order.
///
/// Attribution clauses ("According to <outlet>, ... (<url>)") are preferred;
/// only when none match does the scan fall back to bare URLs, labelled by
/// their capitalised domain. The output is capped at [`MAX_SOURCES`] and the
/// function is pure, so re-running it always yields the same list.
pub fn extract_sources(text: &str) -> Vec<SourceRef> {
    let mut sources: Vec<SourceRef> = attribution_pattern()
        .captures_iter(text)
        .map(|caps| {
            let outlet = caps[1].trim().to_string();
            SourceRef {
                title: outlet.clone(),
                url: caps[2].trim().to_string(),
                outlet,
            }
        })
        .collect();

    if sources.is_empty() {
        sources = url_pattern()
            .find_iter(text)
            .map(|m| {
                let label = domain_label(m.as_str());
                SourceRef {
                    title: label.clone(),
                    url: m.as_str().to_string(),
                    outlet: label,
                }
            })
            .collect();
    }

    sources.truncate(MAX_SOURCES);
    sources
}

/// Shape-based confidence for the final result: base 50, plus 10 for each of
/// some sources / many sources / a substantial reply / evidentiary wording,
/// clamped at 95.
pub fn confidence_score(text: &str, source_count: usize) -> u8 {
    const EVIDENTIARY_MARKERS: &[&str] = &["according to", "source", "study"];

    let mut confidence = 50u8;
    if source_count > 0 {
        confidence += 10;
    }
    if source_count > 2 {
        confidence += 10;
    }
    if text.len() > 200 {
        confidence += 10;
    }
    let lower = text.to_lowercase();
    if EVIDENTIARY_MARKERS.iter().any(|m| lower.contains(m)) {
        confidence += 10;
    }
    confidence.min(95)
}

/// `https://www.reuters.com/article/x` -> `Reuters`; unparsable input
/// degrades to the literal label `Source`.
fn domain_label(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| {
            u.host_str()
                .map(|h| h.trim_start_matches("www.").to_string())
        })
        .and_then(|host| host.split('.').next().map(str::to_string))
        .map(capitalize)
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| "Source".to_string())
}

fn capitalize(s: String) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribution_clause_yields_outlet_and_url() {
        let text = "According to Reuters, the video is authentic (https://reuters.com/article/123)";
        let sources = extract_sources(text);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "Reuters");
        assert_eq!(sources[0].outlet, "Reuters");
        assert_eq!(sources[0].url, "https://reuters.com/article/123");
    }

    #[test]
    fn multiple_attributions_keep_discovery_order() {
        let text = "According to AP, it happened (https://apnews.com/a).\n\
                    According to BBC News, it was filmed in 2019 (https://bbc.co.uk/b).";
        let sources = extract_sources(text);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].outlet, "AP");
        assert_eq!(sources[1].outlet, "BBC News");
    }

    #[test]
    fn bare_urls_are_used_only_when_no_attribution_matches() {
        let text = "See https://www.reuters.com/fact-check/1 and https://apnews.com/2 for details.";
        let sources = extract_sources(text);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Reuters");
        assert_eq!(sources[1].title, "Apnews");
    }

    #[test]
    fn source_list_is_capped_at_five() {
        let text = (0..8)
            .map(|i| format!("https://outlet{i}.com/story "))
            .collect::<String>();
        let sources = extract_sources(&text);
        assert_eq!(sources.len(), MAX_SOURCES);
        assert_eq!(sources[0].title, "Outlet0");
        assert_eq!(sources[4].title, "Outlet4");
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "According to Le Monde, the photo is real (https://lemonde.fr/x)";
        assert_eq!(extract_sources(text), extract_sources(text));
    }

    #[test]
    fn empty_text_yields_no_sources() {
        assert!(extract_sources("").is_empty());
    }

    #[test]
    fn confidence_is_monotonic_in_sources_and_length() {
        let short = "ok";
        let long = "x".repeat(201);
        assert!(confidence_score(short, 0) <= confidence_score(short, 1));
        assert!(confidence_score(short, 1) <= confidence_score(short, 3));
        assert!(confidence_score(short, 3) <= confidence_score(&long, 3));
        assert_eq!(confidence_score(short, 0), 50);
    }

    #[test]
    fn confidence_counts_evidentiary_wording_and_clamps() {
        let loaded = format!("According to a peer-reviewed study, {}", "y".repeat(250));
        assert_eq!(confidence_score(&loaded, 3), 90);
        assert!(confidence_score(&loaded, 100) <= 95);
    }
}
