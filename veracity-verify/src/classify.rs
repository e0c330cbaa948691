//! Lexical classification of the free-text verification response.
//!
//! The classifier is an ordered, mutually exclusive cascade: rules are
//! evaluated top to bottom on a case-folded copy of the text and the first
//! match wins, even when a later rule would also match. The ordering is
//! load-bearing; reordering rules changes verdicts for mixed-signal texts.
//!
//! The named-tool scan is independent of the cascade and may add several
//! entries regardless of which rule fired.

use crate::types::{Flag, FlagKind, Verdict};

/// Outcome of running the cascade over one response text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub score: u8,
    pub summary: String,
    pub flags: Vec<Flag>,
}

struct Rule {
    predicate: fn(&str) -> bool,
    verdict: Verdict,
    score: u8,
    summary: &'static str,
    flag: Option<(FlagKind, &'static str)>,
}

/// Evaluation order matters: earlier rules are either higher-priority
/// signals (inability to analyze trumps everything) or guarded supersets of
/// later ones (positive confirmation before authenticity).
const RULES: &[Rule] = &[
    Rule {
        predicate: cannot_analyze,
        verdict: Verdict::Mixed,
        score: 0,
        summary: "Media analysis is not available for this content",
        flag: Some((FlagKind::Warning, "media analysis unavailable")),
    },
    Rule {
        predicate: partial_response,
        verdict: Verdict::Mixed,
        score: 50,
        summary: "Analysis incomplete - try again in a moment",
        flag: Some((FlagKind::Warning, "partial response received")),
    },
    Rule {
        predicate: ai_generated,
        verdict: Verdict::MostlyFalse,
        score: 35,
        summary: "AI-generated content detected",
        flag: Some((FlagKind::Warning, "AI content detected")),
    },
    Rule {
        predicate: positive_confirmation,
        verdict: Verdict::Verified,
        score: 85,
        summary: "Content confirmed as accurate",
        flag: None,
    },
    Rule {
        predicate: strong_negation,
        verdict: Verdict::False,
        score: 25,
        summary: "Content identified as false or disinformation",
        flag: Some((FlagKind::Danger, "disinformation detected")),
    },
    Rule {
        predicate: misleading,
        verdict: Verdict::MostlyFalse,
        score: 40,
        summary: "Content is potentially misleading or manipulated",
        flag: Some((FlagKind::Warning, "potentially misleading content")),
    },
    Rule {
        predicate: authenticity,
        verdict: Verdict::Verified,
        score: 85,
        summary: "Content verified as authentic",
        flag: None,
    },
    Rule {
        predicate: probably_true,
        verdict: Verdict::MostlyTrue,
        score: 65,
        summary: "Content is probably true",
        flag: None,
    },
    Rule {
        predicate: narrative,
        verdict: Verdict::Mixed,
        score: 50,
        summary: "Narrative or entertainment content, not factual",
        flag: None,
    },
];

const DEFAULT_SCORE: u8 = 70;

/// Run the cascade. Never fails: empty or keyword-free text degrades to the
/// inconclusive default.
pub fn classify(raw: &str) -> Classification {
    let lower = raw.to_lowercase();

    for rule in RULES {
        if (rule.predicate)(&lower) {
            return Classification {
                verdict: rule.verdict,
                score: rule.score,
                summary: rule.summary.to_string(),
                flags: rule
                    .flag
                    .map(|(kind, message)| {
                        vec![Flag {
                            kind,
                            message: message.to_string(),
                        }]
                    })
                    .unwrap_or_default(),
            };
        }
    }

    Classification {
        verdict: Verdict::Mixed,
        score: DEFAULT_SCORE,
        summary: "Analysis inconclusive".to_string(),
        flags: Vec::new(),
    }
}

/// Collect the forensic-tool categories the response claims to have used.
/// Each category appears at most once, in a fixed order.
pub fn detect_tools(raw: &str) -> Vec<String> {
    const TOOL_MARKERS: &[(&str, &[&str])] = &[
        ("Deepfake detection", &["deepfake"]),
        ("AI content detection", &["synthetic", "synthétique"]),
        ("Forensic analysis", &["forgery", "manipulation"]),
        ("Audio analysis", &["speech", "voice"]),
    ];

    let lower = raw.to_lowercase();
    TOOL_MARKERS
        .iter()
        .filter(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(name, _)| name.to_string())
        .collect()
}

fn cannot_analyze(t: &str) -> bool {
    t.contains("not able to analyze") || t.contains("cannot analyze") || t.contains("unable to")
}

// Streaming upstreams sometimes flush a preamble before the real analysis;
// a short reply that only promises work is treated as truncated.
fn partial_response(t: &str) -> bool {
    t.contains("please wait")
        || t.contains("one moment")
        || (t.len() < 200 && (t.contains("i will") || t.contains("i'll")))
}

fn ai_generated(t: &str) -> bool {
    t.contains("generated by ai")
        || t.contains("ai-generated")
        || t.contains("synthetic detected")
        || t.contains("artificial content")
}

fn positive_confirmation(t: &str) -> bool {
    let positive = t.contains("confirms")
        || contains_word(t, "accurate")
        || contains_word(t, "correct")
        || contains_word(t, "true");
    let negated = t.contains("does not confirm") || t.contains("not confirmed");
    positive && !negated
}

fn strong_negation(t: &str) -> bool {
    contains_word(t, "false") || t.contains("disinformation") || contains_word(t, "lie")
}

fn misleading(t: &str) -> bool {
    t.contains("misleading") || t.contains("manipulated")
}

fn authenticity(t: &str) -> bool {
    contains_word(t, "verified") || t.contains("authentic")
}

fn probably_true(t: &str) -> bool {
    contains_word(t, "likely") || t.contains("probably true")
}

fn narrative(t: &str) -> bool {
    contains_word(t, "story")
        || contains_word(t, "tale")
        || contains_word(t, "fable")
        || contains_word(t, "fiction")
}

/// Substring match constrained to word boundaries, so that "untrue" does not
/// count as "true" nor "believe" as "lie".
fn contains_word(haystack: &str, word: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let abs = start + pos;
        let end = abs + word.len();
        let boundary_before = haystack[..abs]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let boundary_after = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if boundary_before && boundary_after {
            return true;
        }
        start = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inability_outranks_every_other_signal() {
        let text = "I am unable to analyze this video, although it was verified and accurate.";
        let c = classify(text);
        assert_eq!(c.verdict, Verdict::Mixed);
        assert_eq!(c.score, 0);
        assert_eq!(c.flags.len(), 1);
        assert_eq!(c.flags[0].kind, FlagKind::Warning);
        assert_eq!(c.flags[0].message, "media analysis unavailable");
    }

    #[test]
    fn negated_confirmation_falls_through() {
        // A positive keyword is present, but the negated form blocks rule 4.
        let c = classify("The quote is correct, yet the record does not confirm the event.");
        assert_eq!(c.verdict, Verdict::Mixed);
        assert_eq!(c.score, 70);

        let c = classify("An accurate count was promised but not confirmed by officials.");
        assert_eq!(c.score, 70);
    }

    #[test]
    fn disinformation_yields_false_with_danger_flag() {
        let c = classify("This claim is false and is disinformation");
        assert_eq!(c.verdict, Verdict::False);
        assert_eq!(c.score, 25);
        assert_eq!(
            c.flags,
            vec![Flag {
                kind: FlagKind::Danger,
                message: "disinformation detected".to_string(),
            }]
        );
    }

    #[test]
    fn authenticity_phrase_yields_verified() {
        let c = classify("According to Reuters, the video is authentic (https://reuters.com/article/123)");
        assert_eq!(c.verdict, Verdict::Verified);
        assert_eq!(c.score, 85);
        assert!(c.flags.is_empty());
    }

    #[test]
    fn ai_generation_phrases_yield_mostly_false() {
        let c = classify("Forensics show the clip was generated by AI.");
        assert_eq!(c.verdict, Verdict::MostlyFalse);
        assert_eq!(c.score, 35);
        assert_eq!(c.flags[0].message, "AI content detected");
    }

    #[test]
    fn short_promissory_reply_counts_as_partial() {
        let c = classify("One moment, please wait while the tools run.");
        assert_eq!(c.score, 50);
        assert_eq!(c.flags[0].message, "partial response received");

        let c = classify("I will analyze the footage now.");
        assert_eq!(c.verdict, Verdict::Mixed);
        assert_eq!(c.score, 50);
    }

    #[test]
    fn a_long_reply_with_a_promise_is_not_partial() {
        let filler = "Evidence review follows. ".repeat(10);
        let c = classify(&format!("{filler}I will also note the footage is authentic."));
        assert_eq!(c.verdict, Verdict::Verified);
    }

    #[test]
    fn probable_and_narrative_tiers() {
        assert_eq!(classify("It is likely the event happened.").score, 65);
        let c = classify("This is an old folk tale, retold for clicks.");
        assert_eq!(c.verdict, Verdict::Mixed);
        assert_eq!(c.score, 50);
    }

    #[test]
    fn empty_and_keyword_free_text_degrade_to_default() {
        for text in ["", "some unrelated rambling with no signal words"] {
            let c = classify(text);
            assert_eq!(c.verdict, Verdict::Mixed);
            assert_eq!(c.score, 70);
            assert_eq!(c.summary, "Analysis inconclusive");
            assert!(c.flags.is_empty());
        }
    }

    #[test]
    fn word_boundaries_guard_short_keywords() {
        // "untrue" must not trip the confirmation rule, "believe" not the lie rule.
        assert_eq!(classify("Witnesses believe the account is untrue.").score, 70);
        assert_eq!(classify("That statement is a lie.").verdict, Verdict::False);
        assert_eq!(classify("The figures are accurate.").verdict, Verdict::Verified);
    }

    #[test]
    fn tool_scan_is_independent_and_deduplicated() {
        let tools = detect_tools(
            "Deepfake analysis ran twice (deepfake score 0.1); synthetic voice checks also ran.",
        );
        assert_eq!(
            tools,
            vec![
                "Deepfake detection".to_string(),
                "AI content detection".to_string(),
                "Audio analysis".to_string(),
            ]
        );
        assert!(detect_tools("nothing relevant here").is_empty());
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "According to the lab, the image shows manipulation artifacts.";
        assert_eq!(classify(text), classify(text));
    }
}
