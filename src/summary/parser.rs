//! Validator/parser for the generative model's raw text output.
//!
//! The model is instructed to return pure JSON but does not always
//! comply, so a fenced code block wrapper is stripped before parsing.
//! Validation is deliberately shallow: only the two required top-level
//! sections are checked, nested schema drift is tolerated and passed
//! through. Stricter validation here is a behavior change requiring
//! sign-off.

use chrono::Utc;
use thiserror::Error;

use crate::domain::AiSummary;

/// Longest raw-text snippet carried in an `InvalidSyntax` failure.
const MAX_SNIPPET_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("response is not valid JSON: {snippet}")]
    InvalidSyntax { snippet: String },
    #[error("response is missing the `{section}` section")]
    MissingRequiredSection { section: &'static str },
}

/// Parse raw model output into an `AiSummary`, stamping `generated_at`
/// with the current time. The model has no reliable clock, so its own
/// timestamps are never trusted.
pub fn parse_summary(raw: &str) -> Result<AiSummary, ParseFailure> {
    let text = strip_code_fence(raw.trim());

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| ParseFailure::InvalidSyntax {
            snippet: bounded_snippet(text),
        })?;

    for section in ["government", "citizens"] {
        if value.get(section).map_or(true, |v| v.is_null()) {
            return Err(ParseFailure::MissingRequiredSection { section });
        }
    }

    // Inject the server-side timestamp before typed deserialization so
    // `generated_at` is always present and always ours.
    let mut value = value;
    value["generatedAt"] = serde_json::json!(Utc::now());

    serde_json::from_value(value).map_err(|_| ParseFailure::InvalidSyntax {
        snippet: bounded_snippet(text),
    })
}

/// Strips a surrounding Markdown code fence, with or without a language
/// tag on the opening marker. The tag is dropped whether or not a
/// newline follows it.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_start();
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn bounded_snippet(text: &str) -> String {
    if text.chars().count() <= MAX_SNIPPET_LEN {
        text.to_string()
    } else {
        text.chars().take(MAX_SNIPPET_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sentiment;

    const MINIMAL: &str = r#"{
        "government": {
            "overview": "Focused on road repair.",
            "keyInitiatives": ["Repaving", "Signal upgrades"],
            "priorityAreas": ["Infrastructure"]
        },
        "citizens": {
            "overview": "Frustrated with potholes.",
            "topConcerns": ["Potholes", "Traffic"],
            "sentiment": "concerned"
        }
    }"#;

    #[test]
    fn parses_plain_json() {
        let summary = parse_summary(MINIMAL).unwrap();
        assert_eq!(summary.citizens.sentiment, Sentiment::Concerned);
        assert_eq!(summary.government.key_initiatives.len(), 2);
        assert!(summary.action_plan.is_none());
    }

    #[test]
    fn strips_fence_with_language_tag() {
        let fenced = format!("```json\n{MINIMAL}\n```");
        let summary = parse_summary(&fenced).unwrap();
        assert_eq!(summary.government.overview, "Focused on road repair.");
    }

    #[test]
    fn strips_fence_without_language_tag() {
        let fenced = format!("```\n{MINIMAL}\n```");
        assert!(parse_summary(&fenced).is_ok());
    }

    #[test]
    fn strips_fence_with_tag_but_no_newline() {
        let fenced = format!("```json{MINIMAL}```");
        let summary = parse_summary(&fenced).unwrap();
        assert_eq!(summary.government.overview, "Focused on road repair.");
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let fenced = format!("  ```json\n{MINIMAL}\n```  ");
        let a = parse_summary(MINIMAL).unwrap();
        let b = parse_summary(&fenced).unwrap();
        assert_eq!(
            serde_json::to_value(&a.government).unwrap(),
            serde_json::to_value(&b.government).unwrap()
        );
    }

    #[test]
    fn missing_citizens_section_is_rejected() {
        let raw = r#"{"government": {"overview": "x", "keyInitiatives": [], "priorityAreas": []}}"#;
        match parse_summary(raw) {
            Err(ParseFailure::MissingRequiredSection { section }) => {
                assert_eq!(section, "citizens")
            }
            other => panic!("expected MissingRequiredSection, got {other:?}"),
        }
    }

    #[test]
    fn missing_government_section_is_rejected() {
        let raw = r#"{"citizens": {"overview": "x", "topConcerns": [], "sentiment": "neutral"}}"#;
        assert!(matches!(
            parse_summary(raw),
            Err(ParseFailure::MissingRequiredSection {
                section: "government"
            })
        ));
    }

    #[test]
    fn syntax_error_carries_bounded_snippet() {
        let garbage = "not json at all ".repeat(50);
        match parse_summary(&garbage) {
            Err(ParseFailure::InvalidSyntax { snippet }) => {
                assert_eq!(snippet.chars().count(), 200);
            }
            other => panic!("expected InvalidSyntax, got {other:?}"),
        }
    }

    #[test]
    fn timestamp_comes_from_the_validator() {
        // A generatedAt in the payload is overwritten, never trusted
        let raw = MINIMAL.replacen(
            "\"government\"",
            "\"generatedAt\": \"1999-01-01T00:00:00Z\", \"government\"",
            1,
        );
        let summary = parse_summary(&raw).unwrap();
        assert!(summary.generated_at.timestamp() > 1_000_000_000);
    }

    #[test]
    fn nested_schema_drift_is_tolerated() {
        // Unknown extra fields and a missing optional insights field
        let raw = r#"{
            "government": {"overview": "x", "keyInitiatives": [], "priorityAreas": [], "extra": 1},
            "citizens": {"overview": "y", "topConcerns": [], "sentiment": "positive"},
            "unknownTop": {"a": true}
        }"#;
        let summary = parse_summary(raw).unwrap();
        assert!(summary.insights.is_none());
    }

    #[test]
    fn missing_sentiment_defaults_to_neutral() {
        let raw = r#"{
            "government": {"overview": "x", "keyInitiatives": [], "priorityAreas": []},
            "citizens": {"overview": "y", "topConcerns": ["Potholes"]}
        }"#;
        let summary = parse_summary(raw).unwrap();
        assert_eq!(summary.citizens.sentiment, Sentiment::Neutral);
        assert_eq!(summary.citizens.top_concerns, vec!["Potholes"]);
    }

    #[test]
    fn missing_nested_overviews_are_tolerated() {
        let raw = r#"{
            "government": {"keyInitiatives": ["Repaving"]},
            "citizens": {"sentiment": "concerned"}
        }"#;
        let summary = parse_summary(raw).unwrap();
        assert_eq!(summary.government.overview, "");
        assert_eq!(summary.citizens.overview, "");
        assert_eq!(summary.citizens.sentiment, Sentiment::Concerned);
    }

    #[test]
    fn sparse_action_plan_is_tolerated() {
        let raw = r#"{
            "government": {"overview": "x"},
            "citizens": {"overview": "y"},
            "actionPlan": {"tips": ["Be brief"]}
        }"#;
        let plan = parse_summary(raw).unwrap().action_plan.unwrap();
        assert_eq!(plan.tips, vec!["Be brief"]);
        assert!(plan.call_script.is_empty());
        assert!(plan.contacts.is_empty());
    }

    #[test]
    fn action_plan_parses_when_present() {
        let raw = r#"{
            "government": {"overview": "x", "keyInitiatives": [], "priorityAreas": []},
            "citizens": {"overview": "y", "topConcerns": [], "sentiment": "critical"},
            "actionPlan": {
                "overview": "It matters",
                "contacts": [{"name": "Karen Bass", "title": "Mayor of Los Angeles", "phone": "(213) 978-0600"}],
                "callScript": "Hi, my name is...",
                "emailTemplate": "Subject: ...",
                "tips": ["Be brief", "Be specific", "Follow up"],
                "nextSteps": ["Attend a council meeting", "Join a neighborhood group"]
            }
        }"#;
        let plan = parse_summary(raw).unwrap().action_plan.unwrap();
        assert_eq!(plan.contacts.len(), 1);
        assert_eq!(plan.contacts[0].name, "Karen Bass");
        assert_eq!(plan.tips.len(), 3);
    }
}
