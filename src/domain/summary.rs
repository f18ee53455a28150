//! AI summary types matching the JSON schema the generative model is
//! instructed to emit. Keys are camelCase on the wire because the output
//! format templates show camelCase keys to the model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::civic::{Geography, Section, TopCategory};

/// Sole input to the prompt builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub geo: Geography,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_categories: Option<Vec<TopCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

impl SummaryRequest {
    /// Concern presence drives the action-plan prompt segment and the
    /// output template selection.
    pub fn has_concern(&self) -> bool {
        self.user_message
            .as_deref()
            .map_or(false, |m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Concerned,
    Critical,
}

/// Nested fields all carry serde defaults: the model's output drifts,
/// and a drifting summary beats no summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernmentSummary {
    #[serde(default)]
    pub overview: String,
    #[serde(rename = "keyInitiatives", default)]
    pub key_initiatives: Vec<String>,
    #[serde(rename = "priorityAreas", default)]
    pub priority_areas: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizensSummary {
    #[serde(default)]
    pub overview: String,
    #[serde(rename = "topConcerns", default)]
    pub top_concerns: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
}

/// A single official the resident can reach out to. Drawn from the
/// officials reference set, never invented wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "officeHours", default, skip_serializing_if = "Option::is_none")]
    pub office_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// The contact/script/tips bundle generated only when a free-text
/// concern was supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPlan {
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub contacts: Vec<ContactInfo>,
    #[serde(rename = "callScript", default)]
    pub call_script: String,
    #[serde(rename = "emailTemplate", default)]
    pub email_template: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(rename = "nextSteps", default)]
    pub next_steps: Vec<String>,
}

/// Validated summary. `generated_at` is stamped by the validator, never
/// taken from the model's own output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSummary {
    pub government: GovernmentSummary,
    pub citizens: CitizensSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
    #[serde(rename = "actionPlan", default, skip_serializing_if = "Option::is_none")]
    pub action_plan: Option<ActionPlan>,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_concern_ignores_whitespace() {
        let mut req = SummaryRequest {
            geo: Geography::default(),
            sections: vec![],
            top_categories: None,
            user_message: Some("   ".to_string()),
        };
        assert!(!req.has_concern());
        req.user_message = Some("potholes on Main St".to_string());
        assert!(req.has_concern());
    }

    #[test]
    fn sentiment_round_trips_lowercase() {
        let s: Sentiment = serde_json::from_str("\"concerned\"").unwrap();
        assert_eq!(s, Sentiment::Concerned);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"concerned\"");
    }

    #[test]
    fn summary_serializes_camel_case_keys() {
        let summary = AiSummary {
            government: GovernmentSummary {
                overview: "o".into(),
                key_initiatives: vec!["a".into()],
                priority_areas: vec![],
            },
            citizens: CitizensSummary {
                overview: "o".into(),
                top_concerns: vec![],
                sentiment: Sentiment::Neutral,
            },
            insights: None,
            action_plan: None,
            generated_at: Utc::now(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["government"]["keyInitiatives"].is_array());
        assert!(json["generatedAt"].is_string());
        assert!(json.get("actionPlan").is_none());
    }
}
