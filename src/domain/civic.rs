//! Civic data types matching the discovery service's JSON schema.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum length of a free-text concern, enforced before any network call.
pub const MAX_MESSAGE_LEN: usize = 500;

/// Closed enumeration of civic data categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FoodAccess,
    RoadSafety,
    Crime,
    Housing,
    Zoning,
    Transport,
    Budget,
    Health,
}

impl Category {
    /// Human-readable label used in prompts and UI payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodAccess => "Food Access",
            Category::RoadSafety => "Road Safety",
            Category::Crime => "Crime",
            Category::Housing => "Housing",
            Category::Zoning => "Zoning",
            Category::Transport => "Transport",
            Category::Budget => "Budget",
            Category::Health => "Health",
        }
    }
}

/// The city/county/state identifying a query's locality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_name: Option<String>,
}

impl Geography {
    /// True when no field carries a non-blank value. An empty geography
    /// never reaches a network call.
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// Comma-joined location line, empty string when all fields are absent.
    pub fn location_line(&self) -> String {
        self.fields().collect::<Vec<_>>().join(", ")
    }

    fn fields(&self) -> impl Iterator<Item = &str> {
        [&self.city, &self.county, &self.state_name]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Per-category result limits for a discovery request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLimits {
    pub per_category: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self { per_category: 5 }
    }
}

/// Request payload for the civic-data discovery service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CivicDataQuery {
    pub geo: Geography,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default)]
    pub limits: QueryLimits,
}

impl CivicDataQuery {
    /// Local validation, applied before any network call is issued.
    pub fn validate(&self) -> Result<(), QueryValidationError> {
        if self.geo.is_empty() {
            return Err(QueryValidationError::EmptyGeography);
        }
        if let Some(msg) = &self.message {
            if msg.chars().count() > MAX_MESSAGE_LEN {
                return Err(QueryValidationError::MessageTooLong {
                    len: msg.chars().count(),
                });
            }
        }
        if self.limits.per_category == 0 {
            return Err(QueryValidationError::InvalidLimit);
        }
        Ok(())
    }

    /// Location-only mode: no category filter and no concern supplied.
    pub fn is_location_only(&self) -> bool {
        self.message.as_deref().map_or(true, |m| m.trim().is_empty())
            && self.categories.as_deref().map_or(true, |c| c.is_empty())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryValidationError {
    #[error("at least one geography field is required")]
    EmptyGeography,
    #[error("message exceeds {} characters (got {len})", MAX_MESSAGE_LEN)]
    MessageTooLong { len: usize },
    #[error("per-category limit must be a positive integer")]
    InvalidLimit,
}

/// A single government action as reported by the discovery service.
/// Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernmentAction {
    pub id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub url: Option<String>,
    pub source_type: Option<String>,
}

/// A citizen-reported issue. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizenIssue {
    pub id: String,
    pub title: String,
    pub score: f64,
    pub created_at: String,
    pub primary_category: Category,
}

/// One category's worth of government actions and citizen issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub category: Category,
    #[serde(default)]
    pub government_actions: Vec<GovernmentAction>,
    #[serde(default)]
    pub citizen_issues: Vec<CitizenIssue>,
}

impl Section {
    pub fn item_count(&self) -> usize {
        self.government_actions.len() + self.citizen_issues.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCategory {
    pub label: Category,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationItem {
    pub label: Category,
    pub score: f64,
}

/// Provider-side quick scoring of a free-text concern against the
/// category enumeration. Passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastClassification {
    pub primary_category: Category,
    pub categories: Vec<ClassificationItem>,
    pub confidence: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub entities: HashMap<String, Vec<String>>,
}

/// Response from the civic-data discovery service. The core treats the
/// sections as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CivicDataResult {
    pub geo: Geography,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_categories: Option<Vec<TopCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_classification: Option<FastClassification>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl CivicDataResult {
    /// True when at least one section carries at least one item.
    pub fn has_items(&self) -> bool {
        self.sections.iter().any(|s| s.item_count() > 0)
    }
}
