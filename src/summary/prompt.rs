//! Prompt builder for the summarization call.
//!
//! Pure and deterministic: the same `SummaryRequest` always yields the
//! same prompt string. Segment order is fixed; the user-concern line, the
//! "Action Plan" task item, and the output-format template are the only
//! conditional parts, all keyed off the same concern-presence discriminant.

use std::fmt::Write as _;

use crate::domain::officials::OfficialsDirectory;
use crate::domain::SummaryRequest;

/// The two output-format schema variants shown to the model. Modeled as
/// named variants rather than string concatenation so the instructions
/// and the schema example cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTemplate {
    Standard,
    ActionPlan,
}

impl OutputTemplate {
    pub fn for_request(request: &SummaryRequest) -> Self {
        if request.has_concern() {
            Self::ActionPlan
        } else {
            Self::Standard
        }
    }

    pub fn schema(&self) -> &'static str {
        match self {
            Self::Standard => STANDARD_SCHEMA,
            Self::ActionPlan => ACTION_PLAN_SCHEMA,
        }
    }
}

const STANDARD_SCHEMA: &str = r#"{
  "government": {
    "overview": "A 2-3 sentence overview of what government is focusing on",
    "keyInitiatives": ["Initiative 1", "Initiative 2", "Initiative 3"],
    "priorityAreas": ["Area 1", "Area 2"]
  },
  "citizens": {
    "overview": "A 2-3 sentence overview of citizen concerns",
    "topConcerns": ["Concern 1", "Concern 2", "Concern 3"],
    "sentiment": "positive" | "neutral" | "concerned" | "critical"
  },
  "insights": "Optional: 1-2 sentences connecting government actions to citizen concerns"
}"#;

const ACTION_PLAN_SCHEMA: &str = r#"{
  "government": {
    "overview": "A 2-3 sentence overview of what government is focusing on",
    "keyInitiatives": ["Initiative 1", "Initiative 2", "Initiative 3"],
    "priorityAreas": ["Area 1", "Area 2"]
  },
  "citizens": {
    "overview": "A 2-3 sentence overview of citizen concerns",
    "topConcerns": ["Concern 1", "Concern 2", "Concern 3"],
    "sentiment": "positive" | "neutral" | "concerned" | "critical"
  },
  "insights": "1-2 sentences connecting government actions to citizen concerns",
  "actionPlan": {
    "overview": "Why this action matters",
    "contacts": [
      {
        "name": "[Official Name or Placeholder]",
        "title": "State Senator",
        "phone": "xxx-xxx-xxxx (optional)",
        "email": "email@example.gov (optional)",
        "officeHours": "Mon-Fri 9am-5pm (optional)",
        "website": "https://example.gov (optional)"
      }
    ],
    "callScript": "Hi, my name is [Your Name] and I'm a constituent from [City]. I'm calling about...",
    "emailTemplate": "Subject: [Clear subject line]\n\nDear [Title] [Name],\n\n[Body paragraphs]\n\nSincerely,\n[Your Name]",
    "tips": ["Tip 1", "Tip 2", "Tip 3"],
    "nextSteps": ["Action 1", "Action 2"]
  }
}"#;

/// Build the summarization prompt. Total over well-typed input; zero
/// actions or issues render as explicit placeholders so the model is not
/// asked to invent data.
pub fn build_prompt(request: &SummaryRequest, officials: &OfficialsDirectory) -> String {
    let location = request.geo.location_line();
    let concern = request
        .user_message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let gov_actions: Vec<_> = request
        .sections
        .iter()
        .flat_map(|s| &s.government_actions)
        .collect();
    let citizen_issues: Vec<_> = request
        .sections
        .iter()
        .flat_map(|s| &s.citizen_issues)
        .collect();

    let gov_actions_text = if gov_actions.is_empty() {
        "No recent government actions.".to_string()
    } else {
        gov_actions
            .iter()
            .map(|action| {
                format!(
                    "- {}\n  Date: {}\n  Summary: {}\n  Tags: {}",
                    action.title.as_deref().unwrap_or("Untitled"),
                    action.date.as_deref().unwrap_or(""),
                    action.summary.as_deref().unwrap_or(""),
                    action.tags.join(", "),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let citizen_issues_text = if citizen_issues.is_empty() {
        "No recent citizen issues reported.".to_string()
    } else {
        citizen_issues
            .iter()
            .map(|issue| {
                format!(
                    "- {} (Score: {}, Category: {})",
                    issue.title,
                    issue.score,
                    issue.primary_category.label(),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let top_categories_text = match &request.top_categories {
        Some(tcs) if !tcs.is_empty() => tcs
            .iter()
            .map(|tc| format!("{} ({} items)", tc.label.label(), tc.count))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "Not available".to_string(),
    };

    let mut prompt = format!(
        "You are an intermediary between local government and citizens, helping people \
         understand what's happening in their community and take effective action.\n\n\
         Your task is to analyze government actions and citizen concerns for {location}, \
         then create clear, accessible summaries.\n\n\
         # Context\n\n\
         **Location:** {location}\n\n\
         **Top Categories:** {top_categories_text}"
    );

    if let Some(concern) = concern {
        let _ = write!(prompt, "\n\n**User's Concern:** \"{concern}\"");
    }

    let _ = write!(
        prompt,
        "\n\n**Government Actions ({} total):**\n{}\n\n\
         **Citizen Issues ({} total):**\n{}\n\n\
         # Officials Reference\n\n{}",
        gov_actions.len(),
        gov_actions_text,
        citizen_issues.len(),
        citizen_issues_text,
        officials.reference_block(),
    );

    let _ = write!(
        prompt,
        "\n# Your Task\n\n\
         Create summaries and guidance:\n\n\
         1. **Government Summary**: What is the local government working on?\n   \
         - Keep it factual and informative\n   \
         - Highlight key initiatives (2-4 main points)\n   \
         - Identify priority areas\n\n\
         2. **Citizen Summary**: What are citizens concerned about?\n   \
         - What issues keep coming up?\n   \
         - Overall sentiment (positive, neutral, concerned, or critical)\n   \
         - Highlight top concerns (2-4 main points)\n\n\
         3. **Insights**: Connections between government actions and citizen concerns"
    );

    if concern.is_some() {
        let _ = write!(
            prompt,
            "\n\n4. **Action Plan**: Based on the user's concern and the data, create an actionable plan:\n   \
             - **Overview**: Why taking action on this issue matters (1-2 sentences)\n   \
             - **Contacts**: Select 1-3 RELEVANT officials from the reference list above based on the issue type:\n     \
             * Local issues (potholes, local crime, parks) -> City Council Member or Mayor\n     \
             * County issues (health, larger infrastructure) -> County Supervisor\n     \
             * State/federal issues (state laws, major policy) -> State Senator or Governor\n     \
             Use the EXACT names, titles, phone numbers, and emails from the officials list above.\n   \
             - **Call Script**: A short, effective phone script template (3-4 sentences)\n   \
             - **Email Template**: A professional email template they can customize (subject line + 2-3 paragraph body)\n   \
             - **Tips**: 3-4 best practices for effective communication with officials\n   \
             - **Next Steps**: 2-3 additional actions they can take (attend meetings, join groups, etc.)"
        );
    }

    let template = OutputTemplate::for_request(request);
    let _ = write!(
        prompt,
        "\n\n# Output Format\n\n\
         Return ONLY a valid JSON object with this structure (no markdown, no code blocks, just pure JSON):\n{}\n\n\
         # Guidelines\n\n\
         - Be concise but informative\n\
         - Use accessible language (avoid jargon)\n\
         - Focus on the city-level data provided\n\
         - If data is limited, say so honestly\n\
         - Maintain a neutral, helpful tone",
        template.schema(),
    );

    if concern.is_some() {
        prompt.push_str(
            "\n- Make action plans specific and realistic\n\
             - Ensure call scripts and emails are professional yet personal\n\
             - Contact info can use placeholders if specific officials aren't identifiable",
        );
    }
    prompt.push_str("\n- Return ONLY the JSON object, nothing else");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Category, CitizenIssue, Geography, GovernmentAction, Section, TopCategory,
    };

    fn la_geo() -> Geography {
        Geography {
            city: Some("Los Angeles".to_string()),
            county: None,
            state_name: None,
        }
    }

    fn pothole_section() -> Section {
        Section {
            category: Category::RoadSafety,
            government_actions: vec![GovernmentAction {
                id: "1".to_string(),
                title: Some("Pothole repair plan".to_string()),
                summary: Some("Citywide repaving schedule".to_string()),
                date: Some("2024-01-01".to_string()),
                tags: vec!["infrastructure".to_string()],
                url: None,
                source_type: Some("agenda".to_string()),
            }],
            citizen_issues: vec![],
        }
    }

    fn request(message: Option<&str>) -> SummaryRequest {
        SummaryRequest {
            geo: la_geo(),
            sections: vec![pothole_section()],
            top_categories: Some(vec![TopCategory {
                label: Category::RoadSafety,
                count: 12,
            }]),
            user_message: message.map(String::from),
        }
    }

    #[test]
    fn concern_selects_action_plan_template() {
        let req = request(Some("potholes on Main St"));
        assert_eq!(OutputTemplate::for_request(&req), OutputTemplate::ActionPlan);

        let prompt = build_prompt(&req, &OfficialsDirectory::default());
        assert!(prompt.contains("potholes on Main St"));
        assert!(prompt.contains("\"actionPlan\""));
        assert!(prompt.contains("4. **Action Plan**"));
    }

    #[test]
    fn no_concern_selects_standard_template() {
        let req = request(None);
        assert_eq!(OutputTemplate::for_request(&req), OutputTemplate::Standard);

        let prompt = build_prompt(&req, &OfficialsDirectory::default());
        assert!(!prompt.contains("\"actionPlan\""));
        assert!(!prompt.contains("4. **Action Plan**"));
        assert!(!prompt.contains("**User's Concern:**"));
    }

    #[test]
    fn whitespace_concern_counts_as_absent() {
        let req = request(Some("   "));
        let prompt = build_prompt(&req, &OfficialsDirectory::default());
        assert!(!prompt.contains("\"actionPlan\""));
    }

    #[test]
    fn empty_lists_render_placeholders() {
        let req = SummaryRequest {
            geo: la_geo(),
            sections: vec![Section {
                category: Category::Housing,
                government_actions: vec![],
                citizen_issues: vec![],
            }],
            top_categories: None,
            user_message: None,
        };
        let prompt = build_prompt(&req, &OfficialsDirectory::default());
        assert!(prompt.contains("No recent government actions."));
        assert!(prompt.contains("No recent citizen issues reported."));
        assert!(prompt.contains("**Top Categories:** Not available"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let req = request(Some("potholes on Main St"));
        let dir = OfficialsDirectory::default();
        assert_eq!(build_prompt(&req, &dir), build_prompt(&req, &dir));
    }

    #[test]
    fn actions_and_issues_flatten_across_sections() {
        let mut req = request(None);
        req.sections.push(Section {
            category: Category::Housing,
            government_actions: vec![],
            citizen_issues: vec![CitizenIssue {
                id: "i1".to_string(),
                title: "Rent spikes downtown".to_string(),
                score: 42.0,
                created_at: "2024-02-02T00:00:00Z".to_string(),
                primary_category: Category::Housing,
            }],
        });
        let prompt = build_prompt(&req, &OfficialsDirectory::default());
        assert!(prompt.contains("**Government Actions (1 total):**"));
        assert!(prompt.contains("**Citizen Issues (1 total):**"));
        assert!(prompt.contains("- Rent spikes downtown (Score: 42, Category: Housing)"));
        assert!(prompt.contains("- Pothole repair plan"));
    }

    #[test]
    fn untitled_action_renders_placeholder_title() {
        let mut req = request(None);
        req.sections[0].government_actions[0].title = None;
        let prompt = build_prompt(&req, &OfficialsDirectory::default());
        assert!(prompt.contains("- Untitled\n"));
    }

    #[test]
    fn empty_geography_renders_empty_location() {
        let mut req = request(None);
        req.geo = Geography::default();
        let prompt = build_prompt(&req, &OfficialsDirectory::default());
        assert!(prompt.contains("**Location:** \n"));
    }
}
