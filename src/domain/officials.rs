//! Officials reference dataset, grouped by jurisdiction level.
//!
//! The directory is injected configuration, not logic: the prompt builder
//! renders it verbatim so the model selects contacts from real data
//! instead of inventing them. A deployment can swap the dataset via the
//! `OFFICIALS_FILE` setting; the built-in default covers Los Angeles.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionLevel {
    Local,
    County,
    State,
}

impl JurisdictionLevel {
    fn heading(&self) -> &'static str {
        match self {
            JurisdictionLevel::Local => "City Officials",
            JurisdictionLevel::County => "County Officials",
            JurisdictionLevel::State => "State Officials",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Official {
    pub name: String,
    pub title: String,
    pub level: JurisdictionLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficialsDirectory {
    pub officials: Vec<Official>,
}

impl OfficialsDirectory {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read officials file {:?}", path.as_ref()))?;
        let dir: Self =
            serde_json::from_str(&raw).context("Failed to parse officials file as JSON")?;
        Ok(dir)
    }

    /// Renders the reference block embedded in every prompt, officials
    /// grouped by jurisdiction level.
    pub fn reference_block(&self) -> String {
        let mut out = String::new();
        for level in [
            JurisdictionLevel::Local,
            JurisdictionLevel::County,
            JurisdictionLevel::State,
        ] {
            let group: Vec<&Official> =
                self.officials.iter().filter(|o| o.level == level).collect();
            if group.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "**{}:**", level.heading());
            for official in group {
                let _ = writeln!(out, "- {}, {}", official.name, official.title);
                if let Some(phone) = &official.phone {
                    let _ = writeln!(out, "  Phone: {phone}");
                }
                if let Some(email) = &official.email {
                    let _ = writeln!(out, "  Email: {email}");
                }
            }
        }
        out
    }
}

impl Default for OfficialsDirectory {
    /// Los Angeles dataset carried over from the first deployment.
    fn default() -> Self {
        let official = |name: &str, title: &str, level, phone: &str, email: &str| Official {
            name: name.to_string(),
            title: title.to_string(),
            level,
            phone: Some(phone.to_string()),
            email: Some(email.to_string()),
        };
        use JurisdictionLevel::{County, Local, State};

        Self {
            officials: vec![
                official(
                    "Karen Bass",
                    "Mayor of Los Angeles",
                    Local,
                    "(213) 978-0600",
                    "mayor.helpline@lacity.org",
                ),
                official(
                    "Hydee Feldstein Soto",
                    "Los Angeles City Attorney",
                    Local,
                    "(213) 978-8100",
                    "ethics.commission@lacity.org",
                ),
                official(
                    "Paul Krekorian",
                    "City Council President (District 2)",
                    Local,
                    "(818) 755-7676",
                    "councilmember.krekorian@lacity.org",
                ),
                official(
                    "Bob Blumenfield",
                    "City Councilmember (District 3)",
                    Local,
                    "(818) 774-4330",
                    "councilmember.blumenfield@lacity.org",
                ),
                official(
                    "Nithya Raman",
                    "City Councilmember (District 4)",
                    Local,
                    "(323) 957-6415",
                    "councilmember.raman@lacity.org",
                ),
                official(
                    "Lindsey Horvath",
                    "LA County Supervisor (District 3)",
                    County,
                    "(213) 974-3333",
                    "ThirdDistrict@bos.lacounty.gov",
                ),
                official(
                    "Hilda Solis",
                    "LA County Supervisor (District 1)",
                    County,
                    "(213) 974-4111",
                    "HildaSolis@bos.lacounty.gov",
                ),
                official(
                    "Alex Padilla",
                    "U.S. Senator for California",
                    State,
                    "(310) 231-4494",
                    "https://www.padilla.senate.gov/contact/",
                ),
                official(
                    "Laphonza Butler",
                    "U.S. Senator for California",
                    State,
                    "(202) 224-3553",
                    "https://www.butler.senate.gov/contact/",
                ),
                official(
                    "Gavin Newsom",
                    "Governor of California",
                    State,
                    "(916) 445-2841",
                    "https://www.gov.ca.gov/contact/",
                ),
            ],
        }
    }
}
