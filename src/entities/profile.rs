//! Developer profile record and its nested collections
//!
//! A profile is the unit the service stores: identity (name, email),
//! a set-like list of skills, and the ordered sub-collections a developer
//! fills in over time (education, projects, work history, external links).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::identity::ProfileId;

/// A developer profile as exchanged with the profile service
///
/// Draft profiles under construction have no `id`; the service assigns one
/// on creation and it never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    /// Free-text summary shown on cards and detail views
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// Set-like: no duplicates, insertion order preserved for display
    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub education: Vec<String>,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub work: Vec<WorkExperience>,

    #[serde(default)]
    pub links: Links,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Whether this record came back from the service (has an id)
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Role of the most recent job, used as a card subtitle
    pub fn headline(&self) -> &str {
        self.work
            .first()
            .map(|w| w.role.as_str())
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("Developer")
    }

    /// Copy of this profile stripped of service-managed fields
    ///
    /// This is the `profileData` payload for a create request.
    pub fn without_identity(&self) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }
}

/// A project entry in a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub links: Vec<String>,

    #[serde(default)]
    pub skills: Vec<String>,
}

/// A work history entry in a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(default)]
    pub company: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub duration: String,

    #[serde(default)]
    pub description: String,
}

/// External links attached to a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub github: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub linkedin: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub portfolio: Option<String>,
}

impl Links {
    pub fn get(&self, platform: LinkPlatform) -> Option<&str> {
        match platform {
            LinkPlatform::Github => self.github.as_deref(),
            LinkPlatform::Linkedin => self.linkedin.as_deref(),
            LinkPlatform::Portfolio => self.portfolio.as_deref(),
        }
    }

    /// Set a link; blank values clear it
    pub fn set(&mut self, platform: LinkPlatform, value: &str) {
        let value = value.trim();
        let value = (!value.is_empty()).then(|| value.to_string());
        match platform {
            LinkPlatform::Github => self.github = value,
            LinkPlatform::Linkedin => self.linkedin = value,
            LinkPlatform::Portfolio => self.portfolio = value,
        }
    }

    /// Present links in display order
    pub fn iter(&self) -> impl Iterator<Item = (LinkPlatform, &str)> {
        LinkPlatform::all()
            .iter()
            .filter_map(move |p| self.get(*p).map(|url| (*p, url)))
    }
}

/// The fixed set of link platforms a profile can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkPlatform {
    Github,
    Linkedin,
    Portfolio,
}

impl LinkPlatform {
    pub fn all() -> &'static [LinkPlatform] {
        &[
            LinkPlatform::Github,
            LinkPlatform::Linkedin,
            LinkPlatform::Portfolio,
        ]
    }
}

impl std::fmt::Display for LinkPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkPlatform::Github => write!(f, "github"),
            LinkPlatform::Linkedin => write!(f, "linkedin"),
            LinkPlatform::Portfolio => write!(f, "portfolio"),
        }
    }
}

impl std::str::FromStr for LinkPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(LinkPlatform::Github),
            "linkedin" => Ok(LinkPlatform::Linkedin),
            "portfolio" => Ok(LinkPlatform::Portfolio),
            _ => Err(format!(
                "Unknown link platform: {}. Use github, linkedin, or portfolio",
                s
            )),
        }
    }
}

/// Split comma-separated input into trimmed pieces, dropping empty ones
pub fn split_comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
