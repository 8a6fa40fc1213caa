//! Skill popularity entries produced by the profile service

use serde::{Deserialize, Serialize};

/// A skill and the number of projects that use it
///
/// Read-only: the service aggregates these, the client only displays them
/// and uses the labels as project tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTopEntry {
    pub skill: String,

    #[serde(default)]
    pub count: u64,
}
