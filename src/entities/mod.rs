//! Record types exchanged with the profile service
//!
//! - [`Profile`] - A developer's composite record (identity, skills,
//!   education, projects, work history, links)
//! - [`Project`] and [`WorkExperience`] - Entries of the nested collections
//! - [`SkillTopEntry`] - Aggregated skill counts used to drive skill tabs

pub mod profile;
pub mod skill;

pub use profile::{split_comma_list, LinkPlatform, Links, Profile, Project, WorkExperience};
pub use skill::SkillTopEntry;
