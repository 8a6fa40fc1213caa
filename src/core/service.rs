//! Contract with the remote profile service
//!
//! Every component in this crate talks to the service through the
//! [`ProfileService`] trait. The HTTP implementation lives in
//! [`crate::core::client`]; tests substitute in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::identity::ProfileId;
use crate::entities::{Profile, Project, SkillTopEntry};

/// Errors that can occur while talking to the profile service
///
/// All of these are transient from the client's point of view: the caller
/// can always re-invoke the same operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl ServiceError {
    /// Message suitable for showing to a user
    ///
    /// Server errors surface the service's own message; everything else
    /// falls back to the given generic text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ServiceError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Operations consumed from the profile service
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Fetch the full profile collection
    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    /// Fetch one profile; `Ok(None)` when the service has no such record
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<Profile>>;

    /// Create a profile from a draft and return the canonical record
    async fn create_profile(&self, data: &Profile) -> Result<Profile>;

    /// Replace a persisted profile wholesale and return the canonical record
    async fn update_profile(&self, id: &ProfileId, data: &Profile) -> Result<Profile>;

    /// Free-text search across profiles
    async fn search_profiles(&self, query: &str) -> Result<Vec<Profile>>;

    /// Projects of one profile that use the given skill
    async fn profile_projects(&self, id: &ProfileId, skill: &str) -> Result<Vec<Project>>;

    /// Most used skills of one profile
    async fn profile_top_skills(&self, id: &ProfileId, limit: usize) -> Result<Vec<SkillTopEntry>>;

    /// Most used skills across all profiles
    async fn top_skills(&self, limit: usize) -> Result<Vec<SkillTopEntry>>;
}

/// Request body for create and update: `{ "profileData": ... }`
#[derive(Debug, Serialize)]
pub struct ProfileDataRequest<'a> {
    #[serde(rename = "profileData")]
    pub profile_data: &'a Profile,
}

/// `{ "profiles": [...] }`
#[derive(Debug, Default, Deserialize)]
pub struct ProfilesEnvelope {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// `{ "profile": {...} }`, where the profile may be absent or null
#[derive(Debug, Default, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// `{ "results": [...] }`
#[derive(Debug, Default, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub results: Vec<Profile>,
}

/// `{ "projects": [...] }`
#[derive(Debug, Default, Deserialize)]
pub struct ProjectsEnvelope {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// `{ "skills": [...] }`
#[derive(Debug, Default, Deserialize)]
pub struct SkillsEnvelope {
    #[serde(default)]
    pub skills: Vec<SkillTopEntry>,
}

/// Body shape of service error responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory service used by component tests
    //!
    //! Records every call, and lets a test inject latency or failures per
    //! query / skill so that ordering and caching rules can be exercised on
    //! tokio's paused clock.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        List,
        Get(String),
        Create(String),
        Update(String, String),
        Search(String),
        Projects(String, String),
        ProfileTopSkills(String, usize),
        TopSkills(usize),
    }

    #[derive(Default)]
    pub struct FakeService {
        pub profiles: Mutex<Vec<Profile>>,
        pub search_results: Mutex<HashMap<String, Vec<Profile>>>,
        pub projects: Mutex<HashMap<String, Vec<Project>>>,
        pub top: Mutex<Vec<SkillTopEntry>>,
        pub delays: Mutex<HashMap<String, Duration>>,
        pub failing: Mutex<Vec<String>>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FakeService {
        pub fn with_profiles(profiles: Vec<Profile>) -> Self {
            let fake = Self::default();
            *fake.profiles.lock().unwrap() = profiles;
            fake
        }

        pub fn set_search(&self, query: &str, results: Vec<Profile>) {
            self.search_results
                .lock()
                .unwrap()
                .insert(query.to_string(), results);
        }

        pub fn set_projects(&self, skill: &str, projects: Vec<Project>) {
            self.projects
                .lock()
                .unwrap()
                .insert(skill.to_string(), projects);
        }

        /// Delay responses whose key (query, skill, or operation name) matches
        pub fn delay(&self, key: &str, delay: Duration) {
            self.delays.lock().unwrap().insert(key.to_string(), delay);
        }

        /// Make calls whose key matches fail with a 503
        pub fn fail(&self, key: &str) {
            self.failing.lock().unwrap().push(key.to_string());
        }

        pub fn heal(&self, key: &str) {
            self.failing.lock().unwrap().retain(|k| k != key);
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
        }

        async fn enter(&self, call: Call, key: &str) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            let delay = self.delays.lock().unwrap().get(key).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.lock().unwrap().iter().any(|k| k == key) {
                return Err(ServiceError::Server {
                    status: 503,
                    message: format!("{} unavailable", key),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ProfileService for FakeService {
        async fn list_profiles(&self) -> Result<Vec<Profile>> {
            self.enter(Call::List, "list").await?;
            Ok(self.profiles.lock().unwrap().clone())
        }

        async fn get_profile(&self, id: &ProfileId) -> Result<Option<Profile>> {
            self.enter(Call::Get(id.to_string()), "get").await?;
            Ok(self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id.as_ref() == Some(id))
                .cloned())
        }

        async fn create_profile(&self, data: &Profile) -> Result<Profile> {
            self.enter(Call::Create(data.name.clone()), "create").await?;
            let mut created = data.without_identity();
            let mut profiles = self.profiles.lock().unwrap();
            created.id = Some(ProfileId::new(format!("p{}", profiles.len() + 1)));
            profiles.push(created.clone());
            Ok(created)
        }

        async fn update_profile(&self, id: &ProfileId, data: &Profile) -> Result<Profile> {
            self.enter(Call::Update(id.to_string(), data.name.clone()), "update")
                .await?;
            let mut updated = data.clone();
            updated.id = Some(id.clone());
            let mut profiles = self.profiles.lock().unwrap();
            if let Some(slot) = profiles.iter_mut().find(|p| p.id.as_ref() == Some(id)) {
                *slot = updated.clone();
            }
            Ok(updated)
        }

        async fn search_profiles(&self, query: &str) -> Result<Vec<Profile>> {
            self.enter(Call::Search(query.to_string()), query).await?;
            Ok(self
                .search_results
                .lock()
                .unwrap()
                .get(query)
                .cloned()
                .unwrap_or_default())
        }

        async fn profile_projects(&self, id: &ProfileId, skill: &str) -> Result<Vec<Project>> {
            self.enter(Call::Projects(id.to_string(), skill.to_string()), skill)
                .await?;
            Ok(self
                .projects
                .lock()
                .unwrap()
                .get(skill)
                .cloned()
                .unwrap_or_default())
        }

        async fn profile_top_skills(
            &self,
            id: &ProfileId,
            limit: usize,
        ) -> Result<Vec<SkillTopEntry>> {
            self.enter(Call::ProfileTopSkills(id.to_string(), limit), "profile-top")
                .await?;
            Ok(self.top.lock().unwrap().iter().take(limit).cloned().collect())
        }

        async fn top_skills(&self, limit: usize) -> Result<Vec<SkillTopEntry>> {
            self.enter(Call::TopSkills(limit), "top").await?;
            Ok(self.top.lock().unwrap().iter().take(limit).cloned().collect())
        }
    }

    /// A persisted profile with the given name, id and skills
    pub fn profile(id: &str, name: &str, skills: &[&str]) -> Profile {
        Profile {
            id: Some(ProfileId::new(id)),
            name: name.to_string(),
            email: format!("{}@example.com", id),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = ServiceError::Server {
            status: 400,
            message: "Email already registered".into(),
        };
        assert_eq!(err.user_message("Creation failed"), "Email already registered");

        let err = ServiceError::InvalidResponse("bad json".into());
        assert_eq!(err.user_message("Creation failed"), "Creation failed");
    }

    #[test]
    fn test_envelopes_default_missing_collections() {
        let env: ProfilesEnvelope = serde_json::from_str("{}").unwrap();
        assert!(env.profiles.is_empty());
        let env: ProfileEnvelope = serde_json::from_str(r#"{"profile": null}"#).unwrap();
        assert!(env.profile.is_none());
    }

    #[test]
    fn test_profile_data_request_wraps_payload() {
        let profile = Profile {
            name: "Ada".into(),
            ..Default::default()
        };
        let body = serde_json::to_value(ProfileDataRequest {
            profile_data: &profile,
        })
        .unwrap();
        assert_eq!(body["profileData"]["name"], "Ada");
    }
}
