//! HTTP client for the profile service API

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::core::config::Config;
use crate::core::identity::ProfileId;
use crate::core::service::{
    ErrorBody, ProfileDataRequest, ProfileEnvelope, ProfileService, ProfilesEnvelope,
    ProjectsEnvelope, Result, SearchEnvelope, ServiceError, SkillsEnvelope,
};
use crate::entities::{Profile, Project, SkillTopEntry};

/// [`ProfileService`] implementation over the service's HTTP API
///
/// # Example
///
/// ```rust,no_run
/// use devprof::core::{HttpProfileService, ProfileService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = HttpProfileService::new("http://localhost:8000", 30)?;
/// let profiles = service.list_profiles().await?;
/// println!("{} profiles", profiles.len());
/// # Ok(())
/// # }
/// ```
pub struct HttpProfileService {
    base_url: String,
    client: Client,
}

impl HttpProfileService {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ServiceError::ClientBuild(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    /// Create a client from the effective configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url(), config.timeout_secs())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}/profile/{}", self.base_url, path);
        if !params.is_empty() {
            let query: Vec<String> = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    /// Check status and parse the JSON envelope
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(ServiceError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ProfileService for HttpProfileService {
    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let envelope: ProfilesEnvelope = self.get(&self.url("get-all-profiles", &[])).await?;
        Ok(envelope.profiles)
    }

    async fn get_profile(&self, id: &ProfileId) -> Result<Option<Profile>> {
        let url = self.url("get-profile", &[("profileId", id.as_str())]);
        debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: ProfileEnvelope = self.handle_response(response).await?;
        Ok(envelope.profile)
    }

    async fn create_profile(&self, data: &Profile) -> Result<Profile> {
        let url = self.url("create-profile", &[]);
        let payload = data.without_identity();
        debug!(url = %url, name = %payload.name, "POST");

        let response = self
            .client
            .post(&url)
            .json(&ProfileDataRequest {
                profile_data: &payload,
            })
            .send()
            .await?;

        let envelope: ProfileEnvelope = self.handle_response(response).await?;
        envelope
            .profile
            .ok_or_else(|| ServiceError::InvalidResponse("create returned no profile".into()))
    }

    async fn update_profile(&self, id: &ProfileId, data: &Profile) -> Result<Profile> {
        let url = self.url("update-profile", &[("profileId", id.as_str())]);
        debug!(url = %url, "PUT");

        let response = self
            .client
            .put(&url)
            .json(&ProfileDataRequest { profile_data: data })
            .send()
            .await?;

        let envelope: ProfileEnvelope = self.handle_response(response).await?;
        envelope
            .profile
            .ok_or_else(|| ServiceError::InvalidResponse("update returned no profile".into()))
    }

    async fn search_profiles(&self, query: &str) -> Result<Vec<Profile>> {
        let envelope: SearchEnvelope = self.get(&self.url("search", &[("q", query)])).await?;
        Ok(envelope.results)
    }

    async fn profile_projects(&self, id: &ProfileId, skill: &str) -> Result<Vec<Project>> {
        let url = self.url("projects", &[("profileId", id.as_str()), ("skill", skill)]);
        let envelope: ProjectsEnvelope = self.get(&url).await?;
        Ok(envelope.projects)
    }

    async fn profile_top_skills(&self, id: &ProfileId, limit: usize) -> Result<Vec<SkillTopEntry>> {
        let limit = limit.to_string();
        let url = self.url(
            "profile-top-skills",
            &[("profileId", id.as_str()), ("limit", &limit)],
        );
        let envelope: SkillsEnvelope = self.get(&url).await?;
        Ok(envelope.skills)
    }

    async fn top_skills(&self, limit: usize) -> Result<Vec<SkillTopEntry>> {
        let limit = limit.to_string();
        let envelope: SkillsEnvelope = self.get(&self.url("skills/top", &[("limit", &limit)])).await?;
        Ok(envelope.skills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let service = HttpProfileService::new("http://localhost:8000/", 5).unwrap();
        assert_eq!(service.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_url_encodes_query_values() {
        let service = HttpProfileService::new("http://host", 5).unwrap();
        assert_eq!(
            service.url("search", &[("q", "c++ & rust")]),
            "http://host/profile/search?q=c%2B%2B%20%26%20rust"
        );
        assert_eq!(
            service.url("skills/top", &[("limit", "5")]),
            "http://host/profile/skills/top?limit=5"
        );
    }
}
