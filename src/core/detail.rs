//! Profile detail session: the profile, its top-skill tabs and their projects

use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::identity::ProfileId;
use crate::core::service::{ProfileService, ServiceError};
use crate::core::skill_cache::{SkillProjectCache, SkillTab, ALL_TAB};
use crate::entities::{Profile, SkillTopEntry};

/// One opened profile with lazily loaded project tabs
pub struct DetailSession<S: ?Sized> {
    service: Arc<S>,
    id: ProfileId,
    top_limit: usize,
    top_skills: Vec<SkillTopEntry>,
    cache: SkillProjectCache<S>,
}

impl<S: ProfileService + ?Sized + 'static> DetailSession<S> {
    /// Fetch the profile and its top skills side by side
    ///
    /// Returns `Ok(None)` when the service has no such profile. A failed
    /// top-skills request only costs the skill tabs.
    pub async fn open(
        service: Arc<S>,
        id: ProfileId,
        top_limit: usize,
    ) -> Result<Option<Self>, ServiceError> {
        let (profile, top) = tokio::join!(
            service.get_profile(&id),
            service.profile_top_skills(&id, top_limit)
        );

        let Some(profile) = profile? else {
            debug!(id = %id, "profile not found");
            return Ok(None);
        };

        let top_skills = top.unwrap_or_else(|e| {
            warn!(id = %id, error = %e, "failed to fetch top skills");
            Vec::new()
        });

        let cache = SkillProjectCache::new(Arc::clone(&service), id.clone(), profile);
        Ok(Some(Self {
            service,
            id,
            top_limit,
            top_skills,
            cache,
        }))
    }

    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn profile(&self) -> &Profile {
        self.cache.profile()
    }

    pub fn top_skills(&self) -> &[SkillTopEntry] {
        &self.top_skills
    }

    /// Tab labels: `all` followed by the top skills in rank order
    pub fn tabs(&self) -> Vec<SkillTab> {
        std::iter::once(SkillTab::All)
            .chain(
                self.top_skills
                    .iter()
                    .take(self.top_limit)
                    .filter(|entry| entry.skill != ALL_TAB)
                    .map(|entry| SkillTab::Skill(entry.skill.clone())),
            )
            .collect()
    }

    pub fn cache(&self) -> &SkillProjectCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut SkillProjectCache<S> {
        &mut self.cache
    }

    /// Adopt a freshly saved profile and refresh its top skills
    ///
    /// If the refresh fails the previous tab list is kept.
    pub async fn apply_update(&mut self, profile: Profile) {
        self.cache.set_profile(profile);
        match self
            .service
            .profile_top_skills(&self.id, self.top_limit)
            .await
        {
            Ok(top) => self.top_skills = top,
            Err(e) => warn!(id = %self.id, error = %e, "failed to refresh top skills"),
        }
    }
}
