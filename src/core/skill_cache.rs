//! Per-skill project cache for one profile detail session
//!
//! Each skill tab maps to an explicit status: never requested, loading,
//! loaded with a (possibly empty) list, or failed. A tab is fetched at most
//! once per session: selecting a loaded or loading tab again never issues
//! another request. The synthetic `all` tab is never fetched or cached; it
//! always shows the profile's own project list.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::identity::ProfileId;
use crate::core::service::ProfileService;
use crate::entities::{Profile, Project};

/// Label of the synthetic tab showing every project
pub const ALL_TAB: &str = "all";

/// A project tab
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SkillTab {
    All,
    Skill(String),
}

impl From<&str> for SkillTab {
    fn from(label: &str) -> Self {
        if label == ALL_TAB {
            SkillTab::All
        } else {
            SkillTab::Skill(label.to_string())
        }
    }
}

impl std::fmt::Display for SkillTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillTab::All => f.write_str(ALL_TAB),
            SkillTab::Skill(label) => f.write_str(label),
        }
    }
}

/// Fetch status of one skill tab
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TabStatus {
    #[default]
    NotRequested,
    Loading,
    Loaded(Vec<Project>),
    Failed(String),
}

impl TabStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, TabStatus::Loading)
    }
}

/// Status of one tab plus the request allowed to settle it
#[derive(Debug, Default)]
struct Slot {
    status: TabStatus,
    request: u64,
}

type Entries = Mutex<HashMap<String, Slot>>;

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, Slot>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lazily filled map from skill label to that skill's projects
pub struct SkillProjectCache<S: ?Sized> {
    service: Arc<S>,
    profile_id: ProfileId,
    /// Live profile backing the `all` tab
    profile: Profile,
    entries: Arc<Entries>,
    active: SkillTab,
    /// Last request number handed out
    requests: u64,
    in_flight: Vec<JoinHandle<()>>,
}

impl<S: ProfileService + ?Sized + 'static> SkillProjectCache<S> {
    pub fn new(service: Arc<S>, profile_id: ProfileId, profile: Profile) -> Self {
        Self {
            service,
            profile_id,
            profile,
            entries: Arc::new(Mutex::new(HashMap::new())),
            active: SkillTab::All,
            requests: 0,
            in_flight: Vec::new(),
        }
    }

    pub fn active(&self) -> &SkillTab {
        &self.active
    }

    /// Make `tab` active, starting a fetch if it was never requested
    ///
    /// Loaded, loading and failed tabs are left alone: at most one request
    /// per skill per session. Fetches are spawned onto the current tokio
    /// runtime, so this must be called from within one.
    pub fn select_tab(&mut self, tab: impl Into<SkillTab>) {
        let tab = tab.into();
        self.active = tab.clone();

        let SkillTab::Skill(label) = tab else {
            return;
        };

        let request = {
            let mut entries = lock(&self.entries);
            let slot = entries.entry(label.clone()).or_default();
            if slot.status != TabStatus::NotRequested {
                debug!(skill = %label, status = ?slot.status, "skill tab already requested");
                return;
            }
            self.requests += 1;
            slot.status = TabStatus::Loading;
            slot.request = self.requests;
            self.requests
        };

        let service = Arc::clone(&self.service);
        let entries = Arc::clone(&self.entries);
        let profile_id = self.profile_id.clone();

        self.in_flight.retain(|h| !h.is_finished());
        self.in_flight.push(tokio::spawn(async move {
            debug!(skill = %label, request, "fetching projects for skill");
            let result = service.profile_projects(&profile_id, &label).await;
            let status = match result {
                Ok(projects) => TabStatus::Loaded(projects),
                Err(e) => {
                    warn!(skill = %label, error = %e, "failed to fetch projects for skill");
                    TabStatus::Failed(e.to_string())
                }
            };
            let mut entries = lock(&entries);
            // Only the request that last put the tab into Loading may settle it
            match entries.get_mut(&label) {
                Some(slot) if slot.request == request && slot.status.is_loading() => {
                    slot.status = status;
                }
                _ => debug!(skill = %label, request, "discarding superseded project fetch"),
            }
        }));
    }

    /// Retry a failed tab and make it active
    ///
    /// Same runtime requirement as [`select_tab`](Self::select_tab).
    pub fn retry_tab(&mut self, label: &str) {
        {
            let mut entries = lock(&self.entries);
            if let Some(slot) = entries.get_mut(label) {
                if matches!(slot.status, TabStatus::Failed(_)) {
                    slot.status = TabStatus::NotRequested;
                }
            }
        }
        self.select_tab(label);
    }

    /// Projects to show for the active tab
    ///
    /// The `all` tab reflects the live profile. Skill tabs show their loaded
    /// list, or nothing while loading, failed or never requested.
    pub fn active_projects(&self) -> Vec<Project> {
        match &self.active {
            SkillTab::All => self.profile.projects.clone(),
            SkillTab::Skill(label) => match lock(&self.entries).get(label) {
                Some(Slot {
                    status: TabStatus::Loaded(projects),
                    ..
                }) => projects.clone(),
                _ => Vec::new(),
            },
        }
    }

    /// Status of a skill tab; `all` always reads as loaded
    pub fn status(&self, tab: impl Into<SkillTab>) -> TabStatus {
        match tab.into() {
            SkillTab::All => TabStatus::Loaded(self.profile.projects.clone()),
            SkillTab::Skill(label) => lock(&self.entries)
                .get(&label)
                .map(|slot| slot.status.clone())
                .unwrap_or_default(),
        }
    }

    /// Replace the profile behind the `all` tab; cached skill tabs are kept
    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Forget one skill tab so the next selection fetches it again
    pub fn invalidate(&mut self, label: &str) {
        lock(&self.entries).remove(label);
    }

    pub fn invalidate_all(&mut self) {
        lock(&self.entries).clear();
    }

    /// Wait for every fetch started so far
    pub async fn wait_idle(&mut self) {
        for handle in self.in_flight.drain(..) {
            let _ = handle.await;
        }
    }
}

impl<S: ?Sized> Drop for SkillProjectCache<S> {
    fn drop(&mut self) {
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
    }
}
