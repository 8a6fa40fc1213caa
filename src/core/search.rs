//! Debounced search, sort and view pipeline over the profile collection
//!
//! The pipeline owns the full collection (`all`), the current query and
//! sort key, and the list actually shown (`view`). Typing arms a debounce
//! timer; when it fires, either the full collection is re-fetched (blank
//! query) or the service's search runs. Sorting is local and never hits
//! the network.
//!
//! Every refresh is tagged with a sequence number when it is issued. A
//! response only lands if its number is higher than any response applied
//! so far, so a slow answer to an old query can never overwrite the answer
//! to a newer one.

use clap::ValueEnum;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::core::config::DEFAULT_DEBOUNCE_MS;
use crate::core::service::{ProfileService, ServiceError};
use crate::entities::Profile;

/// Shown when a search request fails
pub const NO_MATCHES_MESSAGE: &str = "No profiles found matching your criteria";

/// Shown when the full collection cannot be fetched
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch profiles";

/// Ordering applied to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    /// Case-insensitive by name, ascending
    #[default]
    Name,
    /// Most recently created first
    Newest,
    /// Oldest first
    Oldest,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::Newest => write!(f, "newest"),
            SortKey::Oldest => write!(f, "oldest"),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            _ => Err(format!("Unknown sort key: {}. Use name, newest, or oldest", s)),
        }
    }
}

/// Sort key for a name: base letters first, then accents
///
/// The primary part drops diacritics and case (`Émile` sorts with `emile`),
/// the secondary part keeps the accents so `e` still sorts before `é`.
/// Case never breaks a tie, which leaves that to the stable sort.
fn collation_key(name: &str) -> (String, String) {
    let decomposed: String = name.nfd().flat_map(char::to_lowercase).collect();
    let primary = decomposed
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    (primary, decomposed)
}

/// Stable sort of `profiles` by `key`
///
/// Records without a creation timestamp sort as the oldest possible value.
pub fn sort_profiles(profiles: &mut [Profile], key: SortKey) {
    match key {
        SortKey::Name => profiles.sort_by_cached_key(|p| collation_key(&p.name)),
        SortKey::Newest => profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Oldest => profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
}

/// State shared between the pipeline and its refresh tasks
#[derive(Debug, Default)]
struct ViewState {
    all: Vec<Profile>,
    view: Vec<Profile>,
    query: String,
    sort: SortKey,
    error: Option<String>,
    /// Last sequence number handed out
    issued: u64,
    /// Highest sequence number whose response was applied
    applied: u64,
}

impl ViewState {
    fn next_seq(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Claim the right to apply a response; false if it is stale
    fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            debug!(seq, applied = self.applied, "discarding stale response");
            return false;
        }
        self.applied = seq;
        true
    }

    fn set_view(&mut self, mut profiles: Vec<Profile>) {
        sort_profiles(&mut profiles, self.sort);
        self.view = profiles;
    }
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Search/sort pipeline bound to one list view
pub struct SearchPipeline<S: ?Sized> {
    service: Arc<S>,
    state: Arc<Mutex<ViewState>>,
    debounce: Duration,
    /// Armed debounce timer (and the refresh it starts once it fires)
    pending: Option<JoinHandle<()>>,
}

impl<S: ProfileService + ?Sized + 'static> SearchPipeline<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(ViewState::default())),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            pending: None,
        }
    }

    /// Use a different quiet period before refreshing
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Initial fetch of the full collection
    pub async fn load(&mut self) -> Result<(), ServiceError> {
        let seq = lock(&self.state).next_seq();
        let result = self.service.list_profiles().await;

        let mut st = lock(&self.state);
        match result {
            Ok(profiles) => {
                if st.accept(seq) {
                    st.all = profiles.clone();
                    st.set_view(profiles);
                    st.error = None;
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load profiles");
                if st.accept(seq) {
                    st.all.clear();
                    st.view.clear();
                    st.error = Some(e.user_message(FETCH_FAILED_MESSAGE));
                }
                Err(e)
            }
        }
    }

    /// Store the query and (re)arm the debounce timer
    ///
    /// A timer armed by an earlier call that has not fired yet is cancelled.
    /// The timer is spawned onto the current tokio runtime, so this panics
    /// when called outside of one.
    pub fn set_query(&mut self, text: &str) {
        lock(&self.state).query = text.to_string();
        self.arm();
    }

    fn arm(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }

        let service = Arc::clone(&self.service);
        let state = Arc::clone(&self.state);
        let delay = self.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The request runs in its own task: cancelling a later timer
            // must not abort a request that is already in flight.
            let request = tokio::spawn(refresh(service, state));
            let _ = request.await;
        }));
    }

    /// Re-sort the current view; never touches the network
    pub fn set_sort_key(&mut self, key: SortKey) {
        let mut st = lock(&self.state);
        st.sort = key;
        sort_profiles(&mut st.view, key);
    }

    /// Reset query and sort, then refresh the full collection
    ///
    /// Like [`set_query`](Self::set_query), must run inside a tokio runtime.
    pub fn clear_filters(&mut self) {
        {
            let mut st = lock(&self.state);
            st.query.clear();
            st.sort = SortKey::Name;
            sort_profiles(&mut st.view, SortKey::Name);
        }
        self.arm();
    }

    /// Wait until the most recently armed refresh has finished
    pub async fn wait_idle(&mut self) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.await;
        }
    }

    /// Dismiss the surfaced error message
    pub fn dismiss_error(&mut self) {
        lock(&self.state).error = None;
    }

    pub fn view(&self) -> Vec<Profile> {
        lock(&self.state).view.clone()
    }

    pub fn all(&self) -> Vec<Profile> {
        lock(&self.state).all.clone()
    }

    pub fn query(&self) -> String {
        lock(&self.state).query.clone()
    }

    pub fn sort_key(&self) -> SortKey {
        lock(&self.state).sort
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    /// Distinct skills across the full collection, ascending
    pub fn available_skills(&self) -> Vec<String> {
        lock(&self.state)
            .all
            .iter()
            .flat_map(|p| p.skills.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<S: ?Sized> Drop for SearchPipeline<S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

/// Run one refresh for whatever query is current when the timer fired
async fn refresh<S: ProfileService + ?Sized>(service: Arc<S>, state: Arc<Mutex<ViewState>>) {
    let (seq, query) = {
        let mut st = lock(&state);
        (st.next_seq(), st.query.clone())
    };

    if query.trim().is_empty() {
        debug!(seq, "refreshing full profile list");
        let result = service.list_profiles().await;
        let mut st = lock(&state);
        if !st.accept(seq) {
            return;
        }
        match result {
            Ok(profiles) => {
                st.all = profiles.clone();
                st.set_view(profiles);
                st.error = None;
            }
            Err(e) => {
                warn!(error = %e, "failed to refresh profiles");
                st.error = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }
    } else {
        debug!(seq, query = %query, "searching profiles");
        let result = service.search_profiles(&query).await;
        let mut st = lock(&state);
        if !st.accept(seq) {
            return;
        }
        match result {
            Ok(results) => {
                st.set_view(results);
                st.error = None;
            }
            Err(e) => {
                warn!(error = %e, query = %query, "search failed");
                st.view.clear();
                st.error = Some(NO_MATCHES_MESSAGE.to_string());
            }
        }
    }
}
