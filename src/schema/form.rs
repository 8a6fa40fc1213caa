//! Profile form state machine
//!
//! A [`ProfileForm`] owns one draft profile for one editing session and
//! mediates every change to it. Edits are synchronous transformations of
//! the draft; only [`ProfileForm::submit`] talks to the service.
//!
//! ```text
//! Editing ──submit──▶ Submitting ──ok──▶ Succeeded (terminal)
//!    ▲                    │
//!    └──── any edit ◀── Failed ◀──error──┘
//! ```
//!
//! The draft is held behind an [`Arc`] and changed with [`Arc::make_mut`]:
//! a snapshot returned by [`ProfileForm::snapshot`] never changes after the
//! fact, and two snapshots are the same allocation exactly when nothing was
//! edited in between.

use miette::Diagnostic;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::identity::ProfileId;
use crate::core::service::{ProfileService, ServiceError};
use crate::entities::{split_comma_list, LinkPlatform, Profile, Project, WorkExperience};
use crate::schema::validator::{self, Field, ValidationErrors, ValidationFailed};

/// Whether the form creates a new profile or replaces an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

impl std::fmt::Display for FormMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormMode::Create => write!(f, "create"),
            FormMode::Edit => write!(f, "edit"),
        }
    }
}

/// Lifecycle state of a form session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Submitting,
    Succeeded,
    Failed,
}

impl std::fmt::Display for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormState::Editing => write!(f, "editing"),
            FormState::Submitting => write!(f, "submitting"),
            FormState::Succeeded => write!(f, "succeeded"),
            FormState::Failed => write!(f, "failed"),
        }
    }
}

/// Single-valued text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Name,
    Email,
    Description,
}

impl ScalarField {
    /// The validated field this scalar maps to, if any
    fn validated(self) -> Option<Field> {
        match self {
            ScalarField::Name => Some(Field::Name),
            ScalarField::Email => Some(Field::Email),
            ScalarField::Description => None,
        }
    }
}

/// Collections of plain strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleListField {
    Education,
}

impl std::fmt::Display for SimpleListField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimpleListField::Education => write!(f, "education"),
        }
    }
}

/// Collections of composite entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedCollection {
    Projects,
    Work,
}

impl std::fmt::Display for NestedCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NestedCollection::Projects => write!(f, "projects"),
            NestedCollection::Work => write!(f, "work"),
        }
    }
}

impl NestedCollection {
    /// Every key of an entry in this collection, in display order
    pub fn fields(self) -> &'static [NestedField] {
        match self {
            NestedCollection::Projects => &[
                NestedField::Project(ProjectKey::Title),
                NestedField::Project(ProjectKey::Description),
                NestedField::Project(ProjectKey::Links),
                NestedField::Project(ProjectKey::Skills),
            ],
            NestedCollection::Work => &[
                NestedField::Work(WorkKey::Company),
                NestedField::Work(WorkKey::Role),
                NestedField::Work(WorkKey::Duration),
                NestedField::Work(WorkKey::Description),
            ],
        }
    }
}

/// Keys of a [`Project`] entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKey {
    Title,
    Description,
    /// Comma-separated list of URLs
    Links,
    /// Comma-separated list of skills
    Skills,
}

/// Keys of a [`WorkExperience`] entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkKey {
    Company,
    Role,
    Duration,
    Description,
}

/// Typed path to one key of a composite collection entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedField {
    Project(ProjectKey),
    Work(WorkKey),
}

impl NestedField {
    pub fn collection(self) -> NestedCollection {
        match self {
            NestedField::Project(_) => NestedCollection::Projects,
            NestedField::Work(_) => NestedCollection::Work,
        }
    }
}

/// A new entry for a composite collection
#[derive(Debug, Clone, PartialEq)]
pub enum NestedItem {
    Project(Project),
    Work(WorkExperience),
}

impl NestedItem {
    /// All-empty entry for the given collection
    pub fn template(collection: NestedCollection) -> Self {
        match collection {
            NestedCollection::Projects => NestedItem::Project(Project::default()),
            NestedCollection::Work => NestedItem::Work(WorkExperience::default()),
        }
    }
}

/// Errors from form operations and submission
#[derive(Debug, Error, Diagnostic)]
pub enum FormError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationFailed),

    #[error("{action} failed: {source}")]
    #[diagnostic(
        code(devprof::form::submit_failed),
        help("Your changes are kept; submit again to retry")
    )]
    Service {
        action: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("No {field} entry at index {index} (have {len})")]
    #[diagnostic(code(devprof::form::index_out_of_range))]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("Edit mode needs an existing profile to start from")]
    #[diagnostic(code(devprof::form::missing_seed))]
    MissingSeed,

    #[error("Cannot edit a profile that has no id")]
    #[diagnostic(code(devprof::form::missing_id))]
    MissingId,

    #[error("This form session has already been submitted")]
    #[diagnostic(code(devprof::form::closed))]
    Closed,
}

impl FormError {
    /// Whether submitting again without changes might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, FormError::Service { .. })
    }
}

/// Editing session over one draft profile
pub struct ProfileForm<S: ?Sized> {
    service: Arc<S>,
    mode: FormMode,
    /// Id of the persisted record being edited
    target: Option<ProfileId>,
    /// `None` once the session has succeeded
    draft: Option<Arc<Profile>>,
    errors: ValidationErrors,
    state: FormState,
}

impl<S: ProfileService + ?Sized> ProfileForm<S> {
    /// Start a session in the given mode
    ///
    /// Create mode ignores `seed` and starts from an empty skeleton. Edit
    /// mode starts from a deep copy of `seed`, so abandoning the session
    /// leaves the original untouched.
    pub fn initialize(
        service: Arc<S>,
        mode: FormMode,
        seed: Option<&Profile>,
    ) -> Result<Self, FormError> {
        let (target, draft) = match mode {
            FormMode::Create => (None, Profile::default()),
            FormMode::Edit => {
                let seed = seed.ok_or(FormError::MissingSeed)?;
                let id = seed.id.clone().ok_or(FormError::MissingId)?;
                (Some(id), seed.clone())
            }
        };
        Ok(Self::start(service, mode, target, draft))
    }

    /// Start a create-mode session
    pub fn create(service: Arc<S>) -> Self {
        Self::start(service, FormMode::Create, None, Profile::default())
    }

    fn start(service: Arc<S>, mode: FormMode, target: Option<ProfileId>, draft: Profile) -> Self {
        Self {
            service,
            mode,
            target,
            draft: Some(Arc::new(draft)),
            errors: ValidationErrors::new(),
            state: FormState::Editing,
        }
    }

    /// Start an edit-mode session seeded from a persisted profile
    pub fn edit(service: Arc<S>, seed: &Profile) -> Result<Self, FormError> {
        Self::initialize(service, FormMode::Edit, Some(seed))
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Current draft, or `None` after a successful submit
    pub fn draft(&self) -> Option<&Profile> {
        self.draft.as_deref()
    }

    /// Shared handle to the current draft value
    pub fn snapshot(&self) -> Option<Arc<Profile>> {
        self.draft.clone()
    }

    /// Errors from the last validation, minus fields edited since
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Mutable access to the draft for an edit
    ///
    /// Clones the draft first if a snapshot of it is still held elsewhere.
    /// An edit after a failed submit puts the form back into `Editing`.
    fn draft_mut(&mut self) -> Result<&mut Profile, FormError> {
        let draft = self.draft.as_mut().ok_or(FormError::Closed)?;
        if self.state == FormState::Failed {
            self.state = FormState::Editing;
        }
        Ok(Arc::make_mut(draft))
    }

    fn ensure_open(&self) -> Result<(), FormError> {
        if self.draft.is_none() {
            return Err(FormError::Closed);
        }
        Ok(())
    }

    fn check_index(field: impl ToString, index: usize, len: usize) -> Result<(), FormError> {
        if index >= len {
            return Err(FormError::IndexOutOfRange {
                field: field.to_string(),
                index,
                len,
            });
        }
        Ok(())
    }

    // ==================== Scalars ====================

    /// Update a scalar field and clear its pending error
    pub fn set_scalar_field(&mut self, field: ScalarField, value: &str) -> Result<(), FormError> {
        let draft = self.draft_mut()?;
        match field {
            ScalarField::Name => draft.name = value.to_string(),
            ScalarField::Email => draft.email = value.to_string(),
            ScalarField::Description => {
                draft.description = (!value.trim().is_empty()).then(|| value.to_string())
            }
        }
        if let Some(validated) = field.validated() {
            self.errors.remove(&validated);
        }
        Ok(())
    }

    // ==================== Simple lists ====================

    fn simple_list(draft: &mut Profile, field: SimpleListField) -> &mut Vec<String> {
        match field {
            SimpleListField::Education => &mut draft.education,
        }
    }

    pub fn set_simple_list_item(
        &mut self,
        field: SimpleListField,
        index: usize,
        value: &str,
    ) -> Result<(), FormError> {
        self.ensure_open()?;
        let len = self.draft().map_or(0, |d| match field {
            SimpleListField::Education => d.education.len(),
        });
        Self::check_index(field, index, len)?;
        Self::simple_list(self.draft_mut()?, field)[index] = value.to_string();
        Ok(())
    }

    pub fn append_simple_list_item(
        &mut self,
        field: SimpleListField,
        value: &str,
    ) -> Result<(), FormError> {
        Self::simple_list(self.draft_mut()?, field).push(value.to_string());
        Ok(())
    }

    pub fn remove_simple_list_item(
        &mut self,
        field: SimpleListField,
        index: usize,
    ) -> Result<(), FormError> {
        self.ensure_open()?;
        let len = self.draft().map_or(0, |d| match field {
            SimpleListField::Education => d.education.len(),
        });
        Self::check_index(field, index, len)?;
        Self::simple_list(self.draft_mut()?, field).remove(index);
        Ok(())
    }

    // ==================== Nested collections ====================

    fn nested_len(&self, collection: NestedCollection) -> usize {
        self.draft().map_or(0, |d| match collection {
            NestedCollection::Projects => d.projects.len(),
            NestedCollection::Work => d.work.len(),
        })
    }

    /// Current text of one key of one entry, `None` if there is no such entry
    ///
    /// Project links and skills read back as comma-separated text.
    pub fn nested_value(&self, field: NestedField, index: usize) -> Option<String> {
        let draft = self.draft()?;
        let value = match field {
            NestedField::Project(key) => {
                let project = draft.projects.get(index)?;
                match key {
                    ProjectKey::Title => project.title.clone(),
                    ProjectKey::Description => project.description.clone(),
                    ProjectKey::Links => project.links.join(", "),
                    ProjectKey::Skills => project.skills.join(", "),
                }
            }
            NestedField::Work(key) => {
                let job = draft.work.get(index)?;
                match key {
                    WorkKey::Company => job.company.clone(),
                    WorkKey::Role => job.role.clone(),
                    WorkKey::Duration => job.duration.clone(),
                    WorkKey::Description => job.description.clone(),
                }
            }
        };
        Some(value)
    }

    /// Set one key of one entry in `projects` or `work`
    ///
    /// Project links and skills take comma-separated text.
    pub fn set_nested_field(
        &mut self,
        field: NestedField,
        index: usize,
        value: &str,
    ) -> Result<(), FormError> {
        self.ensure_open()?;
        Self::check_index(field.collection(), index, self.nested_len(field.collection()))?;

        let draft = self.draft_mut()?;
        match field {
            NestedField::Project(key) => {
                let project = &mut draft.projects[index];
                match key {
                    ProjectKey::Title => project.title = value.to_string(),
                    ProjectKey::Description => project.description = value.to_string(),
                    ProjectKey::Links => project.links = split_comma_list(value),
                    ProjectKey::Skills => project.skills = split_comma_list(value),
                }
            }
            NestedField::Work(key) => {
                let job = &mut draft.work[index];
                match key {
                    WorkKey::Company => job.company = value.to_string(),
                    WorkKey::Role => job.role = value.to_string(),
                    WorkKey::Duration => job.duration = value.to_string(),
                    WorkKey::Description => job.description = value.to_string(),
                }
            }
        }
        Ok(())
    }

    /// Append an entry to the matching composite collection
    pub fn append_nested_item(&mut self, item: NestedItem) -> Result<(), FormError> {
        let draft = self.draft_mut()?;
        match item {
            NestedItem::Project(project) => draft.projects.push(project),
            NestedItem::Work(job) => draft.work.push(job),
        }
        Ok(())
    }

    pub fn remove_nested_item(
        &mut self,
        collection: NestedCollection,
        index: usize,
    ) -> Result<(), FormError> {
        self.ensure_open()?;
        Self::check_index(collection, index, self.nested_len(collection))?;

        let draft = self.draft_mut()?;
        match collection {
            NestedCollection::Projects => {
                draft.projects.remove(index);
            }
            NestedCollection::Work => {
                draft.work.remove(index);
            }
        }
        Ok(())
    }

    // ==================== Skills & links ====================

    /// Add a skill; returns whether the draft changed
    ///
    /// Input is trimmed; empty input and exact duplicates are ignored.
    pub fn add_skill(&mut self, text: &str) -> Result<bool, FormError> {
        self.ensure_open()?;
        let skill = text.trim();
        let present = self
            .draft()
            .is_some_and(|d| d.skills.iter().any(|s| s == skill));
        if skill.is_empty() || present {
            return Ok(false);
        }

        self.draft_mut()?.skills.push(skill.to_string());
        self.errors.remove(&Field::Skills);
        Ok(true)
    }

    pub fn remove_skill(&mut self, index: usize) -> Result<String, FormError> {
        self.ensure_open()?;
        let len = self.draft().map_or(0, |d| d.skills.len());
        Self::check_index(Field::Skills, index, len)?;
        Ok(self.draft_mut()?.skills.remove(index))
    }

    pub fn set_link(&mut self, platform: LinkPlatform, value: &str) -> Result<(), FormError> {
        self.draft_mut()?.links.set(platform, value);
        Ok(())
    }

    // ==================== Validation & submit ====================

    /// Validate the draft, remembering and returning the errors
    pub fn validate(&mut self) -> Result<&ValidationErrors, FormError> {
        let draft = self.draft.as_deref().ok_or(FormError::Closed)?;
        self.errors = validator::validate(draft);
        Ok(&self.errors)
    }

    /// Send the draft to the service
    ///
    /// Validation failures never reach the network. A service failure
    /// leaves the draft exactly as it was and the form in `Failed`, from
    /// which `submit` can simply be called again.
    pub async fn submit(&mut self) -> Result<Profile, FormError> {
        if !self.validate()?.is_empty() {
            debug!(errors = self.errors.len(), "submit rejected by validation");
            self.state = FormState::Editing;
            return Err(ValidationFailed::new(self.errors.clone()).into());
        }

        let draft = self.draft.clone().ok_or(FormError::Closed)?;
        self.state = FormState::Submitting;

        let (action, result) = match (self.mode, &self.target) {
            (FormMode::Edit, Some(id)) => ("Update", self.service.update_profile(id, &draft).await),
            _ => ("Creation", self.service.create_profile(&draft).await),
        };

        match result {
            Ok(profile) => {
                info!(
                    mode = %self.mode,
                    id = ?profile.id.as_ref().map(ProfileId::as_str),
                    "profile saved"
                );
                self.state = FormState::Succeeded;
                self.draft = None;
                self.errors.clear();
                Ok(profile)
            }
            Err(source) => {
                warn!(mode = %self.mode, error = %source, "profile submit failed");
                self.state = FormState::Failed;
                Err(FormError::Service { action, source })
            }
        }
    }
}
