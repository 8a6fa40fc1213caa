//! Profile validation with per-field error reporting
//!
//! Rules are evaluated independently and every violation is reported, so a
//! form can show all problems at once rather than one per submit attempt.

use miette::Diagnostic;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::entities::Profile;

/// Draft fields that carry validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Skills,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Email => write!(f, "email"),
            Field::Skills => write!(f, "skills"),
        }
    }
}

/// Field → message map produced by [`validate`]
pub type ValidationErrors = BTreeMap<Field, String>;

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Email is invalid";
pub const SKILLS_REQUIRED: &str = "At least one skill is required";

/// Check a draft profile against the submission rules
pub fn validate(draft: &Profile) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.name.trim().is_empty() {
        errors.insert(Field::Name, NAME_REQUIRED.to_string());
    }

    if draft.email.trim().is_empty() {
        errors.insert(Field::Email, EMAIL_REQUIRED.to_string());
    } else if !looks_like_email(&draft.email) {
        errors.insert(Field::Email, EMAIL_INVALID.to_string());
    }

    if draft.skills.is_empty() {
        errors.insert(Field::Skills, SKILLS_REQUIRED.to_string());
    }

    errors
}

/// Basic `local@domain.tld` shape check
///
/// Matches when the text contains `<non-space>+@<non-space>+.<non-space>+`
/// anywhere, which is deliberately loose.
pub fn looks_like_email(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();

    chars.iter().enumerate().any(|(at, c)| {
        if *c != '@' || at == 0 || chars[at - 1].is_whitespace() {
            return false;
        }
        // The domain part is the run of non-space characters after '@'
        let domain: Vec<char> = chars[at + 1..]
            .iter()
            .take_while(|c| !c.is_whitespace())
            .copied()
            .collect();
        domain
            .iter()
            .enumerate()
            .any(|(i, c)| *c == '.' && i >= 1 && i + 1 < domain.len())
    })
}

/// Submission rejected locally because the draft has field errors
#[derive(Debug, Error, Diagnostic)]
#[error("Profile validation failed: {summary}")]
#[diagnostic(
    code(devprof::schema::validation_failed),
    help("Fix the listed fields and submit again; nothing was sent to the service")
)]
pub struct ValidationFailed {
    summary: String,

    #[related]
    violations: Vec<FieldViolation>,

    errors: ValidationErrors,
}

/// A single field violation
#[derive(Debug, Error, Diagnostic)]
#[error("{field}: {message}")]
pub struct FieldViolation {
    pub field: Field,
    pub message: String,
}

impl ValidationFailed {
    pub fn new(errors: ValidationErrors) -> Self {
        let count = errors.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        let violations = errors
            .iter()
            .map(|(field, message)| FieldViolation {
                field: *field,
                message: message.clone(),
            })
            .collect();
        Self {
            summary,
            violations,
            errors,
        }
    }

    /// The per-field messages
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }
}
