//! Profile identity assigned by the remote profile service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque identifier of a persisted profile
///
/// The service assigns the id when a profile is created; the client never
/// generates or interprets one, it only carries it back on later requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Wrap a service-issued id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur when parsing a profile id from user input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("Profile id cannot be empty")]
    Empty,

    #[error("Profile id cannot contain whitespace: '{0}'")]
    Whitespace(String),
}

impl FromStr for ProfileId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdParseError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}
