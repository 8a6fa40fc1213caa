//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Service address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Request timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Number of top skills requested when nothing else is configured
pub const DEFAULT_TOP_SKILLS_LIMIT: usize = 5;

/// Search debounce used when nothing else is configured
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// devprof configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the profile service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// How many top skills to request for tabs and rankings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_skills_limit: Option<usize>,

    /// Quiet period before a search query is sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

/// Errors that can occur when writing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Valid configuration keys with descriptions
pub const VALID_KEYS: &[(&str, &str)] = &[
    ("api_url", "Base address of the profile service"),
    ("timeout_secs", "Request timeout in seconds"),
    ("top_skills_limit", "Number of top skills used for tabs and rankings"),
    ("debounce_ms", "Quiet period before a search query is sent"),
    ("default_format", "Default output format (tsv, json, yaml, csv, md, id)"),
];

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the accessors)

        // 2. Global user config (~/.config/devprof/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Environment variables
        config.merge(Self::from_env());

        config
    }

    /// Read a config file, skipping it if unreadable or malformed
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str::<Config>(&contents).ok()
    }

    fn from_env() -> Config {
        Config {
            api_url: std::env::var("DEVPROF_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            timeout_secs: std::env::var("DEVPROF_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
            ..Default::default()
        }
    }

    /// Directory holding the global config file
    ///
    /// `DEVPROF_CONFIG_DIR` overrides the platform location.
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("DEVPROF_CONFIG_DIR") {
            if !dir.is_empty() {
                return Some(PathBuf::from(dir));
            }
        }
        directories::ProjectDirs::from("", "", "devprof").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.top_skills_limit.is_some() {
            self.top_skills_limit = other.top_skills_limit;
        }
        if other.debounce_ms.is_some() {
            self.debounce_ms = other.debounce_ms;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Effective service address, without a trailing slash
    pub fn api_url(&self) -> String {
        self.api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn top_skills_limit(&self) -> usize {
        self.top_skills_limit.unwrap_or(DEFAULT_TOP_SKILLS_LIMIT)
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    /// Get a value by key, as it would be written to the file
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(match key {
            "api_url" => self.api_url.clone(),
            "timeout_secs" => self.timeout_secs.map(|v| v.to_string()),
            "top_skills_limit" => self.top_skills_limit.map(|v| v.to_string()),
            "debounce_ms" => self.debounce_ms.map(|v| v.to_string()),
            "default_format" => self.default_format.clone(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        })
    }

    /// Set a value by key, validating numeric fields
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "api_url" => self.api_url = Some(value.trim_end_matches('/').to_string()),
            "timeout_secs" => self.timeout_secs = Some(value.parse().map_err(|_| invalid())?),
            "top_skills_limit" => {
                self.top_skills_limit = Some(value.parse().map_err(|_| invalid())?)
            }
            "debounce_ms" => self.debounce_ms = Some(value.parse().map_err(|_| invalid())?),
            "default_format" => self.default_format = Some(value.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Remove a value by key
    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "api_url" => self.api_url = None,
            "timeout_secs" => self.timeout_secs = None,
            "top_skills_limit" => self.top_skills_limit = None,
            "debounce_ms" => self.debounce_ms = None,
            "default_format" => self.default_format = None,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Load only the global config file (for editing)
    pub fn load_global() -> Result<(PathBuf, Config), ConfigError> {
        let path = Self::global_config_path().ok_or(ConfigError::NoConfigDir)?;
        if !path.exists() {
            return Ok((path, Config::default()));
        }
        let contents = std::fs::read_to_string(&path)?;
        let config = serde_yml::from_str::<Config>(&contents).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok((path, config))
    }

    /// Write this config to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yml::to_string(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_apply_when_unset() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.timeout_secs(), 30);
        assert_eq!(config.top_skills_limit(), 5);
        assert_eq!(config.debounce().as_millis(), 500);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            api_url: Some("http://a".into()),
            timeout_secs: Some(10),
            ..Default::default()
        };
        base.merge(Config {
            api_url: Some("http://b/".into()),
            ..Default::default()
        });
        assert_eq!(base.api_url(), "http://b");
        assert_eq!(base.timeout_secs(), 10);
    }

    #[test]
    fn test_set_validates_numbers() {
        let mut config = Config::default();
        config.set("debounce_ms", "250").unwrap();
        assert_eq!(config.debounce_ms, Some(250));
        assert!(matches!(
            config.set("timeout_secs", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("colour", "blue"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.set("api_url", "http://profiles.internal:9000/").unwrap();
        config.save(&path).unwrap();

        let loaded = Config::read_file(&path).unwrap();
        assert_eq!(loaded.api_url.as_deref(), Some("http://profiles.internal:9000"));
        assert_eq!(loaded.timeout_secs, None);
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "api_url: [unterminated").unwrap();
        assert!(Config::read_file(&path).is_none());
    }
}
