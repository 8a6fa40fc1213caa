//! Core module - service contract, configuration and client-side pipelines

pub mod client;
pub mod config;
pub mod detail;
pub mod identity;
pub mod search;
pub mod service;
pub mod skill_cache;

pub use client::HttpProfileService;
pub use config::{Config, ConfigError};
pub use detail::DetailSession;
pub use identity::{IdParseError, ProfileId};
pub use search::{sort_profiles, SearchPipeline, SortKey};
pub use service::{ProfileService, ServiceError};
pub use skill_cache::{SkillProjectCache, SkillTab, TabStatus, ALL_TAB};
