//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, HttpProfileService, ProfileService};
use crate::entities::Profile;
use crate::schema::form::{FormError, ProfileForm};
use crate::schema::wizard::ProfileWizard;

/// Effective configuration: file and environment, then command-line flags
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    if let Some(url) = &global.api_url {
        config.api_url = Some(url.clone());
    }
    config
}

/// HTTP client for the configured profile service
pub fn connect(config: &Config) -> Result<Arc<HttpProfileService>> {
    let service = HttpProfileService::from_config(config).into_diagnostic()?;
    tracing::debug!(api_url = service.base_url(), "using profile service");
    Ok(Arc::new(service))
}

/// Runtime for driving service calls from synchronous command code
pub fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()
}

/// Resolve `auto` through the configured default, then the command default
pub fn resolve_format(global: &GlobalOpts, config: &Config, fallback: OutputFormat) -> OutputFormat {
    match global.format {
        OutputFormat::Auto => config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback),
        f => f,
    }
}

/// Submit a form until it succeeds or the user gives up
///
/// With a wizard, validation failures re-prompt the failing fields and
/// transient service failures offer a retry with the draft unchanged.
/// Without one, the first failure is returned.
pub fn submit_form<S: ProfileService + ?Sized>(
    rt: &Runtime,
    form: &mut ProfileForm<S>,
    wizard: Option<&ProfileWizard>,
) -> Result<Profile> {
    loop {
        let error = match rt.block_on(form.submit()) {
            Ok(profile) => return Ok(profile),
            Err(e) => e,
        };

        let again = match wizard {
            Some(wizard) if matches!(error, FormError::Validation(_)) => {
                wizard.fix_errors(form)?;
                true
            }
            Some(wizard) if error.is_retryable() => wizard.confirm_retry(&error)?,
            _ => false,
        };
        if !again {
            return Err(error.into());
        }
    }
}

/// Print a success line unless quiet; always print the bare id for `-f id`
pub fn report_saved(global: &GlobalOpts, verb: &str, profile: &Profile) {
    let id = profile
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    if global.format == OutputFormat::Id {
        println!("{}", id);
    } else if !global.quiet {
        println!(
            "{} {} profile {} ({})",
            style("✓").green(),
            verb,
            style(&id).cyan(),
            style(&profile.name).yellow()
        );
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            format,
            quiet: false,
            verbose: false,
            api_url: None,
        }
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("désolé beaucoup", 9), "désolé...");
    }

    #[test]
    fn test_resolve_format_prefers_flag() {
        let config = Config {
            default_format: Some("json".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_format(&global(OutputFormat::Csv), &config, OutputFormat::Tsv),
            OutputFormat::Csv
        );
        assert_eq!(
            resolve_format(&global(OutputFormat::Auto), &config, OutputFormat::Tsv),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_resolve_format_ignores_unknown_default() {
        let config = Config {
            default_format: Some("xml".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_format(&global(OutputFormat::Auto), &config, OutputFormat::Yaml),
            OutputFormat::Yaml
        );
    }
}
