//! `devprof config` command - Configuration management
//!
//! Reads and writes the global config file; the effective configuration
//! also reflects environment variables.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::config::{
    Config, DEFAULT_API_URL, DEFAULT_DEBOUNCE_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_SKILLS_LIMIT,
    VALID_KEYS,
};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value in the global config
    Set(SetArgs),

    /// Unset (remove) a configuration value from the global config
    Unset(UnsetArgs),

    /// Show the path to the global configuration file
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Show only the global config file contents
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `devprof config keys`)
    pub key: String,

    /// Value to set
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    if args.global_only {
        let (path, config) = Config::load_global().into_diagnostic()?;
        println!(
            "{} {}",
            style("Global config:").bold(),
            style(path.display()).dim()
        );
        println!();
        print!("{}", serde_yml::to_string(&config).into_diagnostic()?);
        return Ok(());
    }

    let config = load_config(global);

    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        return match config.get(key).into_diagnostic()? {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    print_config_value("api_url", config.api_url.as_deref(), DEFAULT_API_URL);
    print_config_value(
        "timeout_secs",
        config.timeout_secs.map(|v| v.to_string()).as_deref(),
        &DEFAULT_TIMEOUT_SECS.to_string(),
    );
    print_config_value(
        "top_skills_limit",
        config.top_skills_limit.map(|v| v.to_string()).as_deref(),
        &DEFAULT_TOP_SKILLS_LIMIT.to_string(),
    );
    print_config_value(
        "debounce_ms",
        config.debounce_ms.map(|v| v.to_string()).as_deref(),
        &DEFAULT_DEBOUNCE_MS.to_string(),
    );
    print_config_value("default_format", config.default_format.as_deref(), "auto");

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command-line flags (--api-url)");
    println!("  2. Environment variables (DEVPROF_API_URL, DEVPROF_TIMEOUT_SECS)");
    println!("  3. Global config (~/.config/devprof/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    let (path, mut config) = Config::load_global().into_diagnostic()?;
    config.set(&args.key, &args.value).into_diagnostic()?;
    config.save(&path).into_diagnostic()?;

    println!(
        "{} Set {} {} {}",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
    );
    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    let (path, mut config) = Config::load_global().into_diagnostic()?;
    if config.get(&args.key).into_diagnostic()?.is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    config.unset(&args.key).into_diagnostic()?;
    config.save(&path).into_diagnostic()?;

    println!(
        "{} Removed {} from global config",
        style("✓").green(),
        style(&args.key).cyan()
    );
    Ok(())
}

fn run_path() -> Result<()> {
    let path = Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))?;
    println!("{}", path.display());
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'devprof config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

fn print_config_value(key: &str, value: Option<&str>, default: &str) {
    match value {
        Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
        None => println!(
            "  {}: {} {}",
            style(key).cyan(),
            default,
            style("(default)").dim()
        ),
    }
}
