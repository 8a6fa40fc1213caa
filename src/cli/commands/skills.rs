//! `devprof skills` command - Most used skills, globally or for one profile

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{connect, load_config, resolve_format, runtime};
use crate::cli::table::{print_structured, skill_rows, TableConfig, TableFormatter, SKILL_COLUMNS};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{ProfileId, ProfileService};

#[derive(clap::Args, Debug)]
pub struct SkillsArgs {
    /// How many skills to show (default: top_skills_limit from config)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Rank skills within one profile's projects instead
    #[arg(long, short = 'p')]
    pub profile: Option<ProfileId>,
}

/// Run the skills command
pub fn run(args: SkillsArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let service = connect(&config)?;
    let rt = runtime()?;
    let limit = args.limit.unwrap_or_else(|| config.top_skills_limit());

    let entries = rt
        .block_on(async {
            match &args.profile {
                Some(id) => service.profile_top_skills(id, limit).await,
                None => service.top_skills(limit).await,
            }
        })
        .into_diagnostic()?;

    if entries.is_empty() {
        if !global.quiet {
            println!("{}", style("No skills found.").dim());
        }
        return Ok(());
    }

    let format = resolve_format(global, &config, OutputFormat::Tsv);
    if print_structured(&entries, format)? {
        return Ok(());
    }

    if format == OutputFormat::Id {
        for entry in &entries {
            println!("{}", entry.skill);
        }
        return Ok(());
    }

    let table_config = if global.quiet {
        TableConfig::for_pipe()
    } else {
        TableConfig::default()
    };
    TableFormatter::new(SKILL_COLUMNS, "skill")
        .with_config(table_config)
        .output(&skill_rows(&entries), format)
}
