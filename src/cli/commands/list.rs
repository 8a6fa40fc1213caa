//! `devprof list` command - List, search and sort profiles

use console::style;
use miette::Result;

use crate::cli::helpers::{connect, load_config, resolve_format, runtime};
use crate::cli::table::{profile_row, print_structured, TableConfig, TableFormatter, PROFILE_COLUMNS};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{SearchPipeline, SortKey};

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search text, matched by the service against names, skills and more
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort order
    #[arg(long, value_enum, default_value_t = SortKey::Name)]
    pub sort: SortKey,

    /// List the distinct skills across all profiles instead
    #[arg(long)]
    pub available_skills: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

/// Run the list command
pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let service = connect(&config)?;
    let rt = runtime()?;

    let mut pipeline = SearchPipeline::new(service).with_debounce(config.debounce());
    let (mut profiles, skills, message) = rt.block_on(async {
        if pipeline.load().await.is_err() {
            let message = pipeline.error().unwrap_or_default();
            return Err(miette::miette!("{}", message));
        }

        pipeline.set_sort_key(args.sort);
        if let Some(query) = &args.search {
            pipeline.set_query(query);
            pipeline.wait_idle().await;
        }

        Ok((
            pipeline.view(),
            pipeline.available_skills(),
            pipeline.error(),
        ))
    })?;

    if args.available_skills {
        for skill in &skills {
            println!("{}", skill);
        }
        return Ok(());
    }

    if let Some(limit) = args.limit {
        profiles.truncate(limit);
    }

    if args.count {
        println!("{}", profiles.len());
        return Ok(());
    }

    if profiles.is_empty() {
        if !global.quiet {
            let text = message.unwrap_or_else(|| "No profiles found.".to_string());
            eprintln!("{}", style(text).yellow());
        }
        return Ok(());
    }

    let format = resolve_format(global, &config, OutputFormat::Tsv);
    if print_structured(&profiles, format)? {
        return Ok(());
    }

    let table_config = if global.quiet {
        TableConfig::for_pipe()
    } else {
        TableConfig::default()
    };
    let rows: Vec<Vec<String>> = profiles.iter().map(profile_row).collect();
    TableFormatter::new(PROFILE_COLUMNS, "profile")
        .with_config(table_config)
        .output(&rows, format)
}
