//! `devprof show` command - Profile detail with per-skill project tabs

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use miette::{IntoDiagnostic, Result};
use tokio::runtime::Runtime;

use crate::cli::helpers::{connect, load_config, resolve_format, runtime};
use crate::cli::table::{print_structured, project_row, TableFormatter, PROJECT_COLUMNS};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{DetailSession, HttpProfileService, ProfileId, SkillTab, TabStatus};
use crate::entities::{Profile, Project};

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Profile id
    pub id: ProfileId,

    /// Print the projects of this skill tab ("all" for every project)
    #[arg(long)]
    pub skill: Option<String>,

    /// Browse skill tabs interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

type Session = DetailSession<HttpProfileService>;

/// Run the show command
pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let service = connect(&config)?;
    let rt = runtime()?;

    let session = rt
        .block_on(DetailSession::open(
            service,
            args.id.clone(),
            config.top_skills_limit(),
        ))
        .into_diagnostic()?;
    let Some(mut session) = session else {
        return Err(miette::miette!("No profile found with id '{}'", args.id));
    };

    let format = resolve_format(global, &config, OutputFormat::Auto);

    if args.interactive {
        return browse(&rt, &mut session);
    }

    if let Some(skill) = args.skill.as_deref() {
        let projects = load_tab(&rt, &mut session, SkillTab::from(skill))?;
        if print_structured(&projects, format)? {
            return Ok(());
        }
        if projects.is_empty() {
            println!("No projects for {}.", style(skill).yellow());
            return Ok(());
        }
        let rows: Vec<Vec<String>> = projects.iter().map(project_row).collect();
        return TableFormatter::new(PROJECT_COLUMNS, "project").output(&rows, format);
    }

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            print_structured(session.profile(), format)?;
        }
        OutputFormat::Id => println!("{}", session.id()),
        _ => print_card(&session),
    }
    Ok(())
}

/// Select a tab and wait for its projects
fn load_tab(rt: &Runtime, session: &mut Session, tab: SkillTab) -> Result<Vec<Project>> {
    let label = tab.to_string();
    rt.block_on(async {
        session.cache_mut().select_tab(tab.clone());
        session.cache_mut().wait_idle().await;
    });

    match session.cache().status(tab) {
        TabStatus::Failed(message) => Err(miette::miette!(
            "Failed to load projects for {}: {}",
            label,
            message
        )),
        _ => Ok(session.cache().active_projects()),
    }
}

fn print_card(session: &Session) {
    let profile: &Profile = session.profile();

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(session.id()).cyan());
    println!("{}: {}", style("Name").bold(), style(&profile.name).yellow());
    println!("{}: {}", style("Headline").bold(), profile.headline());
    println!("{}: {}", style("Email").bold(), profile.email);
    if !profile.skills.is_empty() {
        println!("{}: {}", style("Skills").bold(), profile.skills.join(", "));
    }
    println!("{}", style("─".repeat(60)).dim());

    if let Some(description) = &profile.description {
        println!();
        println!("{}", description);
    }

    if !profile.work.is_empty() {
        println!();
        println!("{}", style("Work:").bold());
        for job in &profile.work {
            let duration = if job.duration.is_empty() {
                String::new()
            } else {
                format!(" ({})", job.duration)
            };
            println!("  • {} at {}{}", job.role, job.company, style(duration).dim());
        }
    }

    if !profile.education.is_empty() {
        println!();
        println!("{}", style("Education:").bold());
        for entry in &profile.education {
            println!("  • {}", entry);
        }
    }

    let links: Vec<String> = profile
        .links
        .iter()
        .map(|(platform, url)| format!("{}: {}", platform, url))
        .collect();
    if !links.is_empty() {
        println!();
        println!("{}", style("Links:").bold());
        for link in links {
            println!("  {}", link);
        }
    }

    println!();
    let tabs: Vec<String> = session.tabs().iter().map(ToString::to_string).collect();
    println!(
        "{}: {} ({} project(s) in all)",
        style("Tabs").dim(),
        tabs.join(" | "),
        profile.projects.len()
    );
}

/// Interactive tab browser backed by the session's project cache
fn browse(rt: &Runtime, session: &mut Session) -> Result<()> {
    let theme = ColorfulTheme::default();
    print_card(session);

    loop {
        let tabs = session.tabs();
        let mut items: Vec<String> = tabs
            .iter()
            .map(|tab| match session.cache().status(tab.clone()) {
                TabStatus::Loaded(projects) => format!("{} ({})", tab, projects.len()),
                TabStatus::Failed(_) => format!("{} (failed)", tab),
                _ => tab.to_string(),
            })
            .collect();
        items.push("quit".to_string());

        let choice = Select::with_theme(&theme)
            .with_prompt("Projects by skill")
            .items(&items)
            .default(0)
            .interact()
            .into_diagnostic()?;
        let Some(tab) = tabs.get(choice).cloned() else {
            return Ok(());
        };

        let label = tab.to_string();
        if matches!(session.cache().status(tab.clone()), TabStatus::Failed(_)) {
            let retry = Confirm::with_theme(&theme)
                .with_prompt(format!("Loading {} failed before. Retry?", label))
                .default(true)
                .interact()
                .into_diagnostic()?;
            if retry {
                rt.block_on(async {
                    session.cache_mut().retry_tab(&label);
                    session.cache_mut().wait_idle().await;
                });
            }
        }

        match load_tab(rt, session, tab) {
            Ok(projects) if projects.is_empty() => {
                println!("{}", style("No projects.").dim());
            }
            Ok(projects) => {
                let rows: Vec<Vec<String>> = projects.iter().map(project_row).collect();
                TableFormatter::new(PROJECT_COLUMNS, "project").output(&rows, OutputFormat::Tsv)?;
            }
            Err(e) => println!("{} {}", style("✗").red(), e),
        }
        println!();
    }
}
