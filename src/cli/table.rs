//! Table formatting utilities for CLI list commands
//!
//! Profiles, projects and skill rankings share one output path: rows of
//! plain strings rendered as an aligned terminal table, CSV, a markdown
//! table, or bare ids.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::entities::{Profile, Project, SkillTopEntry};

/// One column of a table
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    /// Key used as the CSV header
    pub key: &'static str,
    /// Header shown in terminal and markdown output
    pub header: &'static str,
    /// Maximum terminal width before truncation
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

pub const PROFILE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 26),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("headline", "HEADLINE", 24),
    ColumnDef::new("email", "EMAIL", 28),
    ColumnDef::new("skills", "SKILLS", 40),
];

pub const PROJECT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("title", "TITLE", 28),
    ColumnDef::new("skills", "SKILLS", 30),
    ColumnDef::new("description", "DESCRIPTION", 50),
    ColumnDef::new("links", "LINKS", 40),
];

pub const SKILL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("rank", "#", 4),
    ColumnDef::new("skill", "SKILL", 30),
    ColumnDef::new("count", "PROJECTS", 8),
];

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after table (e.g., "5 profile(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// Create config optimized for piping (no summary)
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// Renders rows of cells in any tabular output format
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Output rows in the specified format
    ///
    /// `Id` prints the first column of every row.
    pub fn output(&self, rows: &[Vec<String>], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => self.output_csv(rows),
            OutputFormat::Md => {
                self.output_md(rows);
                Ok(())
            }
            OutputFormat::Id => {
                for row in rows {
                    println!("{}", row.first().map(String::as_str).unwrap_or_default());
                }
                Ok(())
            }
            _ => {
                self.output_tsv(rows);
                Ok(())
            }
        }
    }

    /// Column widths sized to content, capped at each column's width
    fn calculate_widths(&self, rows: &[Vec<String>]) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|v| v.chars().count())
                    .max()
                    .unwrap_or(0);
                col.header.len().max(max_content).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[Vec<String>]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let value = row.get(i).map(String::as_str).unwrap_or("-");
                    let value = if value.is_empty() { "-" } else { value };
                    let text = truncate_str(value, *w);
                    if i == 0 {
                        format!("{:<width$}", style(text).cyan(), width = *w)
                    } else {
                        format!("{:<width$}", text, width = *w)
                    }
                })
                .collect();
            println!("{}", cells.join(" "));
        }

        if self.config.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[Vec<String>]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        writer
            .write_record(self.columns.iter().map(|c| c.key))
            .into_diagnostic()?;
        for row in rows {
            writer.write_record(row).into_diagnostic()?;
        }
        writer.flush().into_diagnostic()?;
        Ok(())
    }

    fn output_md(&self, rows: &[Vec<String>]) {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header));
        for row in rows {
            builder.push_record(row.iter().cloned());
        }
        println!("{}", builder.build().with(Style::markdown()));
    }
}

pub fn profile_row(profile: &Profile) -> Vec<String> {
    vec![
        profile
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        profile.name.clone(),
        profile.headline().to_string(),
        profile.email.clone(),
        profile.skills.join(", "),
    ]
}

pub fn project_row(project: &Project) -> Vec<String> {
    vec![
        project.title.clone(),
        project.skills.join(", "),
        project.description.clone(),
        project.links.join(" "),
    ]
}

pub fn skill_rows(entries: &[SkillTopEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            vec![
                (rank + 1).to_string(),
                entry.skill.clone(),
                entry.count.to_string(),
            ]
        })
        .collect()
}

/// Print any serializable value as JSON or YAML
///
/// Returns `false` for formats that are not structured serializations.
pub fn print_structured<T: serde::Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}
