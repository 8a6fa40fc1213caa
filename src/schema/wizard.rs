//! Interactive wizard for filling in a profile form
//!
//! The wizard never touches a [`Profile`](crate::entities::Profile)
//! directly: every answer goes through the [`ProfileForm`] operations, so
//! the same edit rules apply as for flag-driven input. In edit mode each
//! prompt defaults to the draft's current value; since an empty answer
//! keeps that default, optional fields take `-` to clear them.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::core::service::ProfileService;
use crate::entities::LinkPlatform;
use crate::schema::form::{
    FormError, FormMode, NestedCollection, NestedField, NestedItem, ProfileForm, ProjectKey,
    ScalarField, SimpleListField, WorkKey,
};
use crate::schema::validator::Field;

/// Answer that clears an optional field which has a current value
pub const CLEAR_MARKER: &str = "-";

/// Prompt-driven front end for a [`ProfileForm`]
pub struct ProfileWizard {
    theme: ColorfulTheme,
}

impl ProfileWizard {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Walk through every section of the form
    pub fn run<S: ProfileService + ?Sized>(&self, form: &mut ProfileForm<S>) -> Result<()> {
        let heading = match form.mode() {
            FormMode::Create => "Creating new developer profile",
            FormMode::Edit => "Editing developer profile",
        };
        println!();
        println!("{} {}", style("◆").cyan(), style(heading).bold());
        println!("{}", style("─".repeat(50)).dim());
        println!();

        self.prompt_scalar(form, ScalarField::Name, "Name", true)?;
        self.prompt_scalar(form, ScalarField::Email, "Email", true)?;
        self.prompt_scalar(form, ScalarField::Description, "About", false)?;
        self.prompt_skills(form)?;
        self.prompt_education(form)?;
        self.prompt_nested(form, NestedCollection::Projects)?;
        self.prompt_nested(form, NestedCollection::Work)?;
        self.prompt_links(form)?;

        println!();
        println!("{} Values collected!", style("✓").green());
        Ok(())
    }

    /// Show the current field errors and re-ask only those fields
    pub fn fix_errors<S: ProfileService + ?Sized>(&self, form: &mut ProfileForm<S>) -> Result<()> {
        let fields: Vec<Field> = form.errors().keys().copied().collect();
        if fields.is_empty() {
            return Ok(());
        }

        println!();
        for (field, message) in form.errors() {
            println!("  {} {}: {}", style("✗").red(), style(field).cyan(), message);
        }
        println!();

        for field in fields {
            match field {
                Field::Name => self.prompt_scalar(form, ScalarField::Name, "Name", true)?,
                Field::Email => self.prompt_scalar(form, ScalarField::Email, "Email", true)?,
                Field::Skills => self.prompt_skills(form)?,
            }
        }
        Ok(())
    }

    /// Ask whether to resend after a service failure
    pub fn confirm_retry(&self, error: &FormError) -> Result<bool> {
        println!("{} {}", style("✗").red(), error);
        Confirm::with_theme(&self.theme)
            .with_prompt("Try again? Your answers are kept")
            .default(true)
            .interact()
            .into_diagnostic()
    }

    fn prompt_scalar<S: ProfileService + ?Sized>(
        &self,
        form: &mut ProfileForm<S>,
        field: ScalarField,
        label: &str,
        required: bool,
    ) -> Result<()> {
        let current = form
            .draft()
            .map(|d| match field {
                ScalarField::Name => d.name.clone(),
                ScalarField::Email => d.email.clone(),
                ScalarField::Description => d.description.clone().unwrap_or_default(),
            })
            .unwrap_or_default();

        let value = self.ask(label, &current, !required)?;
        form.set_scalar_field(field, &value)?;
        Ok(())
    }

    fn prompt_skills<S: ProfileService + ?Sized>(&self, form: &mut ProfileForm<S>) -> Result<()> {
        let current: Vec<String> = form.draft().map(|d| d.skills.clone()).unwrap_or_default();
        if !current.is_empty() {
            println!("  {} {}", style("Skills:").dim(), current.join(", "));
            let keep = Confirm::with_theme(&self.theme)
                .with_prompt("Keep these skills?")
                .default(true)
                .interact()
                .into_diagnostic()?;
            if !keep {
                for index in (0..current.len()).rev() {
                    form.remove_skill(index)?;
                }
            }
        }

        loop {
            let skill = self.ask("Add skill (empty to finish)", "", true)?;
            if skill.trim().is_empty() {
                break;
            }
            if !form.add_skill(&skill)? {
                println!("  {} already listed", style(skill.trim()).yellow());
            }
        }
        Ok(())
    }

    fn prompt_education<S: ProfileService + ?Sized>(
        &self,
        form: &mut ProfileForm<S>,
    ) -> Result<()> {
        let current: Vec<String> = form.draft().map(|d| d.education.clone()).unwrap_or_default();
        let mut cursor = 0;
        for entry in &current {
            let value = self.ask("Education", entry, true)?;
            if value.trim().is_empty() {
                form.remove_simple_list_item(SimpleListField::Education, cursor)?;
            } else {
                form.set_simple_list_item(SimpleListField::Education, cursor, &value)?;
                cursor += 1;
            }
        }

        loop {
            let entry = self.ask("Add education (empty to finish)", "", true)?;
            if entry.trim().is_empty() {
                break;
            }
            form.append_simple_list_item(SimpleListField::Education, &entry)?;
        }
        Ok(())
    }

    /// Keep, edit or remove each existing entry, then add new ones
    fn prompt_nested<S: ProfileService + ?Sized>(
        &self,
        form: &mut ProfileForm<S>,
        collection: NestedCollection,
    ) -> Result<()> {
        let labels: Vec<String> = form
            .draft()
            .map(|d| match collection {
                NestedCollection::Projects => d.projects.iter().map(|p| p.title.clone()).collect(),
                NestedCollection::Work => d
                    .work
                    .iter()
                    .map(|w| format!("{} at {}", w.role, w.company))
                    .collect(),
            })
            .unwrap_or_default();

        let mut cursor = 0;
        for label in &labels {
            let action = Select::with_theme(&self.theme)
                .with_prompt(format!("{} entry \"{}\"", collection, label))
                .items(&["keep", "edit", "remove"])
                .default(0)
                .interact()
                .into_diagnostic()?;
            match action {
                1 => {
                    self.prompt_entry(form, collection, cursor)?;
                    cursor += 1;
                }
                2 => form.remove_nested_item(collection, cursor)?,
                _ => cursor += 1,
            }
        }

        let add = match collection {
            NestedCollection::Projects => "Add a project?",
            NestedCollection::Work => "Add work experience?",
        };
        while self.confirm(add)? {
            form.append_nested_item(NestedItem::template(collection))?;
            self.prompt_entry(form, collection, cursor)?;
            cursor += 1;
        }
        Ok(())
    }

    /// Prompt every key of one composite entry
    fn prompt_entry<S: ProfileService + ?Sized>(
        &self,
        form: &mut ProfileForm<S>,
        collection: NestedCollection,
        index: usize,
    ) -> Result<()> {
        for field in collection.fields() {
            let current = form.nested_value(*field, index).unwrap_or_default();
            let (label, required) = nested_prompt(*field);
            let value = self.ask(&format!("  {}", label), &current, !required)?;
            form.set_nested_field(*field, index, &value)?;
        }
        Ok(())
    }

    fn prompt_links<S: ProfileService + ?Sized>(&self, form: &mut ProfileForm<S>) -> Result<()> {
        for platform in LinkPlatform::all() {
            let current = form
                .draft()
                .and_then(|d| d.links.get(*platform).map(str::to_string))
                .unwrap_or_default();
            let value = self.ask(&format!("{} URL", platform), &current, true)?;
            form.set_link(*platform, &value)?;
        }
        Ok(())
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .into_diagnostic()
    }

    /// Ask for a line of text
    ///
    /// On an optional field with a current value, answering
    /// [`CLEAR_MARKER`] yields an empty string.
    fn ask(&self, prompt: &str, default: &str, allow_empty: bool) -> Result<String> {
        let clearable = allow_empty && !default.is_empty();
        let prompt = if clearable {
            format!("{} ({} to clear)", prompt, CLEAR_MARKER)
        } else {
            prompt.to_string()
        };

        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(allow_empty);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        let answer = input.interact_text().into_diagnostic()?;
        Ok(if clearable { cleared(answer) } else { answer })
    }
}

fn cleared(answer: String) -> String {
    if answer.trim() == CLEAR_MARKER {
        String::new()
    } else {
        answer
    }
}

/// Prompt label and whether the key must be non-empty
fn nested_prompt(field: NestedField) -> (&'static str, bool) {
    match field {
        NestedField::Project(ProjectKey::Title) => ("Title", true),
        NestedField::Project(ProjectKey::Description) => ("Description", false),
        NestedField::Project(ProjectKey::Links) => ("Links (comma-separated)", false),
        NestedField::Project(ProjectKey::Skills) => ("Skills used (comma-separated)", false),
        NestedField::Work(WorkKey::Company) => ("Company", true),
        NestedField::Work(WorkKey::Role) => ("Role", true),
        NestedField::Work(WorkKey::Duration) => ("Duration", false),
        NestedField::Work(WorkKey::Description) => ("Description", false),
    }
}

impl Default for ProfileWizard {
    fn default() -> Self {
        Self::new()
    }
}
