//! `devprof edit` command - Change an existing profile
//!
//! The profile is fetched, loaded into an edit-mode form, changed through
//! flags or the wizard, and the whole record is sent back.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{connect, load_config, report_saved, runtime, submit_form};
use crate::cli::GlobalOpts;
use crate::core::{ProfileId, ProfileService};
use crate::entities::LinkPlatform;
use crate::schema::form::{FormError, ProfileForm, ScalarField, SimpleListField};
use crate::schema::wizard::ProfileWizard;

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Profile id
    pub id: ProfileId,

    /// Use the interactive wizard, prefilled with current values
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// New full name
    #[arg(long)]
    pub name: Option<String>,

    /// New contact email
    #[arg(long)]
    pub email: Option<String>,

    /// New description (empty to clear)
    #[arg(long)]
    pub description: Option<String>,

    /// Skill to add (repeatable or comma-separated)
    #[arg(long = "add-skill", value_delimiter = ',')]
    pub add_skills: Vec<String>,

    /// Skill to remove (repeatable or comma-separated)
    #[arg(long = "remove-skill", value_delimiter = ',')]
    pub remove_skills: Vec<String>,

    /// Education entry to add (repeatable)
    #[arg(long = "add-education")]
    pub add_education: Vec<String>,

    /// GitHub profile URL (empty to clear)
    #[arg(long)]
    pub github: Option<String>,

    /// LinkedIn profile URL (empty to clear)
    #[arg(long)]
    pub linkedin: Option<String>,

    /// Portfolio URL (empty to clear)
    #[arg(long)]
    pub portfolio: Option<String>,
}

impl EditArgs {
    fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.description.is_some()
            || !self.add_skills.is_empty()
            || !self.remove_skills.is_empty()
            || !self.add_education.is_empty()
            || self.github.is_some()
            || self.linkedin.is_some()
            || self.portfolio.is_some()
    }

    /// Copy flag values into the form
    fn apply<S: ProfileService + ?Sized>(&self, form: &mut ProfileForm<S>) -> Result<(), FormError> {
        if let Some(name) = &self.name {
            form.set_scalar_field(ScalarField::Name, name)?;
        }
        if let Some(email) = &self.email {
            form.set_scalar_field(ScalarField::Email, email)?;
        }
        if let Some(description) = &self.description {
            form.set_scalar_field(ScalarField::Description, description)?;
        }

        for skill in &self.remove_skills {
            let index = form
                .draft()
                .and_then(|d| d.skills.iter().position(|s| s == skill.trim()));
            match index {
                Some(index) => {
                    form.remove_skill(index)?;
                }
                None => eprintln!(
                    "{} skill {} is not on this profile",
                    style("!").yellow(),
                    style(skill).cyan()
                ),
            }
        }
        for skill in &self.add_skills {
            form.add_skill(skill)?;
        }

        for entry in &self.add_education {
            form.append_simple_list_item(SimpleListField::Education, entry)?;
        }

        let links = [
            (LinkPlatform::Github, &self.github),
            (LinkPlatform::Linkedin, &self.linkedin),
            (LinkPlatform::Portfolio, &self.portfolio),
        ];
        for (platform, value) in links {
            if let Some(value) = value {
                form.set_link(platform, value)?;
            }
        }
        Ok(())
    }
}

/// Run the edit command
pub fn run(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    if !args.interactive && !args.has_changes() {
        return Err(miette::miette!(
            "Nothing to change. Pass field flags (see --help) or use -i"
        ));
    }

    let config = load_config(global);
    let service = connect(&config)?;
    let rt = runtime()?;

    let current = rt
        .block_on(service.get_profile(&args.id))
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("No profile found with id '{}'", args.id))?;

    let mut form = ProfileForm::edit(service, &current)?;
    args.apply(&mut form)?;

    let wizard = args.interactive.then(ProfileWizard::new);
    if let Some(wizard) = &wizard {
        wizard.run(&mut form)?;
    }

    let profile = submit_form(&rt, &mut form, wizard.as_ref())?;
    report_saved(global, "Updated", &profile);
    Ok(())
}
