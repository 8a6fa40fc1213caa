//! `devprof new` command - Create a profile from flags or the wizard

use miette::Result;

use crate::cli::helpers::{connect, load_config, report_saved, runtime, submit_form};
use crate::cli::GlobalOpts;
use crate::core::ProfileService;
use crate::entities::LinkPlatform;
use crate::schema::form::{FormError, ProfileForm, ScalarField, SimpleListField};
use crate::schema::wizard::ProfileWizard;

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Use the interactive wizard
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Short description shown on the profile
    #[arg(long)]
    pub description: Option<String>,

    /// Skill (repeatable or comma-separated)
    #[arg(long = "skill", short = 's', value_delimiter = ',')]
    pub skills: Vec<String>,

    /// Education entry (repeatable)
    #[arg(long = "education")]
    pub education: Vec<String>,

    /// GitHub profile URL
    #[arg(long)]
    pub github: Option<String>,

    /// LinkedIn profile URL
    #[arg(long)]
    pub linkedin: Option<String>,

    /// Portfolio URL
    #[arg(long)]
    pub portfolio: Option<String>,
}

impl NewArgs {
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
        for skill in &self.skills {
            form.add_skill(skill)?;
        }
        for entry in &self.education {
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

/// Run the new command
pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let service = connect(&config)?;
    let rt = runtime()?;

    let mut form = ProfileForm::create(service);
    args.apply(&mut form)?;

    let wizard = args.interactive.then(ProfileWizard::new);
    if let Some(wizard) = &wizard {
        wizard.run(&mut form)?;
    }

    let profile = submit_form(&rt, &mut form, wizard.as_ref())?;
    report_saved(global, "Created", &profile);
    Ok(())
}
