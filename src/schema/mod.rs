//! Schema system - draft validation, form sessions and the interactive wizard

pub mod form;
pub mod validator;
pub mod wizard;

pub use form::{FormError, FormMode, FormState, ProfileForm};
pub use validator::{validate, Field, ValidationErrors, ValidationFailed};
pub use wizard::ProfileWizard;
