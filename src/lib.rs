//! devprof: developer profile directory client
//!
//! Client-side orchestration for a remote developer-profile service:
//! draft validation, the create/edit form lifecycle, debounced search with
//! local sorting, and a per-skill project cache for profile detail views.

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
