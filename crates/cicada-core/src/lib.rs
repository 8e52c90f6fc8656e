#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod manifest;
pub mod paths;
pub mod project;
pub mod rewrite;
pub mod select;
pub mod tasks;
pub mod vendor;
pub mod version;

pub use config::BuildConfig;
pub use error::{Error, Result};
pub use project::{Module, ModuleKind, Pack, PackType, Project};
pub use rewrite::{AliasTable, Candidate, Pattern, RewriteImports, SourceText};
pub use vendor::{StagingPlan, Vendor};
pub use version::VERSION;
