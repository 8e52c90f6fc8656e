//! Build tasks driven by the CLI.

pub mod clean;
pub mod contents;
pub mod json;
pub mod manifests;

pub use clean::{clean, distclean};
pub use contents::ContentsReport;

use crate::config::BuildConfig;
use crate::error::Result;
use crate::project::Project;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What a full build did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub project: String,
    pub archive: String,
    /// Pack manifests (re)written.
    pub manifests: usize,
    pub contents: ContentsReport,
    /// Stale files deleted from the build tree.
    pub removed: usize,
}

/// Load the project, then write pack manifests and populate the build tree
/// concurrently. Files in the build tree that this run did not produce are
/// deleted afterwards.
///
/// # Errors
/// Returns the first error of either task.
pub fn build(config: &BuildConfig) -> Result<BuildReport> {
    let project = Project::load(&config.package_json(), &config.manifest_src())?;
    info!(
        project = %project.name,
        version = %project.version,
        packs = project.packs.len(),
        "building project"
    );

    let (manifests, contents) = rayon::join(
        || manifests::run(config, &project),
        || contents::run(config, &project),
    );

    let (manifests, contents) = (manifests?, contents?);

    let build_path = config.build_path();
    let mut keep: Vec<PathBuf> = project
        .packs
        .iter()
        .map(|pack| manifests::manifest_path(&build_path, pack))
        .collect();
    keep.extend(contents.outputs.iter().cloned());
    let removed = clean::prune(&build_path, &keep)?;

    Ok(BuildReport {
        archive: project.archive_name(),
        project: project.name,
        manifests,
        contents,
        removed,
    })
}
