//! Writing each pack's `manifest.json`.

use crate::config::BuildConfig;
use crate::error::Result;
use crate::project::{Pack, Project};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where `pack`'s manifest lands under `build_path`.
#[must_use]
pub fn manifest_path(build_path: &Path, pack: &Pack) -> PathBuf {
    pack.stage_path(build_path).join("manifest.json")
}

/// Write the manifest of every pack into the build tree. Returns how many
/// manifests changed.
///
/// # Errors
/// Returns an I/O error if a manifest cannot be written.
pub fn run(config: &BuildConfig, project: &Project) -> Result<usize> {
    let build_path = config.build_path();
    let mut written = 0;

    for pack in &project.packs {
        let path = manifest_path(&build_path, pack);

        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        pack.manifest()
            .serialize(&mut ser)
            .map_err(std::io::Error::from)?;
        buf.push(b'\n');

        if cicada_util::fs::write_if_changed(&path, &buf)? {
            debug!(file = %path.display(), "wrote pack manifest");
            written += 1;
        }
    }

    Ok(written)
}
