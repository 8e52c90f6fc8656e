//! Removing build outputs.

use crate::config::BuildConfig;
use crate::error::Result;
use path_clean::PathClean;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Remove the build and generated trees. Returns the directories that
/// existed and were removed.
///
/// # Errors
/// Returns an I/O error if a directory cannot be removed.
pub fn clean(config: &BuildConfig) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for dir in [config.build_path(), config.generated_path()] {
        if remove_tree(&dir)? {
            removed.push(dir);
        }
    }
    Ok(removed)
}

/// Remove every build output, `dist` included. Returns `false` if there was
/// nothing to remove.
///
/// # Errors
/// Returns an I/O error if the output directory cannot be removed.
pub fn distclean(config: &BuildConfig) -> Result<bool> {
    remove_tree(&config.dist_path())
}

/// Delete every file under `root` that is not in `keep`, then any directory
/// left empty. Returns how many files were deleted.
///
/// # Errors
/// Returns an I/O error if the tree cannot be walked or a file removed.
pub fn prune(root: &Path, keep: &[PathBuf]) -> Result<usize> {
    let keep: HashSet<PathBuf> = keep.iter().map(|p| p.clean()).collect();

    let mut removed = 0;
    for rel in cicada_util::fs::list_files(root)? {
        let path = root.join(&rel).clean();
        if !keep.contains(&path) {
            fs::remove_file(&path)?;
            debug!(file = %path.display(), "removed stale output");
            removed += 1;
        }
    }
    cicada_util::fs::remove_empty_dirs(root)?;

    if removed > 0 {
        info!(dir = %root.display(), removed, "pruned stale outputs");
    }
    Ok(removed)
}

fn remove_tree(dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(dir)?;
    info!(dir = %dir.display(), "removed build outputs");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_clean_keeps_rest_of_dist() {
        let dir = tempdir().unwrap();
        let config = BuildConfig::new(dir.path().to_path_buf());
        touch(&config.build_path().join("scripts/main.js"));
        touch(&config.generated_path().join("scripts/gen.js"));
        touch(&config.dist_path().join("demo-1.0.0.mcpack"));

        assert_eq!(
            clean(&config).unwrap(),
            vec![config.build_path(), config.generated_path()]
        );
        assert!(!config.build_path().exists());
        assert!(!config.generated_path().exists());
        assert!(config.dist_path().join("demo-1.0.0.mcpack").is_file());
        assert!(clean(&config).unwrap().is_empty());
    }

    #[test]
    fn test_distclean() {
        let dir = tempdir().unwrap();
        let config = BuildConfig::new(dir.path().to_path_buf());
        touch(&config.build_path().join("scripts/main.js"));
        touch(&config.dist_path().join("demo-1.0.0.mcpack"));

        assert!(distclean(&config).unwrap());
        assert!(!config.dist_path().exists());
        assert!(!distclean(&config).unwrap());
    }

    #[test]
    fn test_prune() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("build");
        touch(&root.join("scripts/main.js"));
        touch(&root.join("scripts/old/gone.js"));
        touch(&root.join("manifest.json"));

        let keep = vec![root.join("scripts/main.js"), root.join("./manifest.json")];
        assert_eq!(prune(&root, &keep).unwrap(), 1);
        assert!(root.join("scripts/main.js").is_file());
        assert!(root.join("manifest.json").is_file());
        assert!(!root.join("scripts/old").exists());
        assert_eq!(prune(&dir.path().join("missing"), &keep).unwrap(), 0);
    }
}
