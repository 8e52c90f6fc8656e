//! Selecting files under a root by glob patterns.

use crate::error::{Error, Result};
use crate::paths::to_slash;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A set of include globs, matched against `/`-separated relative paths.
#[derive(Debug, Clone, Default)]
pub struct FileSelector {
    patterns: Vec<Pattern>,
}

impl FileSelector {
    /// # Errors
    /// Returns [`Error::Configuration`] for a malformed glob.
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self> {
        let patterns = globs
            .iter()
            .map(|g| {
                Pattern::new(g.as_ref()).map_err(|e| {
                    Error::configuration(format!("Invalid glob {:?}: {e}", g.as_ref()))
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self { patterns })
    }

    /// Whether `relative` matches at least one pattern.
    #[must_use]
    pub fn matches(&self, relative: &Path) -> bool {
        let rel = to_slash(relative);
        self.patterns
            .iter()
            .any(|p| p.as_str() == "**" || p.matches_with(&rel, MATCH_OPTIONS))
    }

    /// Every matching file under `root`, relative to it and sorted. A
    /// missing root selects nothing.
    ///
    /// # Errors
    /// Returns an I/O error if `root` cannot be walked.
    pub fn select(&self, root: &Path) -> Result<Vec<PathBuf>> {
        Ok(cicada_util::fs::list_files(root)?
            .into_iter()
            .filter(|rel| self.matches(rel))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_matches() {
        let selector = FileSelector::new(&["scripts/**/*.js", "texts/*.lang"]).unwrap();
        assert!(selector.matches(Path::new("scripts/main.js")));
        assert!(selector.matches(Path::new("scripts/a/b/c.js")));
        assert!(selector.matches(Path::new("texts/en_US.lang")));
        assert!(!selector.matches(Path::new("texts/sub/en_US.lang")));
        assert!(!selector.matches(Path::new("scripts/main.ts")));
    }

    #[test]
    fn test_everything() {
        let selector = FileSelector::new(&["**"]).unwrap();
        assert!(selector.matches(Path::new("a/b/c")));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(matches!(
            FileSelector::new(&["a/[b"]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_select_sorted() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("lib/inner")).unwrap();
        fs::write(root.join("lib/z.js"), "").unwrap();
        fs::write(root.join("lib/inner/a.js"), "").unwrap();
        fs::write(root.join("other.js"), "").unwrap();

        let selector = FileSelector::new(&["lib/**"]).unwrap();
        let files = selector.select(root).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("lib/inner/a.js"), PathBuf::from("lib/z.js")]
        );
        assert!(selector.select(&root.join("missing")).unwrap().is_empty());
    }
}
