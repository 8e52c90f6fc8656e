//! Alias table: logical import patterns mapped to candidate locations.

use super::pattern::Pattern;
use crate::error::{Error, Result};
use crate::manifest::read_jsonc_fresh;
use crate::paths::absolutize;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One place an aliased import may resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: Pattern,
    /// Whether `path` points into the source tree (resolved against the
    /// importing source file) or the destination tree (resolved against the
    /// rewritten file's destination).
    pub is_source: bool,
}

impl Candidate {
    #[must_use]
    pub fn source(path: Pattern) -> Self {
        Self {
            path,
            is_source: true,
        }
    }

    #[must_use]
    pub fn destination(path: Pattern) -> Self {
        Self {
            path,
            is_source: false,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = if self.is_source { "src" } else { "dest" };
        write!(f, "{} ({tree})", self.path)
    }
}

/// Ordered map from alias pattern to candidates.
///
/// Keys keep insertion order and the first matching key wins. Adding
/// candidates to an existing key appends them.
#[derive(Debug, Clone)]
pub struct AliasTable {
    base: PathBuf,
    entries: IndexMap<String, (Pattern, Vec<Candidate>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new("/nonexistent")
    }
}

impl AliasTable {
    /// Create an empty table whose relative candidates resolve against `base`.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            entries: IndexMap::new(),
        }
    }

    /// Load `compilerOptions.baseUrl` and `compilerOptions.paths` from a
    /// compiler config. A missing file yields an empty table.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed or a pattern is malformed.
    pub fn from_tsconfig(path: &Path) -> Result<Self> {
        if !path.is_file() {
            debug!(path = %path.display(), "no path-mapping config, alias table starts empty");
            return Ok(Self::default());
        }

        let config = read_jsonc_fresh(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let options = config.get("compilerOptions");

        let base = options
            .and_then(|o| o.get("baseUrl"))
            .and_then(Value::as_str)
            .map_or_else(|| config_dir.to_path_buf(), |b| absolutize(config_dir, b));

        let mut table = Self::new(base);
        if let Some(paths) = options.and_then(|o| o.get("paths")).and_then(Value::as_object) {
            for (key, targets) in paths {
                let targets = targets.as_array().ok_or_else(|| {
                    Error::configuration(format!(
                        "{}: compilerOptions.paths[\"{key}\"] must be an array",
                        path.display()
                    ))
                })?;
                let mut candidates = Vec::with_capacity(targets.len());
                for target in targets {
                    let target = target.as_str().ok_or_else(|| {
                        Error::configuration(format!(
                            "{}: compilerOptions.paths[\"{key}\"] must contain strings",
                            path.display()
                        ))
                    })?;
                    candidates.push(Candidate::source(Pattern::parse(target)?));
                }
                table.add(key, candidates)?;
            }
        }

        debug!(
            path = %path.display(),
            base = %table.base.display(),
            aliases = table.len(),
            "loaded path-mapping config"
        );
        Ok(table)
    }

    /// Base directory for relative candidate paths.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Append `candidates` to `key`, creating the entry if needed.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if `key` is not a valid pattern.
    pub fn add(&mut self, key: &str, candidates: Vec<Candidate>) -> Result<()> {
        if let Some((_, existing)) = self.entries.get_mut(key) {
            existing.extend(candidates);
        } else {
            let pattern = Pattern::parse(key)?;
            self.entries
                .insert(key.to_string(), (pattern, candidates));
        }
        Ok(())
    }

    /// Append every entry of `aliases`, in order.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if a key is not a valid pattern.
    pub fn add_aliases<I, K>(&mut self, aliases: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Vec<Candidate>)>,
        K: AsRef<str>,
    {
        for (key, candidates) in aliases {
            self.add(key.as_ref(), candidates)?;
        }
        Ok(())
    }

    /// Iterate over `(key pattern, candidates)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, &[Candidate])> {
        self.entries
            .values()
            .map(|(pattern, candidates)| (pattern, candidates.as_slice()))
    }

    /// Candidates registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Candidate]> {
        self.entries.get(key).map(|(_, c)| c.as_slice())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn pat(s: &str) -> Pattern {
        Pattern::parse(s).unwrap()
    }

    #[test]
    fn test_add_appends_to_existing_key() {
        let mut table = AliasTable::new("/p");
        table
            .add("@lib/*", vec![Candidate::source(pat("lib/*"))])
            .unwrap();
        table
            .add_aliases([("@lib/*", vec![Candidate::destination(pat("vendor/*"))])])
            .unwrap();

        assert_eq!(table.len(), 1);
        let candidates = table.get("@lib/*").unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].is_source);
        assert!(!candidates[1].is_source);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut table = AliasTable::new("/p");
        for key in ["z/*", "a/*", "m"] {
            table.add(key, Vec::new()).unwrap();
        }
        let keys: Vec<String> = table.iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(keys, vec!["z/*", "a/*", "m"]);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let mut table = AliasTable::new("/p");
        assert!(matches!(
            table.add("*/*", Vec::new()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_from_tsconfig() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let config = src.join("tsconfig.json");
        fs::write(
            &config,
            r#"{
  // comments are fine here
  "compilerOptions": {
    "baseUrl": ".",
    "paths": {
      "@shared/*": ["shared/*", "../generated/shared/*"],
      "config": ["config/index"],
    }
  }
}"#,
        )
        .unwrap();

        let table = AliasTable::from_tsconfig(&config).unwrap();
        assert_eq!(table.base(), src.as_path());
        let keys: Vec<String> = table.iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(keys, vec!["@shared/*", "config"]);

        let shared = table.get("@shared/*").unwrap();
        assert_eq!(shared.len(), 2);
        assert!(shared.iter().all(|c| c.is_source));
        assert_eq!(shared[1].path.to_string(), "../generated/shared/*");
    }

    #[test]
    fn test_from_tsconfig_missing_file() {
        let dir = tempdir().unwrap();
        let table = AliasTable::from_tsconfig(&dir.path().join("tsconfig.json")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_from_tsconfig_bad_candidate_pattern() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("tsconfig.json");
        fs::write(
            &config,
            r#"{"compilerOptions": {"paths": {"x/*": ["a/*/b/*"]}}}"#,
        )
        .unwrap();
        assert!(matches!(
            AliasTable::from_tsconfig(&config),
            Err(Error::Configuration(_))
        ));
    }
}
