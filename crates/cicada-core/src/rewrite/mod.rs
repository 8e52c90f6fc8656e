//! Import-path rewriting.
//!
//! Every import/export specifier in a script is classified and rewritten so
//! the file keeps working once it has been moved to its destination:
//! - Relative specifiers (`./foo`) are resolved next to the source file.
//! - Reserved host-namespace specifiers (`@minecraft/server`) are left alone.
//! - Anything else must match an entry of the [`AliasTable`].

mod alias;
mod pattern;
mod resolve;
mod scan;

pub use alias::{AliasTable, Candidate};
pub use pattern::{Pattern, PatternMatch, WILDCARD};
pub use resolve::{resolve, resolve_with, COMPILED_SUFFIX, DECLARATION_SUFFIX, SOURCE_SUFFIX};
pub use scan::{scan_specifiers, SpecifierKind, SpecifierSpan};

use crate::error::{Error, Result};
use crate::paths::absolutize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Specifier prefixes native to the host runtime; never rewritten.
pub const DEFAULT_RESERVED_PREFIXES: &[&str] = &["@minecraft/"];

/// A unit of script text on its way from the source tree to the destination tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    /// Where the text was read from.
    pub src_path: PathBuf,
    /// Where the rewritten text is going.
    pub dest_path: PathBuf,
    pub contents: String,
}

/// Rewrites specifiers according to an alias table.
///
/// All paths handed to the rewriter should be absolute.
#[derive(Debug, Clone)]
pub struct RewriteImports {
    aliases: AliasTable,
    reserved: Vec<String>,
    /// Destination files that count as existing even before they are written.
    planned: HashSet<PathBuf>,
}

impl Default for RewriteImports {
    fn default() -> Self {
        Self::new(AliasTable::default())
    }
}

impl RewriteImports {
    #[must_use]
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            aliases,
            reserved: DEFAULT_RESERVED_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            planned: HashSet::new(),
        }
    }

    /// Treat `outputs` as existing files during resolution.
    #[must_use]
    pub fn with_planned_outputs<I>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.planned.extend(outputs);
        self
    }

    fn exists(&self, path: &Path) -> bool {
        self.planned.contains(path) || path.exists()
    }

    /// Replace the reserved host-namespace prefixes.
    #[must_use]
    pub fn with_reserved_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Append alias entries; candidates for an existing key are appended to it.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if a key is not a valid pattern.
    pub fn add_aliases<I, K>(&mut self, aliases: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Vec<Candidate>)>,
        K: AsRef<str>,
    {
        self.aliases.add_aliases(aliases)
    }

    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Rewrite one unit of text. The destination path is carried through.
    ///
    /// # Errors
    /// Returns [`Error::UnresolvedImport`] or [`Error::Configuration`] for
    /// a symbolic specifier that cannot be resolved.
    pub fn rewrite(&self, unit: SourceText) -> Result<SourceText> {
        let contents = self.rewrite_source(&unit.contents, &unit.src_path, &unit.dest_path)?;
        Ok(SourceText { contents, ..unit })
    }

    /// Read `src_root/relative`, rewrite it for `dest_root/relative`.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be read or is not UTF-8, or any error of
    /// [`RewriteImports::rewrite`].
    pub fn rewrite_file(
        &self,
        src_root: &Path,
        relative: &Path,
        dest_root: &Path,
    ) -> Result<SourceText> {
        let src_path = src_root.join(relative);
        let contents = std::fs::read_to_string(&src_path)?;
        self.rewrite(SourceText {
            dest_path: dest_root.join(relative),
            src_path,
            contents,
        })
    }

    /// Rewrite every specifier in `source`, leaving all other bytes intact.
    ///
    /// # Errors
    /// See [`RewriteImports::rewrite`].
    pub fn rewrite_source(&self, source: &str, src_path: &Path, dest_path: &Path) -> Result<String> {
        let mut out = String::with_capacity(source.len());
        let mut copied = 0;

        for span in scan_specifiers(source) {
            let original = span.text(source);
            let rewritten = match self.rewrite_specifier(original, src_path, dest_path) {
                // A literal `import()` is often guarded; leave a missing target to the runtime.
                Err(Error::UnresolvedImport { .. }) if span.kind == SpecifierKind::Dynamic => {
                    warn!(
                        file = %src_path.display(),
                        specifier = original,
                        "left unresolved dynamic import unchanged"
                    );
                    original.to_string()
                }
                other => other?,
            };
            out.push_str(&source[copied..span.start]);
            out.push_str(&rewritten);
            copied = span.end;
            if rewritten != original {
                trace!(
                    file = %src_path.display(),
                    from = original,
                    to = %rewritten,
                    "rewrote specifier"
                );
            }
        }

        out.push_str(&source[copied..]);
        Ok(out)
    }

    /// Rewrite a single specifier found in `src_path`, destined for `dest_path`.
    ///
    /// # Errors
    /// See [`RewriteImports::rewrite`].
    pub fn rewrite_specifier(&self, spec: &str, src_path: &Path, dest_path: &Path) -> Result<String> {
        if spec.starts_with('.') {
            Ok(self.rewrite_relative(spec, src_path))
        } else if self.reserved.iter().any(|p| spec.starts_with(p.as_str())) {
            Ok(spec.to_string())
        } else {
            self.rewrite_symbolic(spec, src_path, dest_path)
        }
    }

    fn rewrite_relative(&self, spec: &str, src_path: &Path) -> String {
        let src_dir = src_path.parent().unwrap_or(Path::new("/"));
        let base = absolutize(src_dir, spec);
        // The target may live in another root or not be generated yet.
        resolve_with(spec, src_path, &base, |p| self.exists(p)).unwrap_or_else(|| spec.to_string())
    }

    fn rewrite_symbolic(&self, spec: &str, src_path: &Path, dest_path: &Path) -> Result<String> {
        for (key, candidates) in self.aliases.iter() {
            let Some(matched) = key.matches(spec) else {
                continue;
            };

            for candidate in candidates {
                let target = match &matched {
                    PatternMatch::Exact => {
                        if candidate.path.has_wildcard() {
                            return Err(Error::configuration(format!(
                                "Invalid path candidate for exact alias {key}: {}",
                                candidate.path
                            )));
                        }
                        candidate.path.to_string()
                    }
                    PatternMatch::Captured(value) => {
                        if !candidate.path.has_wildcard() {
                            return Err(Error::configuration(format!(
                                "Invalid path candidate for wildcard alias {key}: {}",
                                candidate.path
                            )));
                        }
                        candidate.path.substitute(value)
                    }
                };

                let base = absolutize(self.aliases.base(), target);
                let anchor = if candidate.is_source { src_path } else { dest_path };
                if let Some(resolved) = resolve_with(spec, anchor, &base, |p| self.exists(p)) {
                    return Ok(resolved);
                }
            }

            return Err(Error::UnresolvedImport {
                importer: src_path.to_path_buf(),
                specifier: spec.to_string(),
                candidates: candidates.iter().map(ToString::to_string).collect(),
            });
        }

        Err(Error::UnresolvedImport {
            importer: src_path.to_path_buf(),
            specifier: spec.to_string(),
            candidates: Vec::new(),
        })
    }
}
