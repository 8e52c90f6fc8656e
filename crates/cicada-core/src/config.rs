use crate::rewrite::DEFAULT_RESERVED_PREFIXES;
use crate::vendor::EXCLUDED_PACKAGES_BY_DEFAULT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a build reads from and writes to, plus the knobs that change how
/// imports are rewritten and which dependencies are vendored.
///
/// Every directory is relative to `root` unless it is absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Project root (the directory holding `package.json`).
    pub root: PathBuf,

    /// Source tree.
    pub src_dir: PathBuf,

    /// Output of the contents task.
    pub build_dir: PathBuf,

    /// Output of external translators (TypeScript, protocol buffers).
    pub generated_dir: PathBuf,

    /// Path-mapping config seeding the alias table.
    pub tsconfig: PathBuf,

    /// Specifier prefixes that are never rewritten.
    pub reserved_prefixes: Vec<String>,

    /// Packages never vendored.
    pub exclude: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

impl BuildConfig {
    /// Create a config with the conventional layout under `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            src_dir: PathBuf::from("src"),
            build_dir: PathBuf::from("dist/build"),
            generated_dir: PathBuf::from("dist/generated"),
            tsconfig: PathBuf::from("src/tsconfig.json"),
            reserved_prefixes: DEFAULT_RESERVED_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            exclude: EXCLUDED_PACKAGES_BY_DEFAULT
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Set the project root.
    #[must_use]
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    /// Set the source tree.
    #[must_use]
    pub fn with_src_dir(mut self, dir: PathBuf) -> Self {
        self.src_dir = dir;
        self
    }

    /// Set the build output directory.
    #[must_use]
    pub fn with_build_dir(mut self, dir: PathBuf) -> Self {
        self.build_dir = dir;
        self
    }

    /// Set the directory external translators write to.
    #[must_use]
    pub fn with_generated_dir(mut self, dir: PathBuf) -> Self {
        self.generated_dir = dir;
        self
    }

    /// Set the path-mapping config.
    #[must_use]
    pub fn with_tsconfig(mut self, path: PathBuf) -> Self {
        self.tsconfig = path;
        self
    }

    /// Replace the reserved prefixes. An empty list keeps the defaults.
    #[must_use]
    pub fn with_reserved_prefixes(mut self, prefixes: Vec<String>) -> Self {
        if !prefixes.is_empty() {
            self.reserved_prefixes = prefixes;
        }
        self
    }

    /// Exclude more packages from vendoring, on top of the defaults.
    #[must_use]
    pub fn with_excluded(mut self, packages: Vec<String>) -> Self {
        for pkg in packages {
            if !self.exclude.contains(&pkg) {
                self.exclude.push(pkg);
            }
        }
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        crate::paths::absolutize(&self.root, path)
    }

    #[must_use]
    pub fn package_json(&self) -> PathBuf {
        self.root.join("package.json")
    }

    /// The project manifest source, `manifest.json` in the source tree.
    #[must_use]
    pub fn manifest_src(&self) -> PathBuf {
        self.src_path().join("manifest.json")
    }

    #[must_use]
    pub fn src_path(&self) -> PathBuf {
        self.resolve(&self.src_dir)
    }

    #[must_use]
    pub fn build_path(&self) -> PathBuf {
        self.resolve(&self.build_dir)
    }

    #[must_use]
    pub fn generated_path(&self) -> PathBuf {
        self.resolve(&self.generated_dir)
    }

    #[must_use]
    pub fn tsconfig_path(&self) -> PathBuf {
        self.resolve(&self.tsconfig)
    }

    /// The directory `distclean` removes.
    #[must_use]
    pub fn dist_path(&self) -> PathBuf {
        self.root.join("dist")
    }
}
