//! Lexical path helpers.
//!
//! Import specifiers are computed before the files they point at exist, so
//! everything here works on path text and never touches the filesystem
//! (except [`project_root`]).

use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

/// Find the project root by walking up from `cwd` looking for `package.json`.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join("package.json").is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Resolve `path` against `base` and normalise `.`/`..` segments.
///
/// An absolute `path` ignores `base`.
#[must_use]
pub fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    base.join(path).clean()
}

/// Compute the relative path leading from directory `from` to `to`.
///
/// Both paths should be absolute (or both relative to the same directory).
#[must_use]
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = from.clean();
    let to = to.clean();
    let from_components: Vec<_> = from
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    let to_components: Vec<_> = to
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();

    let mut common = 0;
    while common < from_components.len()
        && common < to_components.len()
        && from_components[common] == to_components[common]
    {
        common += 1;
    }

    let mut result = PathBuf::new();
    for _ in common..from_components.len() {
        result.push("..");
    }
    for component in &to_components[common..] {
        result.push(component.as_os_str());
    }

    result
}

/// Render a path as an import specifier relative to the directory `from_dir`.
///
/// The result always uses `/` separators and starts with `./` or `../`.
#[must_use]
pub fn module_specifier(from_dir: &Path, to: &Path) -> String {
    let rel = to_slash(&relative_path(from_dir, to));
    if rel.starts_with("../") || rel == ".." {
        rel
    } else if rel.is_empty() {
        ".".to_string()
    } else {
        format!("./{rel}")
    }
}

/// Render a path with `/` separators regardless of platform.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for (i, component) in path.components().enumerate() {
        match component {
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::Prefix(prefix) => {
                out.push_str(&prefix.as_os_str().to_string_lossy());
                continue;
            }
            _ => {}
        }
        if i > 0 && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}

/// Append a textual suffix (such as `.d.ts`) to the final path segment.
#[must_use]
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}
