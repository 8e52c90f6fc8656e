//! Guessing which physical file an extensionless specifier will end up as.

use crate::paths::{module_specifier, with_suffix};
use std::path::Path;

/// Suffix of declaration-only files; these have no runtime counterpart.
pub const DECLARATION_SUFFIX: &str = ".d.ts";
/// Suffix of sources that the translator turns into [`COMPILED_SUFFIX`] files.
pub const SOURCE_SUFFIX: &str = ".ts";
/// Suffix of runtime modules.
pub const COMPILED_SUFFIX: &str = ".js";

/// Resolve a candidate `base` path for the specifier `original`.
///
/// The returned specifier is relative to the directory of `anchor`:
/// 1. `base` itself exists: point at it.
/// 2. `base.d.ts` exists: keep `original` untouched.
/// 3. `base.ts` or `base.js` exists: point at `base.js`.
/// 4. Otherwise `None`.
#[must_use]
pub fn resolve(original: &str, anchor: &Path, base: &Path) -> Option<String> {
    resolve_with(original, anchor, base, Path::exists)
}

/// [`resolve`] with a custom existence test, for files that are known to be
/// produced but may not have been written yet.
pub fn resolve_with<F>(original: &str, anchor: &Path, base: &Path, exists: F) -> Option<String>
where
    F: Fn(&Path) -> bool,
{
    let anchor_dir = anchor.parent().unwrap_or(Path::new("/"));

    if exists(base) {
        return Some(module_specifier(anchor_dir, base));
    }

    if exists(&with_suffix(base, DECLARATION_SUFFIX)) {
        return Some(original.to_string());
    }

    let compiled = with_suffix(base, COMPILED_SUFFIX);
    if exists(&with_suffix(base, SOURCE_SUFFIX)) || exists(&compiled) {
        return Some(module_specifier(anchor_dir, &compiled));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_exact_file_wins() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("data.json"), "{}").unwrap();

        let resolved = resolve("./data.json", &src.join("a.ts"), &src.join("data.json"));
        assert_eq!(resolved.as_deref(), Some("./data.json"));
    }

    #[test]
    fn test_source_sibling_becomes_compiled() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("foo.ts"), "export {}").unwrap();

        let resolved = resolve("./foo", &src.join("a.ts"), &src.join("foo"));
        assert_eq!(resolved.as_deref(), Some("./foo.js"));
    }

    #[test]
    fn test_compiled_sibling() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("bar.js"), "export {}").unwrap();

        let anchor = dir.path().join("src").join("deep").join("a.ts");
        let resolved = resolve("@lib/bar", &anchor, &lib.join("bar"));
        assert_eq!(resolved.as_deref(), Some("../../lib/bar.js"));
    }

    #[test]
    fn test_declaration_keeps_original() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("foo.d.ts"), "export {}").unwrap();

        let resolved = resolve("./foo", &src.join("a.ts"), &src.join("foo"));
        assert_eq!(resolved.as_deref(), Some("./foo"));
    }

    #[test]
    fn test_declaration_checked_before_source() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("foo.d.ts"), "").unwrap();
        fs::write(src.join("foo.ts"), "").unwrap();

        let resolved = resolve("./foo", &src.join("a.ts"), &src.join("foo"));
        assert_eq!(resolved.as_deref(), Some("./foo"));
    }

    #[test]
    fn test_nothing_found() {
        let dir = tempdir().unwrap();
        let resolved = resolve("./missing", &dir.path().join("a.ts"), &dir.path().join("missing"));
        assert!(resolved.is_none());
    }

    #[test]
    fn test_custom_existence() {
        let planned = Path::new("/out/vendor/lib/index.js");
        let resolved = resolve_with(
            "lib",
            Path::new("/out/scripts/main.js"),
            planned,
            |p| p == planned,
        );
        assert_eq!(resolved.as_deref(), Some("../vendor/lib/index.js"));
    }
}
