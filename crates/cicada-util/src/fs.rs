use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use walkdir::WalkDir;

use crate::hash::{blake3_bytes, blake3_file};

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Atomically write bytes to a file by writing to a temp file then renaming.
///
/// Missing parent directories are created first. The file will either have
/// the old contents or the new contents, never a partial write.
///
/// # Errors
/// Returns an error if the write or rename fails.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    // Same directory keeps the rename on one filesystem
    let mut temp_path = parent.to_path_buf();
    temp_path.push(format!(
        ".{}.tmp.{}.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    match fs::rename(&temp_path, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            // On Windows, rename can fail if target exists. Try copy + remove as fallback.
            if cfg!(windows) {
                fs::copy(&temp_path, path)?;
                let _ = fs::remove_file(&temp_path);
                Ok(())
            } else {
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }
}

/// Write `bytes` to `path` unless the file already holds the same content.
///
/// Returns `true` if the file was written. Unchanged files keep their
/// modification time, so a later tree diff sees nothing to synchronise.
///
/// # Errors
/// Returns an error if the existing file cannot be read or the write fails.
pub fn write_if_changed(path: &Path, bytes: &[u8]) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == bytes.len() as u64 => {
            if blake3_file(path)? == blake3_bytes(bytes) {
                return Ok(false);
            }
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    atomic_write(path, bytes)?;
    Ok(true)
}

/// List every regular file under `root`, as paths relative to `root`.
///
/// The result is sorted so callers see a deterministic order. A missing
/// `root` yields an empty list.
///
/// # Errors
/// Returns an error if a directory under `root` cannot be read.
pub fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Remove every empty directory below `root`, deepest first. `root` itself
/// is kept. Returns how many directories were removed.
///
/// # Errors
/// Returns an error if a directory cannot be read or removed.
pub fn remove_empty_dirs(root: &Path) -> io::Result<usize> {
    if !root.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_dir() && fs::read_dir(entry.path())?.next().is_none() {
            fs::remove_dir(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("test.js");

        atomic_write(&path, b"hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");

        atomic_write(&path, b"world").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "world");
    }

    #[test]
    fn test_atomic_write_no_temp_left_on_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");

        atomic_write(&path, b"content").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].as_ref().unwrap().file_name().to_str().unwrap(),
            "test.txt"
        );
    }

    #[test]
    fn test_write_if_changed_skips_identical_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.js");

        assert!(write_if_changed(&path, b"export {};").unwrap());
        assert!(!write_if_changed(&path, b"export {};").unwrap());
        assert!(write_if_changed(&path, b"export { a };").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "export { a };");
    }

    #[test]
    fn test_list_files_sorted_relative() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lib").join("sub")).unwrap();
        fs::write(dir.path().join("lib").join("sub").join("b.js"), "").unwrap();
        fs::write(dir.path().join("lib").join("a.js"), "").unwrap();
        fs::write(dir.path().join("index.js"), "").unwrap();

        let files = list_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("index.js"),
                PathBuf::from("lib").join("a.js"),
                PathBuf::from("lib").join("sub").join("b.js"),
            ]
        );
    }

    #[test]
    fn test_list_files_missing_root() {
        let dir = tempdir().unwrap();
        let files = list_files(&dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_remove_empty_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b").join("c")).unwrap();
        fs::create_dir_all(dir.path().join("keep")).unwrap();
        fs::write(dir.path().join("keep").join("file.js"), "").unwrap();

        assert_eq!(remove_empty_dirs(dir.path()).unwrap(), 3);
        assert!(!dir.path().join("a").exists());
        assert!(dir.path().join("keep").join("file.js").is_file());
        assert!(dir.path().is_dir());
        assert_eq!(remove_empty_dirs(&dir.path().join("missing")).unwrap(), 0);
    }
}
