//! Atomic file writes
//!
//! Content goes to a `<name>.tmp` sibling first (`session-history.json` is
//! staged as `session-history.json.tmp`), is synced, then renamed over the
//! destination, so a crash leaves either the old or the new file on disk.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Suffix of the staging files this store leaves behind on a crash
const TEMP_SUFFIX: &str = ".json.tmp";

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace `path` with `content`
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}

/// Remove `*.json.tmp` files left behind by interrupted writes
///
/// Other files in `dir`, including unrelated `.tmp` files, are left alone.
pub fn cleanup_temp_files<P: AsRef<Path>>(dir: P) -> io::Result<usize> {
    let dir = dir.as_ref();
    let mut cleaned = 0;

    if !dir.exists() {
        return Ok(0);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let staged = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.len() > TEMP_SUFFIX.len() && n.ends_with(TEMP_SUFFIX))
            .unwrap_or(false);
        if staged && path.is_file() {
            fs::remove_file(&path)?;
            cleaned += 1;
        }
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        atomic_write(&path, "first").unwrap();
        atomic_write(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_dir.path().join("session.json.tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("session.json");

        atomic_write(&path, "nested").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "nested");
    }

    #[test]
    fn test_cleanup_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.json.tmp"), "x").unwrap();
        fs::write(temp_dir.path().join("keep.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("editor-swap.tmp"), "not ours").unwrap();

        assert_eq!(cleanup_temp_files(temp_dir.path()).unwrap(), 1);
        assert!(!temp_dir.path().join("a.json.tmp").exists());
        assert!(temp_dir.path().join("keep.json").exists());
        assert!(temp_dir.path().join("editor-swap.tmp").exists());
        assert_eq!(cleanup_temp_files(temp_dir.path().join("missing")).unwrap(), 0);
    }
}
