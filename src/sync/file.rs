//! Atomic whole-file replacement.
//!
//! The content goes to a temp file next to the target, is synced to disk and
//! then renamed over the target. An interrupted write leaves either the old
//! document or the new one, never a truncated mix.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Replace `path` with `content` atomically.
///
/// The existing file's permissions are carried over to the replacement.
///
/// # Errors
///
/// Returns an error if any file operation fails. The temp file is removed
/// and the original is left untouched in that case.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let result = write_and_rename(path, &temp_path, content);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(path: &Path, temp_path: &Path, content: &[u8]) -> io::Result<()> {
    {
        let file = File::create(temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        // Sync to disk before rename
        writer.get_ref().sync_all()?;
    }

    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp_path, metadata.permissions())?;
    }

    fs::rename(temp_path, path)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(".favsync.tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Bookmarks.plist");
        fs::write(&path, b"old content that is longer").unwrap();

        atomic_write(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Default").join("Bookmarks");

        atomic_write(&path, b"{}").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_atomic_write_failure_keeps_original() {
        let temp_dir = TempDir::new().unwrap();
        // Renaming a file over a non-empty directory fails
        let path = temp_dir.path().join("Bookmarks");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        assert!(atomic_write(&path, b"new").is_err());
        assert!(path.join("keep").exists());
        assert!(!temp_path_for(&path).exists());
    }
}
