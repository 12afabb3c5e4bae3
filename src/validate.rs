//! Store file validation.
//!
//! A store document is usable when it exists, can be opened for reading and
//! holds at least one byte. An unreadable file is reported separately so the
//! caller can ask for elevated file access instead of a generic failure.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Why a store file cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("File is not readable: {}", .0.display())]
    NotReadable(PathBuf),

    #[error("File is empty: {}", .0.display())]
    Empty(PathBuf),

    #[error("Not a regular file: {}", .0.display())]
    NotAFile(PathBuf),
}

impl ValidationError {
    /// Whether this is the permission flavour of failure.
    #[must_use]
    pub const fn is_permission(&self) -> bool {
        matches!(self, Self::NotReadable(_))
    }
}

/// Check that `path` is an existing, readable, non-empty regular file.
///
/// # Errors
///
/// Returns the first condition that does not hold.
pub fn validate_store_file(path: &Path) -> Result<(), ValidationError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => ValidationError::NotReadable(path.to_path_buf()),
        _ => ValidationError::NotFound(path.to_path_buf()),
    })?;

    if !metadata.is_file() {
        return Err(ValidationError::NotAFile(path.to_path_buf()));
    }

    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ValidationError::NotFound(path.to_path_buf()),
        _ => ValidationError::NotReadable(path.to_path_buf()),
    })?;

    if metadata.len() == 0 {
        return Err(ValidationError::Empty(path.to_path_buf()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Bookmarks");
        fs::write(&path, b"{}").unwrap();
        assert!(validate_store_file(&path).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_store_file(&temp_dir.path().join("Bookmarks"));
        assert!(matches!(result, Err(ValidationError::NotFound(_))));
    }

    #[test]
    fn test_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Bookmarks");
        fs::write(&path, b"").unwrap();
        assert!(matches!(validate_store_file(&path), Err(ValidationError::Empty(_))));
    }

    #[test]
    fn test_directory_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_store_file(temp_dir.path());
        assert!(matches!(result, Err(ValidationError::NotAFile(_))));
        assert!(!result.unwrap_err().is_permission());
    }
}
