//! Pre-mutation backups and restore-on-failure.
//!
//! A backup is a byte-exact copy of a store document stored next to it:
//!
//! - `<file>.bak` when that name is free
//! - `<file>.bak.<YYYYMMDD_HHMMSS>` otherwise (plus `-N` if even that is taken)
//!
//! Existing backups are never overwritten, so repeated failed attempts leave
//! distinct recovery points behind. Backups are never deleted here.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

/// Suffix appended to the original file name.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Timestamp format for secondary backup names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Backup and restore errors.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// The file to copy from does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The backup copy could not be made.
    #[error("Failed to create backup: {0}")]
    CreationFailed(String),

    /// The backup could not be copied back over the original.
    #[error("Failed to restore from backup: {0}")]
    RestoreFailed(String),
}

/// A backup file found on disk.
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// Primary backup path for `path`: `<path>.bak`.
#[must_use]
pub fn primary_backup_path(path: &Path) -> PathBuf {
    with_suffix(path, BACKUP_SUFFIX)
}

/// Create a backup of `path`, never overwriting an existing one.
///
/// # Errors
///
/// Returns `SourceNotFound` if `path` does not exist, `CreationFailed` if
/// the copy cannot be written.
pub fn create_backup(path: &Path) -> Result<PathBuf, BackupError> {
    create_backup_at(path, Local::now())
}

/// Like [`create_backup`], with the timestamp for secondary names supplied.
///
/// # Errors
///
/// See [`create_backup`].
pub fn create_backup_at(path: &Path, now: DateTime<Local>) -> Result<PathBuf, BackupError> {
    if !path.exists() {
        return Err(BackupError::SourceNotFound(path.to_path_buf()));
    }

    let backup_path = next_free_backup_path(path, now);
    copy_to_new(path, &backup_path).map_err(|e| {
        BackupError::CreationFailed(format!("{} -> {}: {e}", path.display(), backup_path.display()))
    })?;

    info!(source = %path.display(), backup = %backup_path.display(), "Created backup");
    Ok(backup_path)
}

fn next_free_backup_path(path: &Path, now: DateTime<Local>) -> PathBuf {
    let primary = primary_backup_path(path);
    if !primary.exists() {
        return primary;
    }

    let stamped = with_suffix(path, &format!("{BACKUP_SUFFIX}.{}", now.format(TIMESTAMP_FORMAT)));
    if !stamped.exists() {
        return stamped;
    }

    let mut counter = 1_u32;
    loop {
        let candidate = with_suffix(&stamped, &format!("-{counter}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy `from` into a file that must not exist yet.
fn copy_to_new(from: &Path, to: &Path) -> io::Result<()> {
    let mut source = File::open(from)?;
    let mut target = OpenOptions::new().write(true).create_new(true).open(to)?;
    io::copy(&mut source, &mut target)?;
    target.sync_all()?;
    Ok(())
}

/// Restore `original` from `backup`.
///
/// Whatever currently occupies `original` is removed first, then the backup
/// is copied over it. The backup itself stays in place.
///
/// # Errors
///
/// Returns `SourceNotFound` if the backup does not exist, `RestoreFailed` if
/// the original cannot be removed or rewritten.
pub fn restore(backup: &Path, original: &Path) -> Result<(), BackupError> {
    if !backup.exists() {
        return Err(BackupError::SourceNotFound(backup.to_path_buf()));
    }

    if original.exists() {
        fs::remove_file(original).map_err(|e| {
            BackupError::RestoreFailed(format!("could not remove {}: {e}", original.display()))
        })?;
    }

    fs::copy(backup, original).map_err(|e| {
        BackupError::RestoreFailed(format!("{} -> {}: {e}", backup.display(), original.display()))
    })?;

    warn!(backup = %backup.display(), original = %original.display(), "Restored from backup");
    Ok(())
}

/// List backups of `path`, newest first.
///
/// # Errors
///
/// Returns an I/O error if the containing directory cannot be read.
pub fn list_backups(path: &Path) -> io::Result<Vec<BackupInfo>> {
    let Some(file_name) = path.file_name() else {
        return Ok(Vec::new());
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let primary = with_suffix(Path::new(file_name), BACKUP_SUFFIX)
        .to_string_lossy()
        .into_owned();
    let stamped_prefix = format!("{primary}.");

    let mut backups = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != primary && !name.starts_with(&stamped_prefix) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        backups.push(BackupInfo {
            path: entry.path(),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        });
    }

    backups.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.path.cmp(&a.path)));
    Ok(backups)
}

/// Newest backup of `path`, if any.
///
/// # Errors
///
/// Returns an I/O error if the containing directory cannot be read.
pub fn latest_backup(path: &Path) -> io::Result<Option<PathBuf>> {
    Ok(list_backups(path)?.into_iter().next().map(|b| b.path))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
