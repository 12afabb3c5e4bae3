//! Sync types: direction, phases, errors and the run report.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::backup::BackupError;
use crate::locate::BarOrigin;
use crate::merge::Placement;
use crate::model::{Store, Tally};
use crate::validate::ValidationError;

/// Which store is read and which is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    EdgeToSafari,
    SafariToEdge,
}

impl Direction {
    /// The store the bar is read from.
    #[must_use]
    pub const fn source(&self) -> Store {
        match self {
            Self::EdgeToSafari => Store::Edge,
            Self::SafariToEdge => Store::Safari,
        }
    }

    /// The store that is modified.
    #[must_use]
    pub const fn destination(&self) -> Store {
        self.source().counterpart()
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EdgeToSafari => "edge-to-safari",
            Self::SafariToEdge => "safari-to-edge",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "edge-to-safari" | "e2s" => Ok(Self::EdgeToSafari),
            "safari-to-edge" | "s2e" => Ok(Self::SafariToEdge),
            _ => Err(format!(
                "Unknown direction: {s} (expected edge-to-safari or safari-to-edge)"
            )),
        }
    }
}

/// Orchestrator states.
///
/// ```text
/// Idle → Validating → BackupChecking → BackingUp → Converting → Merging → Writing → Done
///                                          └──── any failure ────→ Restoring → Failed
/// ```
///
/// Failures before `BackingUp` go straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Validating,
    BackupChecking,
    BackingUp,
    Converting,
    Merging,
    Writing,
    Restoring,
    Done,
    Failed,
}

impl SyncPhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::BackupChecking => "backup_checking",
            Self::BackingUp => "backing_up",
            Self::Converting => "converting",
            Self::Merging => "merging",
            Self::Writing => "writing",
            Self::Restoring => "restoring",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that end a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A store file is missing, empty or otherwise unusable.
    #[error("Validation failed for {} file: {source}", store.document_label())]
    ValidationFailed {
        store: Store,
        #[source]
        source: ValidationError,
    },

    /// A store file exists but cannot be read.
    #[error("Permission denied reading {} file: {}", store.document_label(), path.display())]
    PermissionDenied { store: Store, path: PathBuf },

    /// The destination's browser is open.
    #[error("{} is running. Close it before syncing", .0.app_name())]
    BrowserRunning(Store),

    /// The pre-mutation backup could not be made.
    #[error("Backup failed: {0}")]
    BackupFailed(#[source] BackupError),

    /// No favorites bar in the source and wrapping is disabled.
    #[error("Favorites bar not found in {}", .0.document_label())]
    BarNotFound(Store),

    /// A document could not be decoded.
    #[error("Failed to parse {source_name}: {details}")]
    ParsingFailed { source_name: String, details: String },

    /// A document could not be encoded.
    #[error("Failed to serialize {target_name}: {details}")]
    SerializationFailed { target_name: String, details: String },

    /// The merged document could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Restoring after a failure also failed. The destination may be inconsistent.
    #[error(
        "CRITICAL: restore failed after error ({cause}); restore error: {restore_error}. \
         The destination file may be inconsistent"
    )]
    RestoreFailed {
        cause: Box<SyncError>,
        restore_error: BackupError,
    },
}

impl SyncError {
    /// Whether the destination may be left in an undefined state.
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self, Self::RestoreFailed { .. })
    }
}

/// Result type for engine-internal steps.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// A failed run: the error plus where it happened and which backup exists.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct SyncFailure {
    #[source]
    pub error: SyncError,
    /// Store that was being written.
    pub destination: Store,
    /// Phase that raised the error.
    pub phase: SyncPhase,
    /// Backup created during this run, if any.
    pub backup_path: Option<PathBuf>,
    /// Whether the destination was restored from `backup_path`.
    pub restored: bool,
    /// Phases entered, ending with `Failed`.
    pub phases: Vec<SyncPhase>,
}

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Run every step up to the write, but skip backup and write.
    pub dry_run: bool,
    /// Fail with `BarNotFound` instead of wrapping the whole forest.
    pub strict_bar: bool,
}

/// Resolved locations of both store documents.
#[derive(Debug, Clone, Serialize)]
pub struct StorePaths {
    pub edge: PathBuf,
    pub safari: PathBuf,
}

impl StorePaths {
    #[must_use]
    pub fn get(&self, store: Store) -> &Path {
        match store {
            Store::Edge => &self.edge,
            Store::Safari => &self.safari,
        }
    }
}

/// Summary of the bar that was synced.
#[derive(Debug, Clone, Serialize)]
pub struct BarSummary {
    pub id: String,
    pub title: String,
    pub origin: BarOrigin,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub direction: Direction,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub backup_path: Option<PathBuf>,
    pub bar: BarSummary,
    pub placement: Placement,
    /// Content fingerprint of the destination before the merge.
    pub fingerprint_before: String,
    /// Content fingerprint of the merged destination.
    pub fingerprint_after: String,
    /// Whether the bookmarks (titles, addresses, order) differ.
    /// Identifiers are not compared.
    pub changed: bool,
    pub written: bool,
    pub dry_run: bool,
    pub phases: Vec<SyncPhase>,
}
