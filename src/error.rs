//! Error types for favsync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=validation, 6=sync, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::backup::BackupError;
use crate::codec::CodecError;
use crate::model::Store;
use crate::sync::{SyncError, SyncFailure};
use crate::validate::ValidationError;

/// Result type alias for favsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not Found (exit 3)
    StoreNotFound,
    BackupNotFound,

    // Validation (exit 4)
    ValidationFailed,
    BarNotFound,
    InvalidArgument,

    // Permission (exit 5)
    PermissionDenied,

    // Sync (exit 6)
    BrowserRunning,
    BackupFailed,
    ParsingFailed,
    SerializationFailed,
    WriteFailed,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Critical (exit 9)
    RestoreFailed,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::StoreNotFound => "STORE_NOT_FOUND",
            Self::BackupNotFound => "BACKUP_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::BarNotFound => "BAR_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::BrowserRunning => "BROWSER_RUNNING",
            Self::BackupFailed => "BACKUP_FAILED",
            Self::ParsingFailed => "PARSING_FAILED",
            Self::SerializationFailed => "SERIALIZATION_FAILED",
            Self::WriteFailed => "WRITE_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::RestoreFailed => "RESTORE_FAILED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::StoreNotFound | Self::BackupNotFound => 3,
            Self::ValidationFailed | Self::BarNotFound | Self::InvalidArgument => 4,
            Self::PermissionDenied => 5,
            Self::BrowserRunning
            | Self::BackupFailed
            | Self::ParsingFailed
            | Self::SerializationFailed
            | Self::WriteFailed => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::RestoreFailed => 9,
        }
    }

    /// Whether re-running after a fix on the user's side can succeed.
    ///
    /// True when the fix is outside the documents themselves: closing a
    /// browser, granting file access or correcting an argument.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BrowserRunning | Self::PermissionDenied | Self::InvalidArgument
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in favsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] SyncFailure),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No backups found for {}", path.display())]
    NoBackups { store: Store, path: PathBuf },

    #[error("{} is running. Close it first", .0.app_name())]
    BrowserRunning(Store),

    #[error("Could not determine the {} file location", .0.document_label())]
    StorePathUnresolved(Store),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Sync(failure) => sync_code(&failure.error),
            Self::Codec(err) => match err {
                CodecError::NotFound { .. } => ErrorCode::StoreNotFound,
                CodecError::Read { .. } => ErrorCode::IoError,
                CodecError::Malformed { .. } => ErrorCode::ParsingFailed,
                CodecError::Serialize { .. } => ErrorCode::SerializationFailed,
            },
            Self::Backup(err) => match err {
                BackupError::SourceNotFound(_) => ErrorCode::BackupNotFound,
                BackupError::CreationFailed(_) => ErrorCode::BackupFailed,
                BackupError::RestoreFailed(_) => ErrorCode::RestoreFailed,
            },
            Self::Validation(err) => validation_code(err),
            Self::NoBackups { .. } => ErrorCode::BackupNotFound,
            Self::BrowserRunning(_) => ErrorCode::BrowserRunning,
            Self::StorePathUnresolved(_) | Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Whether a store may have been left inconsistent.
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        match self {
            Self::Sync(failure) => failure.error.is_critical(),
            _ => false,
        }
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Sync(failure) => sync_hint(failure),

            Self::BrowserRunning(store) => Some(browser_hint(*store)),

            Self::Codec(CodecError::NotFound { store, .. }) | Self::StorePathUnresolved(store) => {
                Some(path_hint(*store))
            }

            Self::Validation(ValidationError::NotReadable(_)) => Some(permission_hint()),

            Self::NoBackups { store, .. } => Some(format!(
                "Backups are created by `favsync sync` before {} is modified.",
                store.document_label()
            )),

            Self::Backup(BackupError::RestoreFailed(_)) => Some(
                "The store file may be inconsistent. Copy the backup over it manually.".to_string(),
            ),

            Self::Config(_) => Some("Check ~/.favsync/config.json".to_string()),

            Self::Codec(_)
            | Self::Backup(_)
            | Self::Validation(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, optional
    /// recovery hint and, for sync failures, the backup that was created.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        if let Self::Sync(failure) = self {
            obj["error"]["phase"] = serde_json::json!(failure.phase);
            obj["error"]["restored"] = serde_json::json!(failure.restored);
            obj["error"]["backup_path"] = serde_json::json!(failure.backup_path);
        }

        obj
    }
}

const fn sync_code(error: &SyncError) -> ErrorCode {
    match error {
        SyncError::ValidationFailed { source, .. } => validation_code(source),
        SyncError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
        SyncError::BrowserRunning(_) => ErrorCode::BrowserRunning,
        SyncError::BackupFailed(_) => ErrorCode::BackupFailed,
        SyncError::BarNotFound(_) => ErrorCode::BarNotFound,
        SyncError::ParsingFailed { .. } => ErrorCode::ParsingFailed,
        SyncError::SerializationFailed { .. } => ErrorCode::SerializationFailed,
        SyncError::WriteFailed { .. } => ErrorCode::WriteFailed,
        SyncError::RestoreFailed { .. } => ErrorCode::RestoreFailed,
    }
}

const fn validation_code(error: &ValidationError) -> ErrorCode {
    match error {
        ValidationError::NotFound(_) => ErrorCode::StoreNotFound,
        ValidationError::NotReadable(_) => ErrorCode::PermissionDenied,
        ValidationError::Empty(_) | ValidationError::NotAFile(_) => ErrorCode::ValidationFailed,
    }
}

fn sync_hint(failure: &SyncFailure) -> Option<String> {
    let restore_cmd = |backup: &PathBuf| {
        format!(
            "favsync restore {} --from '{}'",
            failure.destination,
            backup.display()
        )
    };

    match &failure.error {
        SyncError::BrowserRunning(store) => Some(browser_hint(*store)),
        SyncError::PermissionDenied { .. } => Some(permission_hint()),
        SyncError::ValidationFailed {
            store,
            source: ValidationError::NotFound(_),
        } => Some(path_hint(*store)),
        SyncError::BarNotFound(store) => Some(format!(
            "Run `favsync inspect {store}` to see its root folders, or sync without --strict-bar \
             to wrap them all into a new bar."
        )),
        SyncError::RestoreFailed { .. } => failure.backup_path.as_ref().map(|backup| {
            format!(
                "The {} file may be inconsistent. Restore it manually:\n  {}",
                failure.destination.document_label(),
                restore_cmd(backup)
            )
        }),
        _ if failure.restored => failure.backup_path.as_ref().map(|backup| {
            format!(
                "{} was restored from {}. Nothing was changed.",
                failure.destination.document_label(),
                backup.display()
            )
        }),
        _ => None,
    }
}

fn browser_hint(store: Store) -> String {
    format!(
        "Quit {} completely (not just its windows), then run the command again.",
        store.app_name()
    )
}

fn permission_hint() -> String {
    "Grant your terminal Full Disk Access in System Settings > Privacy & Security, then retry."
        .to_string()
}

fn path_hint(store: Store) -> String {
    let (flag, env) = match store {
        Store::Edge => ("--edge", crate::config::EDGE_PATH_ENV),
        Store::Safari => ("--safari", crate::config::SAFARI_PATH_ENV),
    };
    format!("Pass {flag} <path> or set {env} to the {} file.", store.document_label())
}
