//! The sync state machine.
//!
//! One [`SyncEngine::run`] reads the favorites bar out of the source store,
//! converts it to the destination's native shape and splices it into the
//! destination document. The destination is backed up before anything can
//! touch it, and restored from that backup if any later step fails.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::backup;
use crate::codec::{self, edge, safari, CodecError};
use crate::locate::{find_bar, locate_with, MatchRule};
use crate::merge::{merge_edge, merge_safari, MergeError, Merged, Placement};
use crate::model::{IdGenerator, Store};
use crate::process::AppProbe;
use crate::validate::{validate_store_file, ValidationError};

use super::file::atomic_write;
use super::hash::{content_fingerprint, fingerprint, has_changed};
use super::types::{
    BarSummary, Direction, StorePaths, SyncError, SyncFailure, SyncOptions, SyncPhase, SyncReport,
    SyncResult,
};

/// Runs syncs between the two stores.
pub struct SyncEngine<P> {
    paths: StorePaths,
    probe: P,
    options: SyncOptions,
}

impl<P: AppProbe> SyncEngine<P> {
    #[must_use]
    pub fn new(paths: StorePaths, probe: P) -> Self {
        Self {
            paths,
            probe,
            options: SyncOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one sync in `direction`.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncFailure`] naming the error, the phase it happened in
    /// and any backup created. Failures after the backup was taken have
    /// already been rolled back when this returns, unless the error is
    /// [`SyncError::RestoreFailed`].
    pub fn run(&self, direction: Direction) -> Result<SyncReport, SyncFailure> {
        let source = direction.source();
        let destination = direction.destination();
        let source_path = self.paths.get(source);
        let destination_path = self.paths.get(destination);
        let mut tracker = Tracker::new(destination);

        info!(
            %direction,
            source = %source_path.display(),
            destination = %destination_path.display(),
            dry_run = self.options.dry_run,
            "Starting sync"
        );

        tracker.enter(SyncPhase::Validating);
        if let Err(error) = check_store_file(source, source_path)
            .and_then(|()| check_store_file(destination, destination_path))
        {
            return Err(tracker.fail(error));
        }

        tracker.enter(SyncPhase::BackupChecking);
        if self.probe.is_running(destination) {
            return Err(tracker.fail(SyncError::BrowserRunning(destination)));
        }

        let backup_path = if self.options.dry_run {
            debug!("Dry run; no backup taken");
            None
        } else {
            tracker.enter(SyncPhase::BackingUp);
            match backup::create_backup(destination_path) {
                Ok(path) => Some(path),
                Err(e) => return Err(tracker.fail(SyncError::BackupFailed(e))),
            }
        };

        match self.apply(direction, &mut tracker) {
            Ok(outcome) => {
                tracker.enter(SyncPhase::Done);
                info!(
                    placement = ?outcome.placement,
                    written = outcome.written,
                    "Sync complete"
                );
                Ok(SyncReport {
                    direction,
                    source: source_path.to_path_buf(),
                    destination: destination_path.to_path_buf(),
                    backup_path,
                    bar: outcome.bar,
                    placement: outcome.placement,
                    fingerprint_before: outcome.fingerprint_before,
                    fingerprint_after: outcome.fingerprint_after,
                    changed: outcome.changed,
                    written: outcome.written,
                    dry_run: self.options.dry_run,
                    phases: tracker.trace,
                })
            }
            Err(error) => Err(recover(error, backup_path, destination_path, tracker)),
        }
    }

    /// Converting, Merging and Writing.
    fn apply(&self, direction: Direction, tracker: &mut Tracker) -> SyncResult<Outcome> {
        let source = direction.source();
        let destination = direction.destination();
        let destination_path = self.paths.get(destination);

        tracker.enter(SyncPhase::Converting);
        let forest = codec::decode_file(source, self.paths.get(source)).map_err(codec_failure)?;
        let rule = MatchRule::for_source(source);
        if self.options.strict_bar && find_bar(&forest, &rule).is_none() {
            return Err(SyncError::BarNotFound(source));
        }

        let ids = IdGenerator::default();
        let located = locate_with(forest, &rule, &ids);
        let bar = BarSummary {
            id: located.node.id.clone(),
            title: located.node.title.clone(),
            origin: located.origin.clone(),
            tally: located.node.tally(),
        };

        let current = codec::read_document(destination, destination_path).map_err(codec_failure)?;
        let native = match destination {
            Store::Safari => NativeBar::Safari(safari::native_node(&located.node, &ids)),
            Store::Edge => {
                let document: serde_json::Value =
                    serde_json::from_slice(&current).map_err(|e| SyncError::ParsingFailed {
                        source_name: destination.document_label().to_string(),
                        details: e.to_string(),
                    })?;
                let mut serials = IdGenerator::starting_after(edge::max_serial_id(&document));
                let stamp = edge::chromium_timestamp(Utc::now());
                NativeBar::Edge(edge::native_node(&located.node, &mut serials, &stamp))
            }
        };

        tracker.enter(SyncPhase::Merging);
        let Merged { bytes, placement } = match native {
            NativeBar::Safari(value) => merge_safari(&current, value),
            NativeBar::Edge(value) => merge_edge(&current, value),
        }
        .map_err(merge_failure)?;

        let fingerprint_before = document_fingerprint(destination, &current);
        let fingerprint_after = document_fingerprint(destination, &bytes);
        let changed = has_changed(&fingerprint_after, &fingerprint_before);

        let written = if self.options.dry_run {
            info!(changed, "Dry run; destination not written");
            false
        } else if !changed {
            info!("Destination already up to date");
            false
        } else {
            tracker.enter(SyncPhase::Writing);
            atomic_write(destination_path, &bytes).map_err(|source| SyncError::WriteFailed {
                path: destination_path.to_path_buf(),
                source,
            })?;
            true
        };

        Ok(Outcome {
            bar,
            placement,
            fingerprint_before,
            fingerprint_after,
            changed,
            written,
        })
    }
}

/// Roll back after a failure past the backup point.
fn recover(
    error: SyncError,
    backup_path: Option<PathBuf>,
    destination_path: &Path,
    mut tracker: Tracker,
) -> SyncFailure {
    let failed_in = tracker.phase;
    let Some(backup_path) = backup_path else {
        return tracker.fail(error);
    };

    tracker.enter(SyncPhase::Restoring);
    warn!(%error, phase = %failed_in, backup = %backup_path.display(), "Restoring destination from backup");

    match backup::restore(&backup_path, destination_path) {
        Ok(()) => tracker.fail_in(failed_in, error, Some(backup_path), true),
        Err(restore_error) => {
            error!(
                %error,
                %restore_error,
                backup = %backup_path.display(),
                "CRITICAL: restore failed; destination may be inconsistent"
            );
            let critical = SyncError::RestoreFailed {
                cause: Box::new(error),
                restore_error,
            };
            tracker.fail_in(failed_in, critical, Some(backup_path), false)
        }
    }
}

/// Content fingerprint of a destination document, falling back to its raw
/// bytes when it does not decode.
fn document_fingerprint(store: Store, bytes: &[u8]) -> String {
    match codec::decode(store, bytes) {
        Ok(forest) => content_fingerprint(&forest),
        Err(e) => {
            debug!(%store, error = %e, "Fingerprinting raw bytes");
            fingerprint(bytes)
        }
    }
}

fn check_store_file(store: Store, path: &Path) -> SyncResult<()> {
    validate_store_file(path).map_err(|source| validation_failure(store, path, source))
}

/// Unreadable files are reported as a permission problem of their own.
fn validation_failure(store: Store, path: &Path, source: ValidationError) -> SyncError {
    if source.is_permission() {
        SyncError::PermissionDenied {
            store,
            path: path.to_path_buf(),
        }
    } else {
        SyncError::ValidationFailed { store, source }
    }
}

fn codec_failure(err: CodecError) -> SyncError {
    match err {
        CodecError::Serialize { store, details } => SyncError::SerializationFailed {
            target_name: store.document_label().to_string(),
            details,
        },
        CodecError::Malformed { store, details } => SyncError::ParsingFailed {
            source_name: store.document_label().to_string(),
            details,
        },
        other @ (CodecError::NotFound { .. } | CodecError::Read { .. }) => SyncError::ParsingFailed {
            source_name: other.store().document_label().to_string(),
            details: other.to_string(),
        },
    }
}

fn merge_failure(err: MergeError) -> SyncError {
    match err {
        MergeError::Parse { store, details } => SyncError::ParsingFailed {
            source_name: store.document_label().to_string(),
            details,
        },
        MergeError::Serialize { store, details } => SyncError::SerializationFailed {
            target_name: store.document_label().to_string(),
            details,
        },
    }
}

/// The converted bar in the destination's native shape.
enum NativeBar {
    Safari(plist::Value),
    Edge(serde_json::Value),
}

struct Outcome {
    bar: BarSummary,
    placement: Placement,
    fingerprint_before: String,
    fingerprint_after: String,
    changed: bool,
    written: bool,
}

/// Current phase plus every phase entered so far.
struct Tracker {
    destination: Store,
    phase: SyncPhase,
    trace: Vec<SyncPhase>,
}

impl Tracker {
    fn new(destination: Store) -> Self {
        Self {
            destination,
            phase: SyncPhase::Idle,
            trace: vec![SyncPhase::Idle],
        }
    }

    fn enter(&mut self, phase: SyncPhase) {
        debug!(from = %self.phase, to = %phase, "Sync phase");
        self.phase = phase;
        self.trace.push(phase);
    }

    fn fail(self, error: SyncError) -> SyncFailure {
        let phase = self.phase;
        self.fail_in(phase, error, None, false)
    }

    fn fail_in(
        mut self,
        phase: SyncPhase,
        error: SyncError,
        backup_path: Option<PathBuf>,
        restored: bool,
    ) -> SyncFailure {
        self.enter(SyncPhase::Failed);
        error!(%phase, %error, "Sync failed");
        SyncFailure {
            error,
            destination: self.destination,
            phase,
            backup_path,
            restored,
            phases: self.trace,
        }
    }
}
