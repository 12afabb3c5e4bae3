//! Favorites bar sync between the Edge and Safari stores.
//!
//! - **Engine**: the validate → backup → convert → merge → write state machine
//! - **File**: atomic whole-file replacement of the destination
//! - **Hash**: SHA-256 content fingerprints to skip no-op writes
//!
//! # Example
//!
//! ```ignore
//! use favsync::process::SystemProbe;
//! use favsync::sync::{Direction, StorePaths, SyncEngine};
//!
//! let engine = SyncEngine::new(paths, SystemProbe);
//! match engine.run(Direction::EdgeToSafari) {
//!     Ok(report) => println!("placed bar: {:?}", report.placement),
//!     Err(failure) => eprintln!("{failure} (backup: {:?})", failure.backup_path),
//! }
//! ```

mod engine;
mod file;
mod hash;
mod types;

pub use engine::SyncEngine;
pub use file::atomic_write;
pub use hash::{content_fingerprint, fingerprint, has_changed};
pub use types::{
    BarSummary, Direction, StorePaths, SyncError, SyncFailure, SyncOptions, SyncPhase, SyncReport,
    SyncResult,
};
