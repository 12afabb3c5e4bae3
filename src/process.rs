//! Browser process detection.
//!
//! Writing a store document while its browser is open races with the
//! browser's own writes, so the sync engine asks an [`AppProbe`] first.

use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::model::Store;

/// Answers whether the application owning a store is running.
pub trait AppProbe {
    fn is_running(&self, store: Store) -> bool;
}

impl<P: AppProbe + ?Sized> AppProbe for Box<P> {
    fn is_running(&self, store: Store) -> bool {
        (**self).is_running(store)
    }
}

/// The system probe, or [`AssumeClosed`] when the caller vouches that both
/// browsers are shut down.
#[must_use]
pub fn probe(assume_closed: bool) -> Box<dyn AppProbe> {
    if assume_closed {
        Box::new(AssumeClosed)
    } else {
        Box::new(SystemProbe)
    }
}

/// Probe backed by `pgrep -x` against the store's known process names.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl AppProbe for SystemProbe {
    fn is_running(&self, store: Store) -> bool {
        store.process_names().iter().any(|name| {
            match Command::new("pgrep")
                .args(["-x", name])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                Ok(status) => {
                    debug!(process = name, running = status.success(), "Checked process");
                    status.success()
                }
                Err(e) => {
                    warn!(process = name, error = %e, "pgrep unavailable; assuming not running");
                    false
                }
            }
        })
    }
}

/// Probe that reports every application as closed.
///
/// Used when the caller has already made sure the browsers are shut down.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeClosed;

impl AppProbe for AssumeClosed {
    fn is_running(&self, _store: Store) -> bool {
        false
    }
}
