//! Restore command implementation.
//!
//! Copies a backup back over a store document. The current document is
//! backed up first, so a restore can itself be undone.

use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::backup;
use crate::config::{self, ASSUME_CLOSED_ENV};
use crate::error::{Error, Result};
use crate::model::Store;
use crate::process::{self, AppProbe};

#[derive(Serialize)]
struct RestoreOutput<'a> {
    store: Store,
    path: &'a PathBuf,
    restored_from: &'a PathBuf,
    previous_backup: Option<&'a PathBuf>,
}

/// Execute the restore command.
///
/// # Errors
///
/// Returns `BrowserRunning` while the store's browser is open, `NoBackups`
/// when there is nothing to restore, or the backup error.
pub fn execute(
    store: Store,
    from: Option<&PathBuf>,
    assume_closed: bool,
    edge: Option<&PathBuf>,
    safari: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let config = config::load_config()?;
    let path = super::resolve_one(store, edge, safari, &config)?;

    let backup_path = match from {
        Some(from) => from.clone(),
        None => backup::latest_backup(&path)?.ok_or_else(|| Error::NoBackups {
            store,
            path: path.clone(),
        })?,
    };

    let assume_closed = assume_closed || config::env_flag(ASSUME_CLOSED_ENV);
    if process::probe(assume_closed).is_running(store) {
        return Err(Error::BrowserRunning(store));
    }

    if !backup_path.exists() {
        return Err(backup::BackupError::SourceNotFound(backup_path).into());
    }

    let previous_backup = if path.exists() {
        Some(backup::create_backup(&path)?)
    } else {
        None
    };

    backup::restore(&backup_path, &path)?;
    info!(store = %store, from = %backup_path.display(), "Restore complete");

    if json {
        let output = RestoreOutput {
            store,
            path: &path,
            restored_from: &backup_path,
            previous_backup: previous_backup.as_ref(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} {}", "Restored".green().bold(), path.display());
        println!("  From:     {}", backup_path.display());
        if let Some(previous) = &previous_backup {
            println!("  Previous: {}", previous.display());
        }
    }
    Ok(())
}
