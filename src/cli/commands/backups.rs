//! Backups command implementation.

use colored::Colorize;
use std::path::PathBuf;

use crate::backup;
use crate::config;
use crate::error::Result;
use crate::model::Store;

/// Execute the backups command.
///
/// # Errors
///
/// Returns an error if the store path cannot be resolved or its directory
/// cannot be read.
pub fn execute(
    store: Store,
    edge: Option<&PathBuf>,
    safari: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let config = config::load_config()?;
    let path = super::resolve_one(store, edge, safari, &config)?;
    let backups = backup::list_backups(&path)?;

    if json {
        let output = serde_json::json!({
            "store": store,
            "path": path,
            "count": backups.len(),
            "backups": backups,
        });
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if backups.is_empty() {
        println!("No backups of {}", path.display());
        return Ok(());
    }

    println!("Backups of {} (newest first):", path.display());
    println!();
    for (i, info) in backups.iter().enumerate() {
        let modified = info
            .modified
            .map_or_else(|| "unknown".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        let marker = if i == 0 { "*".green().to_string() } else { " ".to_string() };
        println!(
            "{marker} {}  {}  {}",
            modified.dimmed(),
            super::format_size(info.size),
            info.path.display()
        );
    }
    println!();
    println!("Restore the newest with: favsync restore {store}");
    Ok(())
}
