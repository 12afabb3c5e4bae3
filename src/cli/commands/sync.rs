//! Sync command implementation.

use colored::Colorize;
use std::path::PathBuf;

use crate::cli::SyncArgs;
use crate::config::{self, ASSUME_CLOSED_ENV};
use crate::error::Result;
use crate::locate::BarOrigin;
use crate::merge::Placement;
use crate::model::Store;
use crate::process;
use crate::sync::{SyncEngine, SyncOptions, SyncReport};

/// Execute the sync command.
///
/// # Errors
///
/// Returns the sync failure (with its backup path) or a path/config error.
pub fn execute(
    args: &SyncArgs,
    edge: Option<&PathBuf>,
    safari: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let config = config::load_config()?;
    let paths = super::resolve_store_paths(edge, safari, &config)?;
    let options = SyncOptions {
        dry_run: args.dry_run,
        strict_bar: args.strict_bar || config.strict_bar.unwrap_or(false),
    };
    let assume_closed = args.assume_closed || config::env_flag(ASSUME_CLOSED_ENV);

    let engine = SyncEngine::new(paths, process::probe(assume_closed)).with_options(options);
    let report = engine.run(args.direction.into())?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    let source = report.direction.source();
    let destination = report.direction.destination();

    let status = if report.dry_run {
        "Dry run".yellow().bold()
    } else if report.written {
        "Synced".green().bold()
    } else {
        "Up to date".cyan().bold()
    };
    println!(
        "{status}: favorites bar {} -> {}",
        source.app_name(),
        destination.app_name()
    );
    println!();

    let origin = match &report.bar.origin {
        BarOrigin::Matched { title, .. } => format!("from \"{title}\""),
        BarOrigin::Wrapped { roots } => format!("no bar found, wrapped {roots} root folders")
            .yellow()
            .to_string(),
    };
    println!("  Bar:       {} ({origin})", report.bar.title.bold());
    println!(
        "  Contents:  {} links, {} folders",
        report.bar.tally.links,
        report.bar.tally.folders.saturating_sub(1)
    );
    println!("  Placement: {}", placement_text(destination, report.placement));
    println!("  Target:    {}", report.destination.display());
    if let Some(backup) = &report.backup_path {
        println!("  Backup:    {}", backup.display());
    }

    if report.dry_run && report.changed {
        println!();
        println!(
            "{}",
            "Nothing was written. Run without --dry-run to apply.".dimmed()
        );
    }
}

fn placement_text(destination: Store, placement: Placement) -> String {
    match (destination, placement) {
        (Store::Edge, Placement::Replaced { .. }) => "replaced bookmark_bar contents".to_string(),
        (Store::Edge, Placement::Inserted { .. }) => "created bookmark_bar".to_string(),
        (Store::Safari, Placement::Replaced { index }) => format!("replaced top-level entry {index}"),
        (Store::Safari, Placement::Inserted { index }) => format!("inserted at top-level position {index}"),
    }
}
