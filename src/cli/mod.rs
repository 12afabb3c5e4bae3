//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{EDGE_PATH_ENV, SAFARI_PATH_ENV};
use crate::model::Store;
use crate::sync::Direction;

pub mod commands;

/// favsync - keep the favorites bar in sync between Edge and Safari
#[derive(Parser, Debug)]
#[command(name = "favsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Edge bookmarks file (default: newest Edge profile's `Bookmarks`)
    #[arg(long, global = true, env = EDGE_PATH_ENV)]
    pub edge: Option<PathBuf>,

    /// Safari bookmarks file (default: ~/Library/Safari/Bookmarks.plist)
    #[arg(long, global = true, env = SAFARI_PATH_ENV)]
    pub safari: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy the favorites bar from one browser into the other
    Sync(SyncArgs),

    /// Show the bookmark tree of a store
    Inspect {
        /// Store to read
        #[arg(value_enum)]
        store: StoreArg,

        /// Show only the favorites bar, as sync would pick it
        #[arg(long)]
        bar: bool,
    },

    /// List backups of a store, newest first
    Backups {
        /// Store whose backups to list
        #[arg(value_enum)]
        store: StoreArg,
    },

    /// Restore a store from a backup
    Restore {
        /// Store to restore
        #[arg(value_enum)]
        store: StoreArg,

        /// Backup file to restore from (default: newest backup)
        #[arg(long)]
        from: Option<PathBuf>,

        /// Skip the browser-running check
        #[arg(long)]
        assume_closed: bool,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Which way to sync
    #[arg(long, short, value_enum, default_value_t = DirectionArg::EdgeToSafari)]
    pub direction: DirectionArg,

    /// Convert and merge, but write nothing (no backup either)
    #[arg(long)]
    pub dry_run: bool,

    /// Fail when the source has no favorites bar instead of wrapping every root folder
    #[arg(long)]
    pub strict_bar: bool,

    /// Skip the browser-running check
    #[arg(long)]
    pub assume_closed: bool,
}

/// Sync direction as given on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirectionArg {
    /// Edge favorites bar into Safari
    #[default]
    EdgeToSafari,
    /// Safari favorites bar into Edge
    SafariToEdge,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::EdgeToSafari => Self::EdgeToSafari,
            DirectionArg::SafariToEdge => Self::SafariToEdge,
        }
    }
}

/// Store as given on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreArg {
    Edge,
    Safari,
}

impl From<StoreArg> for Store {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Edge => Self::Edge,
            StoreArg::Safari => Self::Safari,
        }
    }
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_defaults_to_edge_to_safari() {
        let cli = Cli::try_parse_from(["favsync", "sync", "--dry-run"]).unwrap();
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(Direction::from(args.direction), Direction::EdgeToSafari);
        assert!(args.dry_run);
        assert!(!args.strict_bar);
    }

    #[test]
    fn test_global_paths_after_subcommand() {
        let cli = Cli::try_parse_from([
            "favsync",
            "sync",
            "-d",
            "safari-to-edge",
            "--edge",
            "/tmp/Bookmarks",
        ])
        .unwrap();
        assert_eq!(cli.edge, Some(PathBuf::from("/tmp/Bookmarks")));
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.direction, DirectionArg::SafariToEdge);
    }
}
