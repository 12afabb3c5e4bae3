//! favsync CLI entry point.

use clap::Parser;
use colored::Colorize;
use favsync::cli::commands;
use favsync::cli::{Cli, Commands};
use favsync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet || e.is_critical() {
                if let Some(hint) = e.hint() {
                    eprintln!("{} {e}\n  Hint: {hint}", "Error:".red().bold());
                } else {
                    eprintln!("{} {e}", "Error:".red().bold());
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let edge = cli.edge.as_ref();
    let safari = cli.safari.as_ref();

    match &cli.command {
        Commands::Sync(args) => commands::sync::execute(args, edge, safari, json),

        Commands::Inspect { store, bar } => {
            commands::inspect::execute((*store).into(), *bar, edge, safari, json)
        }

        Commands::Backups { store } => commands::backups::execute((*store).into(), edge, safari, json),

        Commands::Restore {
            store,
            from,
            assume_closed,
        } => commands::restore::execute(
            (*store).into(),
            from.as_ref(),
            *assume_closed,
            edge,
            safari,
            json,
        ),

        Commands::Version => commands::version::execute(json),

        // Shell completions
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
