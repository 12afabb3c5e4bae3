//! Version command implementation.

use serde::Serialize;
use std::path::PathBuf;

use crate::config;
use crate::error::Result;

#[derive(Serialize)]
struct VersionOutput {
    version: &'static str,
    build: &'static str,
    config_path: Option<PathBuf>,
    config_present: bool,
}

/// Execute the version command.
///
/// Also reports where the config file is looked up and whether it exists.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let build = if cfg!(debug_assertions) { "dev" } else { "release" };
    let config_path = config::config_path().ok();
    let output = VersionOutput {
        version: env!("CARGO_PKG_VERSION"),
        build,
        config_present: config_path.as_deref().is_some_and(std::path::Path::exists),
        config_path,
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("favsync {} ({})", output.version, output.build);
    match &output.config_path {
        Some(path) if output.config_present => println!("Config: {}", path.display()),
        Some(path) => println!("Config: {} (not present, using defaults)", path.display()),
        None => println!("Config: no home directory"),
    }
    Ok(())
}
