//! Configuration management.
//!
//! Store paths resolve in this order:
//! 1. Explicit `--edge` / `--safari` flag
//! 2. `FAVSYNC_EDGE_BOOKMARKS` / `FAVSYNC_SAFARI_BOOKMARKS` environment variable
//! 3. `edge_bookmarks` / `safari_bookmarks` in `~/.favsync/config.json`
//! 4. The browser's default location
//!
//! The config file is optional; a missing file means defaults everywhere.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Store;

/// Environment variable overriding the Edge bookmarks path.
pub const EDGE_PATH_ENV: &str = "FAVSYNC_EDGE_BOOKMARKS";

/// Environment variable overriding the Safari bookmarks path.
pub const SAFARI_PATH_ENV: &str = "FAVSYNC_SAFARI_BOOKMARKS";

/// Environment variable that makes the CLI skip the browser-running check.
pub const ASSUME_CLOSED_ENV: &str = "FAVSYNC_ASSUME_CLOSED";

/// Contents of `~/.favsync/config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub edge_bookmarks: Option<PathBuf>,
    pub safari_bookmarks: Option<PathBuf>,
    /// Fail instead of wrapping every root when no bar is found.
    pub strict_bar: Option<bool>,
}

impl Config {
    /// Configured path for `store`, if any.
    #[must_use]
    pub fn store_path(&self, store: Store) -> Option<&Path> {
        match store {
            Store::Edge => self.edge_bookmarks.as_deref(),
            Store::Safari => self.safari_bookmarks.as_deref(),
        }
    }
}

/// Get the global favsync directory (`~/.favsync`).
#[must_use]
pub fn global_favsync_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".favsync"))
}

/// Path of the config file (`~/.favsync/config.json`).
///
/// # Errors
///
/// Returns `Config` if the home directory cannot be determined.
pub fn config_path() -> Result<PathBuf> {
    global_favsync_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// Load `~/.favsync/config.json`, or defaults if it does not exist.
///
/// # Errors
///
/// Returns `Config` if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Load a config file from an explicit location.
///
/// # Errors
///
/// Returns `Config` if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Environment variable that overrides the path for `store`.
#[must_use]
pub const fn path_env_var(store: Store) -> &'static str {
    match store {
        Store::Edge => EDGE_PATH_ENV,
        Store::Safari => SAFARI_PATH_ENV,
    }
}

/// Resolve the document path for `store`.
///
/// # Errors
///
/// Returns `StorePathUnresolved` if no source yields a path (no home
/// directory and nothing configured).
pub fn resolve_store_path(store: Store, explicit: Option<&Path>, config: &Config) -> Result<PathBuf> {
    // Priority 1: Explicit path from CLI flag
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(path_env_var(store)) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: Config file
    if let Some(path) = config.store_path(store) {
        return Ok(path.to_path_buf());
    }

    // Priority 4: Browser default
    default_store_path(store).ok_or(Error::StorePathUnresolved(store))
}

/// The browser's own location for the store document.
#[must_use]
pub fn default_store_path(store: Store) -> Option<PathBuf> {
    let base = directories::BaseDirs::new()?;
    match store {
        Store::Safari => Some(
            base.home_dir()
                .join("Library")
                .join("Safari")
                .join("Bookmarks.plist"),
        ),
        Store::Edge => {
            let vendor_dir = if cfg!(target_os = "macos") {
                "Microsoft Edge"
            } else {
                "microsoft-edge"
            };
            Some(newest_profile_bookmarks(&base.config_dir().join(vendor_dir)))
        }
    }
}

/// Pick the most recently modified `Bookmarks` file among Edge profiles.
///
/// Every direct subdirectory of `edge_dir` is treated as a profile
/// (`Default`, `Profile 1`, ...). Falls back to `Default/Bookmarks`.
#[must_use]
pub fn newest_profile_bookmarks(edge_dir: &Path) -> PathBuf {
    let fallback = edge_dir.join("Default").join("Bookmarks");
    let Ok(entries) = fs::read_dir(edge_dir) else {
        return fallback;
    };

    let newest = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path().join("Bookmarks"))
        .filter_map(|path| {
            let modified = fs::metadata(&path)
                .ok()
                .filter(fs::Metadata::is_file)?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, path))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

    match newest {
        Some((_, path)) => {
            debug!(path = %path.display(), "Selected Edge profile");
            path
        }
        None => fallback,
    }
}

/// Whether an environment flag is set to a truthy value.
#[must_use]
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}
