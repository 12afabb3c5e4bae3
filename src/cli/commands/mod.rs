//! Command implementations.

pub mod backups;
pub mod completions;
pub mod inspect;
pub mod restore;
pub mod sync;
pub mod version;

use std::path::PathBuf;

use crate::config::{self, Config};
use crate::error::Result;
use crate::model::Store;
use crate::sync::StorePaths;

/// Resolve both store paths from flags, environment, config and defaults.
pub(crate) fn resolve_store_paths(
    edge: Option<&PathBuf>,
    safari: Option<&PathBuf>,
    config: &Config,
) -> Result<StorePaths> {
    Ok(StorePaths {
        edge: config::resolve_store_path(Store::Edge, edge.map(PathBuf::as_path), config)?,
        safari: config::resolve_store_path(Store::Safari, safari.map(PathBuf::as_path), config)?,
    })
}

/// Resolve one store's path.
pub(crate) fn resolve_one(
    store: Store,
    edge: Option<&PathBuf>,
    safari: Option<&PathBuf>,
    config: &Config,
) -> Result<PathBuf> {
    let explicit = match store {
        Store::Edge => edge,
        Store::Safari => safari,
    };
    config::resolve_store_path(store, explicit.map(PathBuf::as_path), config)
}

/// Human-readable byte size.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    match bytes {
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{b} B"),
    }
}
