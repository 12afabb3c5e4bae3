//! favsync - favorites bar sync between Edge and Safari
//!
//! This crate provides the core functionality for the `favsync` CLI tool.
//!
//! # Architecture
//!
//! - [`model`] - Canonical bookmark tree and identifier generation
//! - [`codec`] - Edge (JSON) and Safari (binary plist) codecs
//! - [`locate`] - Favorites bar locator
//! - [`merge`] - Structural merge of the bar into a destination document
//! - [`backup`] - Pre-mutation backups and restore
//! - [`sync`] - The sync state machine
//! - [`validate`] / [`process`] - Pre-flight checks on files and browsers
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Store path resolution and config file
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backup;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod locate;
pub mod merge;
pub mod model;
pub mod process;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
