//! Data models for favsync.
//!
//! This module contains the schema-neutral bookmark tree shared by both
//! codecs, and the per-run identifier generator:
//! - BookmarkNode / NodeKind
//! - IdGenerator
//! - Store

pub mod ids;
pub mod node;
pub mod store;

pub use ids::{is_uuid, IdGenerator};
pub use node::{BookmarkNode, NodeKind, Tally};
pub use store::Store;
