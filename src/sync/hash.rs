//! Content fingerprints for change detection.
//!
//! Stores mint fresh identifiers and timestamps every time a bar is written,
//! so two documents holding the same bookmarks rarely match byte for byte.
//! [`content_fingerprint`] hashes only what the user sees: titles, addresses
//! and order. Identifiers are left out.

use sha2::{Digest, Sha256};

use crate::model::{BookmarkNode, NodeKind};

/// Hex SHA-256 of `bytes`.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 of a forest's titles, addresses and structure.
#[must_use]
pub fn content_fingerprint(nodes: &[BookmarkNode]) -> String {
    let mut hasher = Sha256::new();
    feed_forest(&mut hasher, nodes);
    format!("{:x}", hasher.finalize())
}

// Every field is length-prefixed so no two distinct trees feed the same bytes.
fn feed_forest(hasher: &mut Sha256, nodes: &[BookmarkNode]) {
    hasher.update(nodes.len().to_le_bytes());
    for node in nodes {
        feed_str(hasher, &node.title);
        match &node.kind {
            NodeKind::Folder { children } => {
                hasher.update(b"F");
                feed_forest(hasher, children);
            }
            NodeKind::Link { address } => {
                hasher.update(b"L");
                feed_str(hasher, address);
            }
        }
    }
}

fn feed_str(hasher: &mut Sha256, value: &str) {
    hasher.update(value.len().to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Whether two fingerprints differ.
#[must_use]
pub fn has_changed(current_hash: &str, previous_hash: &str) -> bool {
    current_hash != previous_hash
}
