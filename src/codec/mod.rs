//! Store codecs.
//!
//! Each codec translates one store's native on-disk schema to and from the
//! canonical [`BookmarkNode`](crate::model::BookmarkNode) tree:
//!
//! - [`edge`]: UTF-8 JSON document with a `roots` object
//! - [`safari`]: binary property list with a root `Children` array
//!
//! The native document shapes live inside their codec and never leak into
//! the canonical model.

pub mod edge;
pub mod safari;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::{BookmarkNode, Store};

/// Errors raised while decoding or encoding a native document.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The document file does not exist.
    #[error("{} file not found at: {}", store.document_label(), path.display())]
    NotFound { store: Store, path: PathBuf },

    /// The document could not be read.
    #[error("Failed to read {}: {source}", store.document_label())]
    Read {
        store: Store,
        #[source]
        source: io::Error,
    },

    /// The bytes are not a valid document of this schema.
    #[error("Invalid or malformed {}: {details}", store.document_label())]
    Malformed { store: Store, details: String },

    /// The tree could not be encoded into this schema.
    #[error("Failed to encode {}: {details}", store.document_label())]
    Serialize { store: Store, details: String },
}

impl CodecError {
    /// The store whose document raised this error.
    #[must_use]
    pub const fn store(&self) -> Store {
        match self {
            Self::NotFound { store, .. }
            | Self::Read { store, .. }
            | Self::Malformed { store, .. }
            | Self::Serialize { store, .. } => *store,
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Read a whole document from disk.
///
/// # Errors
///
/// Returns `NotFound` if the file is missing, `Read` for any other I/O error.
pub fn read_document(store: Store, path: &Path) -> CodecResult<Vec<u8>> {
    fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            CodecError::NotFound {
                store,
                path: path.to_path_buf(),
            }
        } else {
            CodecError::Read { store, source }
        }
    })
}

/// Decode a document of the given store into its root nodes.
///
/// # Errors
///
/// Returns `Malformed` if the bytes do not match the store's schema.
pub fn decode(store: Store, bytes: &[u8]) -> CodecResult<Vec<BookmarkNode>> {
    match store {
        Store::Edge => edge::decode(bytes),
        Store::Safari => safari::decode(bytes),
    }
}

/// Read and decode a store document from disk.
///
/// # Errors
///
/// Returns `NotFound`/`Read` for file problems and `Malformed` for bad content.
pub fn decode_file(store: Store, path: &Path) -> CodecResult<Vec<BookmarkNode>> {
    let bytes = read_document(store, path)?;
    decode(store, &bytes)
}
