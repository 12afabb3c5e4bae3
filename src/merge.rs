//! Structural merge of a converted bar into a destination document.
//!
//! Only the bar subtree is replaced. Every other top-level entry, every
//! other root and every key the merge does not understand passes through
//! untouched, in its original order.
//!
//! - Safari: the bar is an entry of the root `Children` array. An existing
//!   bar folder is replaced in place; otherwise the new bar goes right after
//!   Safari's own `BookmarksBar` folder, or first.
//! - Edge: the bar is `roots.bookmark_bar`. Its `children` are replaced and
//!   all of its other fields (id, guid, dates, name) are kept.

use plist::Value as PlistValue;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::codec::{safari, CodecError};
use crate::locate::{is_bar_title, SAFARI_TOOLBAR_TITLE};
use crate::model::Store;

/// Where the replacement ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Placement {
    /// An existing bar entry at `index` was replaced.
    Replaced { index: usize },
    /// No bar existed; the replacement was inserted at `index`.
    Inserted { index: usize },
}

/// A merged document ready to be written.
#[derive(Debug)]
pub struct Merged {
    pub bytes: Vec<u8>,
    pub placement: Placement,
}

/// Errors raised while merging.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The destination document could not be parsed.
    #[error("Failed to parse destination {}: {details}", store.document_label())]
    Parse { store: Store, details: String },

    /// The merged document could not be serialized.
    #[error("Failed to serialize merged {}: {details}", store.document_label())]
    Serialize { store: Store, details: String },
}

impl From<CodecError> for MergeError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Serialize { store, details } => Self::Serialize { store, details },
            CodecError::Malformed { store, details } => Self::Parse { store, details },
            other @ (CodecError::NotFound { .. } | CodecError::Read { .. }) => Self::Parse {
                store: other.store(),
                details: other.to_string(),
            },
        }
    }
}

/// A top-level entry of a destination document.
pub trait BarEntry {
    /// The entry's title, if it has one.
    fn entry_title(&self) -> Option<&str>;

    /// Whether the entry's type tag says folder.
    fn is_folder_entry(&self) -> bool;
}

impl BarEntry for PlistValue {
    fn entry_title(&self) -> Option<&str> {
        self.as_dictionary()
            .and_then(|d| d.get(safari::KEY_TITLE))
            .and_then(PlistValue::as_string)
    }

    fn is_folder_entry(&self) -> bool {
        self.as_dictionary()
            .and_then(|d| d.get(safari::KEY_TYPE))
            .and_then(PlistValue::as_string)
            == Some(safari::TYPE_LIST)
    }
}

impl BarEntry for JsonValue {
    fn entry_title(&self) -> Option<&str> {
        self.get("name").and_then(JsonValue::as_str)
    }

    fn is_folder_entry(&self) -> bool {
        self.get("type").and_then(JsonValue::as_str) == Some("folder")
    }
}

/// Put `replacement` into `entries` as the bar.
///
/// The first folder entry with a bar title is replaced in place. Without one,
/// the replacement is inserted right after the first entry titled exactly
/// [`SAFARI_TOOLBAR_TITLE`], or at position 0.
pub fn splice_bar<T: BarEntry>(entries: &mut Vec<T>, replacement: T) -> Placement {
    let existing = entries
        .iter()
        .position(|entry| entry.is_folder_entry() && entry.entry_title().is_some_and(is_bar_title));

    if let Some(index) = existing {
        entries[index] = replacement;
        return Placement::Replaced { index };
    }

    let index = entries
        .iter()
        .position(|entry| entry.entry_title() == Some(SAFARI_TOOLBAR_TITLE))
        .map_or(0, |anchor| anchor + 1);
    entries.insert(index, replacement);
    Placement::Inserted { index }
}

/// Merge a Safari-native bar node into a Safari document.
///
/// # Errors
///
/// Returns `Parse` if the document is not a plist dictionary (or its
/// `Children` is not an array), `Serialize` if it cannot be written back.
pub fn merge_safari(document: &[u8], replacement: PlistValue) -> Result<Merged, MergeError> {
    let mut root = safari::parse_value(document)?;
    let dict = root.as_dictionary_mut().ok_or_else(|| MergeError::Parse {
        store: Store::Safari,
        details: "Root plist is not a dictionary".to_string(),
    })?;

    if dict.get(safari::KEY_CHILDREN).is_none() {
        dict.insert(safari::KEY_CHILDREN.to_string(), PlistValue::Array(Vec::new()));
    }
    let entries = dict
        .get_mut(safari::KEY_CHILDREN)
        .and_then(PlistValue::as_array_mut)
        .ok_or_else(|| MergeError::Parse {
            store: Store::Safari,
            details: format!("Root '{}' is not an array", safari::KEY_CHILDREN),
        })?;

    let placement = splice_bar(entries, replacement);
    debug!(?placement, entries = entries.len(), "Merged bar into Safari document");

    let bytes = safari::to_binary(&root)?;
    Ok(Merged { bytes, placement })
}

/// Merge an Edge-native bar node into an Edge document.
///
/// When `roots.bookmark_bar` exists only its `children` are replaced;
/// otherwise `replacement` becomes `roots.bookmark_bar`. Output is
/// pretty-printed JSON with sorted keys.
///
/// # Errors
///
/// Returns `Parse` if the document is not a JSON object with a `roots`
/// object, `Serialize` if it cannot be written back.
pub fn merge_edge(document: &[u8], replacement: JsonValue) -> Result<Merged, MergeError> {
    let parse_error = |details: String| MergeError::Parse {
        store: Store::Edge,
        details,
    };

    let mut root: JsonValue = serde_json::from_slice(document).map_err(|e| parse_error(e.to_string()))?;
    let roots = root
        .get_mut("roots")
        .and_then(JsonValue::as_object_mut)
        .ok_or_else(|| parse_error("Invalid Edge JSON structure: missing 'roots' object".to_string()))?;

    let placement = match roots.get_mut("bookmark_bar").and_then(JsonValue::as_object_mut) {
        Some(bar) => {
            let children = match replacement {
                JsonValue::Object(mut object) => object.remove("children"),
                _ => None,
            };
            bar.insert(
                "children".to_string(),
                children.unwrap_or_else(|| JsonValue::Array(Vec::new())),
            );
            Placement::Replaced { index: 0 }
        }
        None => {
            roots.insert("bookmark_bar".to_string(), replacement);
            Placement::Inserted { index: 0 }
        }
    };
    debug!(?placement, "Merged bar into Edge document");

    let bytes = serde_json::to_vec_pretty(&root).map_err(|e| MergeError::Serialize {
        store: Store::Edge,
        details: e.to_string(),
    })?;
    Ok(Merged { bytes, placement })
}
