//! Edge JSON-tree codec.
//!
//! Edge keeps bookmarks in a JSON document whose `roots` object holds up to
//! three named root folders:
//!
//! ```json
//! {
//!   "roots": {
//!     "bookmark_bar": { "id": "1", "name": "Bookmarks Bar", "type": "folder", "children": [...] },
//!     "other": { ... },
//!     "synced": { ... }
//!   },
//!   "version": 1
//! }
//! ```
//!
//! [`decode`] and [`encode`] work on whole documents. [`native_node`] builds a
//! single Edge-native node for splicing into an existing document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{CodecError, CodecResult};
use crate::model::{BookmarkNode, IdGenerator, NodeKind, Store};

/// Seconds between 1601-01-01 (Chromium epoch) and 1970-01-01.
const CHROMIUM_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Root object of an Edge bookmarks document.
#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub roots: EdgeRoots,
    /// Top-level keys other than `roots` (checksum, version, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The named root folders. Any of them may be absent.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EdgeRoots {
    #[serde(default)]
    pub bookmark_bar: Option<EdgeNode>,
    #[serde(default)]
    pub other: Option<EdgeNode>,
    #[serde(default)]
    pub synced: Option<EdgeNode>,
}

/// Edge's `type` tag for folders.
pub const TYPE_FOLDER: &str = "folder";
/// Edge's `type` tag for bookmarks.
pub const TYPE_URL: &str = "url";

/// A folder or url node in the Edge document.
///
/// Every field is optional on read. The node's shape decides whether it is
/// a folder, not its `type` tag.
#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<EdgeNode>>,
}

/// Decode an Edge document into its root folders, in
/// `bookmark_bar`, `other`, `synced` order, skipping absent ones.
///
/// # Errors
///
/// Returns `Malformed` if the bytes are not an Edge bookmarks document.
pub fn decode(bytes: &[u8]) -> CodecResult<Vec<BookmarkNode>> {
    let document: EdgeDocument = serde_json::from_slice(bytes).map_err(malformed)?;
    let EdgeRoots {
        bookmark_bar,
        other,
        synced,
    } = document.roots;

    Ok([bookmark_bar, other, synced]
        .into_iter()
        .flatten()
        .map(to_canonical)
        .collect())
}

fn to_canonical(node: EdgeNode) -> BookmarkNode {
    let children = node
        .children
        .map(|children| children.into_iter().map(to_canonical).collect());
    BookmarkNode::from_parts(node.id, node.name, node.url, children)
}

/// Encode nodes as a complete Edge document.
///
/// The nodes become the children of a synthesized `bookmark_bar`; `other`
/// is an empty folder and `synced` is a null placeholder.
///
/// # Errors
///
/// Returns `Serialize` if JSON encoding fails.
pub fn encode(nodes: &[BookmarkNode]) -> CodecResult<Vec<u8>> {
    let mut extra = Map::new();
    extra.insert("version".to_string(), json!(1));

    let document = EdgeDocument {
        roots: EdgeRoots {
            bookmark_bar: Some(EdgeNode {
                id: "1".to_string(),
                name: "Bookmarks Bar".to_string(),
                kind: TYPE_FOLDER.to_string(),
                url: None,
                children: Some(nodes.iter().map(from_canonical).collect()),
            }),
            other: Some(EdgeNode {
                id: "2".to_string(),
                name: "Other Bookmarks".to_string(),
                kind: TYPE_FOLDER.to_string(),
                url: None,
                children: Some(Vec::new()),
            }),
            synced: None,
        },
        extra,
    };

    serde_json::to_vec_pretty(&document).map_err(|e| CodecError::Serialize {
        store: Store::Edge,
        details: e.to_string(),
    })
}

fn from_canonical(node: &BookmarkNode) -> EdgeNode {
    match &node.kind {
        NodeKind::Folder { children } => EdgeNode {
            id: node.id.clone(),
            name: node.title.clone(),
            kind: TYPE_FOLDER.to_string(),
            url: None,
            children: Some(children.iter().map(from_canonical).collect()),
        },
        NodeKind::Link { address } => EdgeNode {
            id: node.id.clone(),
            name: node.title.clone(),
            kind: TYPE_URL.to_string(),
            url: Some(address.clone()),
            children: None,
        },
    }
}

/// Build an Edge-native node object, with the bookkeeping fields Edge
/// writes for bookmarks it creates itself.
///
/// Ids come from `ids` (decimal serials) and every node gets a fresh `guid`.
/// `stamp` is the `date_added`/`date_modified` value to record.
pub fn native_node(node: &BookmarkNode, ids: &mut IdGenerator, stamp: &str) -> Value {
    let mut object = Map::new();
    object.insert("id".to_string(), json!(ids.next_serial()));
    object.insert("guid".to_string(), json!(ids.guid()));
    object.insert("name".to_string(), json!(node.title));
    object.insert("date_added".to_string(), json!(stamp));
    object.insert("date_last_used".to_string(), json!("0"));

    match &node.kind {
        NodeKind::Folder { children } => {
            object.insert("type".to_string(), json!(TYPE_FOLDER));
            object.insert("date_modified".to_string(), json!(stamp));
            let children: Vec<Value> = children
                .iter()
                .map(|child| native_node(child, ids, stamp))
                .collect();
            object.insert("children".to_string(), Value::Array(children));
        }
        NodeKind::Link { address } => {
            object.insert("type".to_string(), json!(TYPE_URL));
            object.insert("url".to_string(), json!(address));
        }
    }

    Value::Object(object)
}

/// Largest decimal `id` anywhere under `roots`, or 0.
#[must_use]
pub fn max_serial_id(document: &Value) -> u64 {
    fn walk(node: &Value, max: &mut u64) {
        if let Some(id) = node
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| id.parse::<u64>().ok())
        {
            *max = (*max).max(id);
        }
        if let Some(children) = node.get("children").and_then(Value::as_array) {
            for child in children {
                walk(child, max);
            }
        }
    }

    let mut max = 0;
    if let Some(roots) = document.get("roots").and_then(Value::as_object) {
        for root in roots.values() {
            walk(root, &mut max);
        }
    }
    max
}

/// Timestamp in Chromium's format: microseconds since 1601-01-01, as a string.
#[must_use]
pub fn chromium_timestamp(at: DateTime<Utc>) -> String {
    let micros = (at.timestamp() + CHROMIUM_EPOCH_OFFSET_SECS) * 1_000_000
        + i64::from(at.timestamp_subsec_micros());
    micros.to_string()
}

fn malformed(err: serde_json::Error) -> CodecError {
    CodecError::Malformed {
        store: Store::Edge,
        details: err.to_string(),
    }
}
