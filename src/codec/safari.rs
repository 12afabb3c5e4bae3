//! Safari property-list codec.
//!
//! Safari keeps bookmarks in a binary plist. The root dictionary carries a
//! `Children` array of node dictionaries:
//!
//! - folders: `WebBookmarkUUID`, `Title`, `WebBookmarkType = WebBookmarkTypeList`,
//!   `Children`
//! - leaves: `WebBookmarkUUID`, `WebBookmarkType = WebBookmarkTypeLeaf`,
//!   `URLString`, `URIDictionary = { title }`
//!
//! Safari requires UUID-shaped identifiers, so ids that are not UUIDs are
//! replaced with fresh ones whenever nodes are written in this schema.

use std::io::Cursor;

use plist::{Dictionary, Value};
use serde::Deserialize;

use super::{CodecError, CodecResult};
use crate::model::{BookmarkNode, IdGenerator, NodeKind, Store};

pub const KEY_UUID: &str = "WebBookmarkUUID";
pub const KEY_TITLE: &str = "Title";
pub const KEY_TYPE: &str = "WebBookmarkType";
pub const KEY_CHILDREN: &str = "Children";
pub const KEY_URL: &str = "URLString";
pub const KEY_URI_DICTIONARY: &str = "URIDictionary";
pub const KEY_FILE_VERSION: &str = "WebBookmarkFileVersion";

pub const TYPE_LIST: &str = "WebBookmarkTypeList";
pub const TYPE_LEAF: &str = "WebBookmarkTypeLeaf";

const ROOT_TITLE: &str = "Bookmarks";
const FILE_VERSION: u64 = 1;

/// Root dictionary of a Safari bookmarks document, as read.
#[derive(Debug, Deserialize)]
struct SafariDocument {
    #[serde(rename = "Children", default)]
    children: Vec<SafariNode>,
}

/// A node dictionary, as read. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct SafariNode {
    #[serde(rename = "WebBookmarkUUID")]
    uuid: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "WebBookmarkType")]
    kind: Option<String>,
    #[serde(rename = "URLString")]
    url: Option<String>,
    #[serde(rename = "URIDictionary")]
    uri_dictionary: Option<UriDictionary>,
    #[serde(rename = "Children")]
    children: Option<Vec<SafariNode>>,
}

#[derive(Debug, Deserialize)]
struct UriDictionary {
    title: Option<String>,
}

/// Decode a Safari document into its top-level nodes.
///
/// # Errors
///
/// Returns `Malformed` if the bytes are not a property list, the root's
/// `Children` is not an array, or a node lacks its `WebBookmarkUUID`. A root
/// without `Children` decodes as empty.
pub fn decode(bytes: &[u8]) -> CodecResult<Vec<BookmarkNode>> {
    let document: SafariDocument = plist::from_bytes(bytes).map_err(|e| malformed(e.to_string()))?;
    document.children.into_iter().map(to_canonical).collect()
}

fn to_canonical(node: SafariNode) -> CodecResult<BookmarkNode> {
    let id = node
        .uuid
        .ok_or_else(|| malformed(format!("node is missing {KEY_UUID}")))?;

    let leaf_title = node.uri_dictionary.and_then(|d| d.title);
    let children = node
        .children
        .map(|children| children.into_iter().map(to_canonical).collect::<CodecResult<Vec<_>>>())
        .transpose()?;

    match node.kind.as_deref() {
        Some(TYPE_LIST) => Ok(BookmarkNode::folder(
            id,
            node.title.unwrap_or_default(),
            children.unwrap_or_default(),
        )),
        Some(TYPE_LEAF) => Ok(BookmarkNode::link(
            id,
            leaf_title.or(node.title).unwrap_or_default(),
            node.url.unwrap_or_default(),
        )),
        // Proxies and untyped entries: classify by shape.
        _ => {
            let title = if node.url.is_some() {
                leaf_title.or(node.title)
            } else {
                node.title.or(leaf_title)
            };
            Ok(BookmarkNode::from_parts(
                id,
                title.unwrap_or_default(),
                node.url,
                children,
            ))
        }
    }
}

/// Encode nodes as a complete Safari document (binary plist).
///
/// # Errors
///
/// Returns `Serialize` if the property list cannot be written.
pub fn encode(nodes: &[BookmarkNode], ids: &IdGenerator) -> CodecResult<Vec<u8>> {
    let mut root = Dictionary::new();
    root.insert(KEY_TITLE.to_string(), Value::String(ROOT_TITLE.to_string()));
    root.insert(KEY_UUID.to_string(), Value::String(ids.uuid()));
    root.insert(KEY_TYPE.to_string(), Value::String(TYPE_LIST.to_string()));
    root.insert(KEY_FILE_VERSION.to_string(), Value::Integer(FILE_VERSION.into()));
    root.insert(
        KEY_CHILDREN.to_string(),
        Value::Array(nodes.iter().map(|node| native_node(node, ids)).collect()),
    );

    to_binary(&Value::Dictionary(root))
}

/// Build a Safari-native node dictionary for a canonical node.
pub fn native_node(node: &BookmarkNode, ids: &IdGenerator) -> Value {
    let mut dict = Dictionary::new();
    dict.insert(KEY_UUID.to_string(), Value::String(ids.normalize_uuid(&node.id)));

    match &node.kind {
        NodeKind::Folder { children } => {
            dict.insert(KEY_TYPE.to_string(), Value::String(TYPE_LIST.to_string()));
            dict.insert(KEY_TITLE.to_string(), Value::String(node.title.clone()));
            dict.insert(
                KEY_CHILDREN.to_string(),
                Value::Array(children.iter().map(|child| native_node(child, ids)).collect()),
            );
        }
        NodeKind::Link { address } => {
            dict.insert(KEY_TYPE.to_string(), Value::String(TYPE_LEAF.to_string()));
            dict.insert(KEY_URL.to_string(), Value::String(address.clone()));
            let mut uri = Dictionary::new();
            uri.insert("title".to_string(), Value::String(node.title.clone()));
            dict.insert(KEY_URI_DICTIONARY.to_string(), Value::Dictionary(uri));
        }
    }

    Value::Dictionary(dict)
}

/// Parse raw bytes into an untyped plist value.
///
/// # Errors
///
/// Returns `Malformed` if the bytes are not a property list.
pub fn parse_value(bytes: &[u8]) -> CodecResult<Value> {
    Value::from_reader(Cursor::new(bytes)).map_err(|e| malformed(e.to_string()))
}

/// Write a plist value in binary format.
///
/// # Errors
///
/// Returns `Serialize` if the value cannot be written.
pub fn to_binary(value: &Value) -> CodecResult<Vec<u8>> {
    let mut bytes = Vec::new();
    value
        .to_writer_binary(&mut bytes)
        .map_err(|e| CodecError::Serialize {
            store: Store::Safari,
            details: e.to_string(),
        })?;
    Ok(bytes)
}

fn malformed(details: String) -> CodecError {
    CodecError::Malformed {
        store: Store::Safari,
        details,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::is_uuid;

    pub(crate) const BAR_UUID: &str = "0A1B2C3D-0000-4000-8000-000000000001";
    pub(crate) const LIST_UUID: &str = "0A1B2C3D-0000-4000-8000-000000000002";

    /// Build a node dictionary the way Safari lays it out.
    pub(crate) fn folder_dict(uuid: &str, title: &str, children: Vec<Value>) -> Value {
        let mut dict = Dictionary::new();
        dict.insert(KEY_UUID.to_string(), Value::String(uuid.to_string()));
        dict.insert(KEY_TITLE.to_string(), Value::String(title.to_string()));
        dict.insert(KEY_TYPE.to_string(), Value::String(TYPE_LIST.to_string()));
        dict.insert(KEY_CHILDREN.to_string(), Value::Array(children));
        Value::Dictionary(dict)
    }

    pub(crate) fn leaf_dict(uuid: &str, title: &str, url: &str) -> Value {
        let mut dict = Dictionary::new();
        dict.insert(KEY_UUID.to_string(), Value::String(uuid.to_string()));
        dict.insert(KEY_TYPE.to_string(), Value::String(TYPE_LEAF.to_string()));
        dict.insert(KEY_URL.to_string(), Value::String(url.to_string()));
        let mut uri = Dictionary::new();
        uri.insert("title".to_string(), Value::String(title.to_string()));
        dict.insert(KEY_URI_DICTIONARY.to_string(), Value::Dictionary(uri));
        Value::Dictionary(dict)
    }

    pub(crate) fn document(children: Vec<Value>) -> Vec<u8> {
        let mut root = Dictionary::new();
        root.insert(KEY_TITLE.to_string(), Value::String(String::new()));
        root.insert(KEY_FILE_VERSION.to_string(), Value::Integer(1_u64.into()));
        root.insert(KEY_CHILDREN.to_string(), Value::Array(children));
        to_binary(&Value::Dictionary(root)).unwrap()
    }

    #[test]
    fn test_decode_folders_and_leaves() {
        let bytes = document(vec![
            folder_dict(
                BAR_UUID,
                "BookmarksBar",
                vec![leaf_dict("0A1B2C3D-0000-4000-8000-000000000003", "Docs", "https://example.com/docs")],
            ),
            folder_dict(LIST_UUID, "Reading List", vec![]),
        ]);

        let roots = decode(&bytes).unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].title, "BookmarksBar");
        assert_eq!(roots[0].id, BAR_UUID);
        let docs = &roots[0].children().unwrap()[0];
        assert_eq!(docs.title, "Docs");
        assert_eq!(docs.address(), Some("https://example.com/docs"));
        assert_eq!(roots[1].children(), Some(&[][..]));
    }

    #[test]
    fn test_decode_proxy_entry_is_empty_folder() {
        let mut proxy = Dictionary::new();
        proxy.insert(KEY_UUID.to_string(), Value::String(LIST_UUID.to_string()));
        proxy.insert(KEY_TITLE.to_string(), Value::String("History".to_string()));
        proxy.insert(KEY_TYPE.to_string(), Value::String("WebBookmarkTypeProxy".to_string()));

        let roots = decode(&document(vec![Value::Dictionary(proxy)])).unwrap();
        assert_eq!(roots[0].title, "History");
        assert!(roots[0].is_folder());
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode(b"definitely not a plist"), Err(CodecError::Malformed { .. })));

        // Children present but not an array
        let mut root = Dictionary::new();
        root.insert(KEY_CHILDREN.to_string(), Value::String("nope".to_string()));
        let bytes = to_binary(&Value::Dictionary(root)).unwrap();
        assert!(matches!(decode(&bytes), Err(CodecError::Malformed { .. })));

        // Node without a UUID
        let mut node = Dictionary::new();
        node.insert(KEY_TITLE.to_string(), Value::String("x".to_string()));
        let bytes = document(vec![Value::Dictionary(node)]);
        assert!(matches!(decode(&bytes), Err(CodecError::Malformed { .. })));
    }

    #[test]
    fn test_decode_root_without_children_is_empty() {
        let mut root = Dictionary::new();
        root.insert(KEY_TITLE.to_string(), Value::String(String::new()));
        let bytes = to_binary(&Value::Dictionary(root)).unwrap();
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_encode_root_metadata() {
        let ids = IdGenerator::default();
        let bytes = encode(&[BookmarkNode::folder(BAR_UUID, "收藏夹栏", vec![])], &ids).unwrap();
        let value = parse_value(&bytes).unwrap();
        let root = value.as_dictionary().unwrap();

        assert_eq!(root.get(KEY_TITLE).and_then(Value::as_string), Some("Bookmarks"));
        assert_eq!(root.get(KEY_TYPE).and_then(Value::as_string), Some(TYPE_LIST));
        assert!(is_uuid(root.get(KEY_UUID).and_then(Value::as_string).unwrap()));
        assert_eq!(
            root.get(KEY_FILE_VERSION).and_then(Value::as_unsigned_integer),
            Some(1)
        );
        assert_eq!(root.get(KEY_CHILDREN).and_then(Value::as_array).map(Vec::len), Some(1));
    }

    #[test]
    fn test_encode_replaces_non_uuid_ids_only() {
        let ids = IdGenerator::default();
        let tree = vec![BookmarkNode::folder(
            BAR_UUID,
            "Work",
            vec![BookmarkNode::link("42", "Docs", "https://example.com/docs")],
        )];

        let decoded = decode(&encode(&tree, &ids).unwrap()).unwrap();
        assert_eq!(decoded[0].id, BAR_UUID);
        let link = &decoded[0].children().unwrap()[0];
        assert_ne!(link.id, "42");
        assert!(is_uuid(&link.id));
    }

    #[test]
    fn test_same_schema_round_trip() {
        let ids = IdGenerator::default();
        let tree = vec![
            BookmarkNode::folder(
                BAR_UUID,
                "收藏夹栏",
                vec![
                    BookmarkNode::folder(
                        "0A1B2C3D-0000-4000-8000-000000000010",
                        "Work",
                        vec![BookmarkNode::link(
                            "0A1B2C3D-0000-4000-8000-000000000011",
                            "Tracker",
                            "https://tracker.example.com",
                        )],
                    ),
                    BookmarkNode::link("0A1B2C3D-0000-4000-8000-000000000012", "Docs", "https://example.com/docs"),
                ],
            ),
            BookmarkNode::folder(LIST_UUID, "Empty", vec![]),
        ];

        let decoded = decode(&encode(&tree, &ids).unwrap()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn test_leaf_title_lives_in_uri_dictionary() {
        let ids = IdGenerator::default();
        let value = native_node(&BookmarkNode::link(BAR_UUID, "Docs", "https://d"), &ids);
        let dict = value.as_dictionary().unwrap();

        assert!(dict.get(KEY_TITLE).is_none());
        assert!(dict.get(KEY_CHILDREN).is_none());
        let uri = dict.get(KEY_URI_DICTIONARY).and_then(Value::as_dictionary).unwrap();
        assert_eq!(uri.get("title").and_then(Value::as_string), Some("Docs"));
    }
}
