//! Canonical bookmark tree.
//!
//! Both store codecs translate into and out of this model. A node is either
//! a folder or a link, never both, so the distinction is carried by
//! [`NodeKind`] rather than by a pair of optional fields.

use serde::Serialize;

/// A single node in the canonical bookmark tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkNode {
    /// Identifier as found in the source store (not necessarily a UUID).
    pub id: String,

    /// Display title.
    pub title: String,

    /// Folder or link payload.
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Folder-or-link payload of a [`BookmarkNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// A folder with ordered children (possibly empty).
    Folder { children: Vec<BookmarkNode> },
    /// A link leaf.
    Link { address: String },
}

impl BookmarkNode {
    /// Create a folder node.
    pub fn folder(
        id: impl Into<String>,
        title: impl Into<String>,
        children: Vec<BookmarkNode>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: NodeKind::Folder { children },
        }
    }

    /// Create a link node.
    pub fn link(id: impl Into<String>, title: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: NodeKind::Link {
                address: address.into(),
            },
        }
    }

    /// Build a node from the loose optional fields native schemas carry.
    ///
    /// A node is a folder when it has a non-empty children list or no
    /// address at all; otherwise it is a link.
    #[must_use]
    pub fn from_parts(
        id: String,
        title: String,
        address: Option<String>,
        children: Option<Vec<BookmarkNode>>,
    ) -> Self {
        match (address, children) {
            (_, Some(children)) if !children.is_empty() => Self::folder(id, title, children),
            (Some(address), _) => Self::link(id, title, address),
            (None, children) => Self::folder(id, title, children.unwrap_or_default()),
        }
    }

    /// Whether this node is a folder.
    #[must_use]
    pub const fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    /// Link address, if this node is a link.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Link { address } => Some(address),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Children, if this node is a folder.
    #[must_use]
    pub fn children(&self) -> Option<&[BookmarkNode]> {
        match &self.kind {
            NodeKind::Folder { children } => Some(children),
            NodeKind::Link { .. } => None,
        }
    }

    /// Consume the node and return it under a new title.
    #[must_use]
    pub fn retitled(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    /// Count links and folders below (and including) this node.
    #[must_use]
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        self.tally_into(&mut tally);
        tally
    }

    fn tally_into(&self, tally: &mut Tally) {
        match &self.kind {
            NodeKind::Link { .. } => tally.links += 1,
            NodeKind::Folder { children } => {
                tally.folders += 1;
                for child in children {
                    child.tally_into(tally);
                }
            }
        }
    }
}

/// Link and folder counts for a subtree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub folders: usize,
    pub links: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_classification() {
        let link = BookmarkNode::from_parts("1".into(), "Docs".into(), Some("https://x".into()), None);
        assert_eq!(link.address(), Some("https://x"));

        let empty_folder = BookmarkNode::from_parts("2".into(), "Empty".into(), None, None);
        assert_eq!(empty_folder.children(), Some(&[][..]));

        // Non-empty children win over an address
        let child = BookmarkNode::link("3", "c", "https://c");
        let mixed = BookmarkNode::from_parts(
            "4".into(),
            "Mixed".into(),
            Some("https://ignored".into()),
            Some(vec![child]),
        );
        assert!(mixed.is_folder());

        // Empty children with an address is a link
        let leaf = BookmarkNode::from_parts("5".into(), "Leaf".into(), Some("https://l".into()), Some(vec![]));
        assert!(!leaf.is_folder());
    }

    #[test]
    fn test_retitled_keeps_id_and_children() {
        let folder = BookmarkNode::folder("7", "Bookmarks Bar", vec![BookmarkNode::link("8", "a", "https://a")]);
        let renamed = folder.clone().retitled("收藏夹栏");
        assert_eq!(renamed.id, "7");
        assert_eq!(renamed.title, "收藏夹栏");
        assert_eq!(renamed.children(), folder.children());
    }

    #[test]
    fn test_tally() {
        let tree = BookmarkNode::folder(
            "1",
            "root",
            vec![
                BookmarkNode::folder("2", "Work", vec![BookmarkNode::link("3", "a", "https://a")]),
                BookmarkNode::link("4", "b", "https://b"),
            ],
        );
        assert_eq!(tree.tally(), Tally { folders: 2, links: 2 });
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let link = BookmarkNode::link("1", "Docs", "https://example.com/docs");
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "link");
        assert_eq!(json["address"], "https://example.com/docs");
    }
}
