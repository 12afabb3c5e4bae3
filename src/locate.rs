//! Favorites bar locator.
//!
//! Browsers name their toolbar folder differently depending on vendor,
//! version and UI language. The locator matches a fixed set of known titles
//! and hands back the bar under one canonical title.
//!
//! When nothing matches, the default behavior wraps the whole forest in a
//! freshly created bar folder so a sync never fails just because the bar was
//! renamed. Callers that prefer a hard failure check [`find_bar`] first.

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{BookmarkNode, IdGenerator, Store};

/// Title every located bar is given.
pub const CANONICAL_BAR_TITLE: &str = "收藏夹栏";

/// Titles recognised as the favorites bar.
pub const BAR_TITLES: [&str; 4] = ["Bookmarks Bar", "Favorites Bar", "收藏夹栏", "书签栏"];

/// Safari's own toolbar folder. Placement anchor when merging into Safari.
pub const SAFARI_TOOLBAR_TITLE: &str = "BookmarksBar";

const SAFARI_SOURCE_TITLES: [&str; 5] = [
    SAFARI_TOOLBAR_TITLE,
    "Bookmarks Bar",
    "Favorites Bar",
    "收藏夹栏",
    "书签栏",
];

/// How to pick the bar among a store's root nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRule {
    /// Accepted titles.
    pub titles: &'static [&'static str],
    /// Only folders qualify.
    pub require_folder: bool,
    /// Among several matches take the one with the most children
    /// (first wins ties); otherwise take the first match.
    pub prefer_richest: bool,
}

impl MatchRule {
    /// Rule for reading the bar out of an Edge document.
    pub const EDGE_SOURCE: Self = Self {
        titles: &BAR_TITLES,
        require_folder: false,
        prefer_richest: false,
    };

    /// Rule for reading the bar out of a Safari document. Safari's own
    /// toolbar counts too, and it competes with any synced bar folder.
    pub const SAFARI_SOURCE: Self = Self {
        titles: &SAFARI_SOURCE_TITLES,
        require_folder: true,
        prefer_richest: true,
    };

    /// Rule for reading the bar out of `store`.
    #[must_use]
    pub const fn for_source(store: Store) -> Self {
        match store {
            Store::Edge => Self::EDGE_SOURCE,
            Store::Safari => Self::SAFARI_SOURCE,
        }
    }

    fn matches(&self, node: &BookmarkNode) -> bool {
        self.titles.contains(&node.title.as_str()) && (!self.require_folder || node.is_folder())
    }
}

/// Where the located bar came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarOrigin {
    /// An existing root node matched.
    Matched { index: usize, title: String },
    /// Nothing matched; the whole forest was wrapped.
    Wrapped { roots: usize },
}

/// A located bar and its origin.
#[derive(Debug, Clone)]
pub struct LocatedBar {
    pub node: BookmarkNode,
    pub origin: BarOrigin,
}

/// Whether `title` is one of the recognised bar titles.
#[must_use]
pub fn is_bar_title(title: &str) -> bool {
    BAR_TITLES.contains(&title)
}

/// Index of the root node `rule` selects, if any.
#[must_use]
pub fn find_bar(forest: &[BookmarkNode], rule: &MatchRule) -> Option<usize> {
    let mut candidates = forest
        .iter()
        .enumerate()
        .filter(|(_, node)| rule.matches(node));

    if !rule.prefer_richest {
        return candidates.next().map(|(index, _)| index);
    }

    let mut best: Option<(usize, usize)> = None;
    for (index, node) in candidates {
        let size = node.children().map_or(0, <[BookmarkNode]>::len);
        if best.is_none_or(|(_, best_size)| size > best_size) {
            best = Some((index, size));
        }
    }
    best.map(|(index, _)| index)
}

/// Locate the bar with the Edge rule (first title match).
///
/// The match is returned re-titled to [`CANONICAL_BAR_TITLE`], keeping its
/// id and children. Without a match the entire forest is wrapped in a new
/// bar folder.
pub fn locate(forest: Vec<BookmarkNode>, ids: &IdGenerator) -> BookmarkNode {
    locate_with(forest, &MatchRule::EDGE_SOURCE, ids).node
}

/// Locate the bar with an explicit rule, reporting where it came from.
pub fn locate_with(mut forest: Vec<BookmarkNode>, rule: &MatchRule, ids: &IdGenerator) -> LocatedBar {
    if let Some(index) = find_bar(&forest, rule) {
        let matched = forest.swap_remove(index);
        debug!(index, title = %matched.title, "Matched favorites bar");

        let origin = BarOrigin::Matched {
            index,
            title: matched.title.clone(),
        };
        let node = if matched.is_folder() {
            matched.retitled(CANONICAL_BAR_TITLE)
        } else {
            BookmarkNode::folder(matched.id, CANONICAL_BAR_TITLE, Vec::new())
        };
        return LocatedBar { node, origin };
    }

    debug!(
        titles = ?forest.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(),
        "Root titles matched no favorites bar title"
    );
    warn!(
        roots = forest.len(),
        "No favorites bar found; wrapping every root folder into a new bar"
    );
    let roots = forest.len();
    LocatedBar {
        node: BookmarkNode::folder(ids.uuid(), CANONICAL_BAR_TITLE, forest),
        origin: BarOrigin::Wrapped { roots },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::is_uuid;

    fn folder(id: &str, title: &str, links: usize) -> BookmarkNode {
        let children = (0..links)
            .map(|i| BookmarkNode::link(format!("{id}-{i}"), format!("l{i}"), format!("https://{i}")))
            .collect();
        BookmarkNode::folder(id, title, children)
    }

    #[test]
    fn test_locate_first_match_is_retitled() {
        let ids = IdGenerator::default();
        let forest = vec![
            folder("1", "Bookmarks Bar", 2),
            folder("2", "Other Bookmarks", 5),
            folder("3", "Favorites Bar", 9),
        ];

        let bar = locate(forest, &ids);
        assert_eq!(bar.id, "1");
        assert_eq!(bar.title, CANONICAL_BAR_TITLE);
        assert_eq!(bar.children().unwrap().len(), 2);
    }

    #[test]
    fn test_locate_localized_titles() {
        let ids = IdGenerator::default();
        for title in ["收藏夹栏", "书签栏", "Favorites Bar"] {
            let bar = locate(vec![folder("a", "Other", 1), folder("b", title, 3)], &ids);
            assert_eq!(bar.id, "b", "title {title} should match");
        }
    }

    #[test]
    fn test_locate_fallback_wraps_forest() {
        let ids = IdGenerator::default();
        let forest = vec![folder("1", "Barre de favoris", 1), folder("2", "Other", 2)];

        let located = locate_with(forest.clone(), &MatchRule::EDGE_SOURCE, &ids);
        assert_eq!(located.origin, BarOrigin::Wrapped { roots: 2 });
        assert_eq!(located.node.title, CANONICAL_BAR_TITLE);
        assert!(is_uuid(&located.node.id));
        assert_eq!(located.node.children().unwrap(), forest.as_slice());
    }

    #[test]
    fn test_locate_titles_match_exactly() {
        let ids = IdGenerator::default();
        let forest = vec![
            folder("1", "bookmarks bar", 1),
            folder("2", " Favorites Bar", 1),
            folder("3", "BOOKMARKS BAR", 1),
        ];
        assert_eq!(find_bar(&forest, &MatchRule::EDGE_SOURCE), None);

        let located = locate_with(forest, &MatchRule::EDGE_SOURCE, &ids);
        assert_eq!(located.origin, BarOrigin::Wrapped { roots: 3 });
    }

    #[test]
    fn test_safari_rule_prefers_richest_folder() {
        let forest = vec![
            folder("1", "BookmarksBar", 1),
            folder("2", "收藏夹栏", 4),
            folder("3", "Favorites Bar", 4),
        ];
        assert_eq!(find_bar(&forest, &MatchRule::SAFARI_SOURCE), Some(1));

        // The Edge rule ignores Safari's toolbar title entirely
        assert_eq!(find_bar(&forest[..1], &MatchRule::EDGE_SOURCE), None);
    }

    #[test]
    fn test_safari_rule_requires_folder() {
        let forest = vec![
            BookmarkNode::link("1", "收藏夹栏", "https://not-a-folder"),
            folder("2", "BookmarksBar", 0),
        ];
        assert_eq!(find_bar(&forest, &MatchRule::SAFARI_SOURCE), Some(1));
    }

    #[test]
    fn test_is_bar_title() {
        assert!(is_bar_title("Bookmarks Bar"));
        assert!(is_bar_title("书签栏"));
        assert!(!is_bar_title("BookmarksBar"));
        assert!(!is_bar_title("bookmarks bar"));
    }
}
