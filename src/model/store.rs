//! The two bookmark stores favsync knows about.

use serde::Serialize;

/// A bookmark store, identified by the browser that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    /// Microsoft Edge: JSON-tree document.
    Edge,
    /// Safari: binary property-list document.
    Safari,
}

impl Store {
    /// Name of the owning application, as shown to users.
    #[must_use]
    pub const fn app_name(&self) -> &'static str {
        match self {
            Self::Edge => "Microsoft Edge",
            Self::Safari => "Safari",
        }
    }

    /// Label used in error messages about this store's document.
    #[must_use]
    pub const fn document_label(&self) -> &'static str {
        match self {
            Self::Edge => "Edge bookmarks",
            Self::Safari => "Safari bookmarks",
        }
    }

    /// Process names the owning application runs under.
    #[must_use]
    pub const fn process_names(&self) -> &'static [&'static str] {
        match self {
            Self::Edge => &["Microsoft Edge", "msedge", "microsoft-edge"],
            Self::Safari => &["Safari"],
        }
    }

    /// The other store.
    #[must_use]
    pub const fn counterpart(&self) -> Self {
        match self {
            Self::Edge => Self::Safari,
            Self::Safari => Self::Edge,
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edge => write!(f, "edge"),
            Self::Safari => write!(f, "safari"),
        }
    }
}

impl std::str::FromStr for Store {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "edge" | "msedge" => Ok(Self::Edge),
            "safari" => Ok(Self::Safari),
            _ => Err(format!("Unknown store: {s} (expected edge or safari)")),
        }
    }
}
