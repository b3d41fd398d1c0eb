//! Parent references as they arrive from clients.

use uuid::Uuid;

/// Where a record sits in the hierarchy.
///
/// On the wire the root is the literal `0`; the database stores it as NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParentRef {
    /// Top level of a user's hierarchy.
    #[default]
    Root,
    /// Inside the folder with this id.
    Folder(Uuid),
}

impl ParentRef {
    /// Parse a client-supplied parent reference.
    ///
    /// `"0"` is the root; anything else must be a UUID.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw == "0" {
            return Some(Self::Root);
        }
        Uuid::parse_str(raw).ok().map(Self::Folder)
    }

    /// The nullable column value for this reference.
    pub fn as_column(&self) -> Option<Uuid> {
        match self {
            Self::Root => None,
            Self::Folder(id) => Some(*id),
        }
    }
}

impl From<Option<Uuid>> for ParentRef {
    fn from(value: Option<Uuid>) -> Self {
        value.map_or(Self::Root, Self::Folder)
    }
}
