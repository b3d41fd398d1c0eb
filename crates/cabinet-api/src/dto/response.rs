//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cabinet_entity::file::{FileKind, FileRecord, ParentRef};

/// Parent reference on the wire: `0` for the root, otherwise the folder id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentIdOutput {
    /// Always `0`.
    Root(u8),
    /// Folder id.
    Folder(Uuid),
}

impl From<ParentRef> for ParentIdOutput {
    fn from(parent: ParentRef) -> Self {
        match parent {
            ParentRef::Root => Self::Root(0),
            ParentRef::Folder(id) => Self::Folder(id),
        }
    }
}

/// Public view of a record. The content path is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// Record id.
    pub id: Uuid,
    /// Owner id.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Record kind.
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Visibility.
    pub is_public: bool,
    /// Containing folder.
    pub parent_id: ParentIdOutput,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            parent_id: record.parent().into(),
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            kind: record.kind,
            is_public: record.is_public,
        }
    }
}
