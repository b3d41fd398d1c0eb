//! File record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::FileKind;
use super::parent::ParentRef;

/// A file, image or folder owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// Display name supplied by the client.
    pub name: String,
    /// Record kind.
    pub kind: FileKind,
    /// Whether anyone may download the content.
    pub is_public: bool,
    /// Containing folder (None for root).
    pub parent_id: Option<Uuid>,
    /// Absolute path of the stored original. Never set on folders.
    pub local_path: Option<String>,
    /// When the record was inserted.
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Check if this record is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == FileKind::Folder
    }

    /// The record's position in the hierarchy.
    pub fn parent(&self) -> ParentRef {
        ParentRef::from(self.parent_id)
    }
}

/// Data required to insert a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFileRecord {
    /// The owning user.
    pub user_id: Uuid,
    /// Display name.
    pub name: String,
    /// Record kind.
    pub kind: FileKind,
    /// Initial visibility.
    pub is_public: bool,
    /// Containing folder (None for root).
    pub parent_id: Option<Uuid>,
    /// Absolute path of the stored original.
    pub local_path: Option<String>,
}
