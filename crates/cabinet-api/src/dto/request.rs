//! Request DTOs.

use serde::{Deserialize, Serialize};

use cabinet_service::file::CreateFileParams;

/// A parent reference as clients send it: the number `0` or a string id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentIdInput {
    /// Numeric form; only `0` names anything.
    Number(serde_json::Number),
    /// String form: `"0"` or a record id.
    Text(String),
}

impl ParentIdInput {
    fn into_raw(self) -> String {
        match self {
            // `0`, `0.0` and `-0` all name the root.
            Self::Number(n) if n.as_f64() == Some(0.0) => "0".to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Body of `POST /files`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    /// Display name.
    pub name: Option<String>,
    /// `folder`, `file` or `image`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Parent folder; omitted means the root.
    pub parent_id: Option<ParentIdInput>,
    /// Initial visibility, private by default.
    pub is_public: Option<bool>,
    /// Base64 content.
    pub data: Option<String>,
}

impl From<CreateFileRequest> for CreateFileParams {
    fn from(req: CreateFileRequest) -> Self {
        Self {
            name: req.name,
            kind: req.kind,
            parent_id: req.parent_id.map(ParentIdInput::into_raw),
            is_public: req.is_public.unwrap_or(false),
            data: req.data,
        }
    }
}

/// Query of `GET /files`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    /// Parent folder; omitted means the root.
    pub parent_id: Option<String>,
    /// Zero-based page number.
    pub page: Option<String>,
}

/// Query of `GET /files/{id}/data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadQuery {
    /// Thumbnail width.
    pub size: Option<String>,
}
