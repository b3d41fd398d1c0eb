//! Typed job payload definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job type for thumbnail generation.
pub const THUMBNAIL_JOB: &str = "thumbnail_generation";

/// Payload of a [`THUMBNAIL_JOB`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailPayload {
    /// The image record.
    pub file_id: Uuid,
    /// Its owner.
    pub user_id: Uuid,
}

impl ThumbnailPayload {
    /// Serialize into the JSON stored on the job row.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
