//! File record use cases.

pub mod download;
pub mod service;
pub mod upload;

pub use download::{DownloadResult, DownloadService};
pub use service::FileService;
pub use upload::{CreateFileParams, UploadService};

use uuid::Uuid;

use cabinet_core::error::AppError;
use cabinet_core::result::AppResult;

/// Message for missing, hidden or malformed records.
pub const NOT_FOUND: &str = "Not found";

/// Parse a record id supplied by a client.
///
/// A malformed id cannot name any record, so it fails exactly like a
/// missing one.
pub fn parse_record_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::not_found(NOT_FOUND))
}
