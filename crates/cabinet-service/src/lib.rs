//! # cabinet-service
//!
//! Business logic service layer for Cabinet. Each service orchestrates the
//! record store, credential store and content store to implement one
//! group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use file::{DownloadService, FileService, UploadService};
pub use status::StatusService;
