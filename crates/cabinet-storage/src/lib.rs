//! # cabinet-storage
//!
//! Content storage for Cabinet: the local filesystem store that holds
//! uploaded originals, and the thumbnail generator that writes resized
//! derivatives next to them.

pub mod providers;
pub mod thumbnail;

pub use providers::LocalStorageProvider;
pub use thumbnail::ThumbnailGenerator;
