//! # cabinet-database
//!
//! PostgreSQL connection management, migrations and the repositories for
//! file records and background jobs.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::MetadataDb;
pub use repositories::{FileRecordStore, FileRepository, JobRepository};

#[cfg(feature = "memory")]
pub use repositories::MemoryFileRepository;
