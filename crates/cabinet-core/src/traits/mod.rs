//! Core traits defined in `cabinet-core` and implemented by other crates.

pub mod cache;
pub mod queue;
pub mod storage;

pub use cache::CacheProvider;
pub use queue::JobPublisher;
pub use storage::ContentStore;
