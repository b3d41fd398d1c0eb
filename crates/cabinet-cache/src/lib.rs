//! # cabinet-cache
//!
//! Credential store clients for Cabinet. Two providers are available:
//!
//! - **redis**: the shared store populated by the login flow, using the
//!   [redis](https://crates.io/crates/redis) crate
//! - **memory**: an in-process store using [moka](https://crates.io/crates/moka),
//!   for development and tests
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
