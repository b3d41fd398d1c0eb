//! # cabinet-core
//!
//! Core crate for Cabinet. Contains the traits implemented by the
//! infrastructure crates, configuration schemas, pagination types,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Cabinet crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
