//! Core type definitions used across the Cabinet workspace.

pub mod pagination;

pub use pagination::PageRequest;
