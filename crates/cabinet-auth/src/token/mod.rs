//! Opaque session token resolution.

pub mod resolver;

pub use resolver::TokenResolver;
