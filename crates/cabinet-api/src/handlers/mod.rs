//! Route handlers.

pub mod file;
pub mod health;
