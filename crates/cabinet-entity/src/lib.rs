//! # cabinet-entity
//!
//! Domain entity models for Cabinet. Database entities derive
//! `sqlx::FromRow`; enums map onto Postgres enum types.

pub mod file;
pub mod job;
