//! Background job domain entities.

pub mod model;
pub mod payload;

pub use model::{CreateJob, Job};
pub use payload::{THUMBNAIL_JOB, ThumbnailPayload};
