//! Thumbnail derivatives for image records.

pub mod generator;

pub use generator::{THUMBNAIL_WIDTHS, ThumbnailGenerator, derivative_path, width_from_query};
