//! Thumbnail generator for image files.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, error};

use cabinet_core::error::{AppError, ErrorKind};
use cabinet_core::result::AppResult;
use cabinet_core::traits::storage::ContentStore;

/// Widths of the derivatives generated for every image, largest first.
pub const THUMBNAIL_WIDTHS: [u32; 3] = [500, 250, 100];

/// Path of the derivative of `original` at `width`.
pub fn derivative_path(original: &str, width: u32) -> String {
    format!("{original}_{width}")
}

/// Map a client-supplied `size` value onto a derivative width.
///
/// Only the exact decimal strings of [`THUMBNAIL_WIDTHS`] match.
pub fn width_from_query(size: &str) -> Option<u32> {
    THUMBNAIL_WIDTHS
        .iter()
        .copied()
        .find(|width| width.to_string() == size)
}

/// Generates width-bounded thumbnails next to the original.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    /// Store for reading originals and writing derivatives.
    store: Arc<dyn ContentStore>,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Generate a thumbnail of `width` from already-loaded source bytes.
    ///
    /// Returns the path of the written derivative.
    pub async fn generate(&self, source_path: &str, source: Bytes, width: u32) -> AppResult<String> {
        let encoded = tokio::task::spawn_blocking(move || resize_image(&source, width))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e))??;

        let output = derivative_path(source_path, width);
        self.store.write(&output, encoded).await?;

        debug!(source = source_path, width, output = %output, "Generated thumbnail");
        Ok(output)
    }

    /// Generate every width in [`THUMBNAIL_WIDTHS`].
    ///
    /// Reading the original is the only fatal step. A width that fails is
    /// logged and left out of the returned paths.
    pub async fn generate_all(&self, source_path: &str) -> AppResult<Vec<String>> {
        let source = self.store.read_bytes(source_path).await?;

        let mut paths = Vec::with_capacity(THUMBNAIL_WIDTHS.len());
        for width in THUMBNAIL_WIDTHS {
            match self.generate(source_path, source.clone(), width).await {
                Ok(path) => paths.push(path),
                Err(e) => {
                    error!(source = source_path, width, error = %e, "Thumbnail generation failed");
                }
            }
        }
        Ok(paths)
    }
}

/// Resize to `width` keeping the aspect ratio, encoded in the source format.
fn resize_image(data: &[u8], width: u32) -> AppResult<Bytes> {
    let format = image::guess_format(data).ok();
    let img = match format {
        Some(format) => image::load_from_memory_with_format(data, format),
        None => image::load_from_memory(data),
    }
    .map_err(|e| AppError::with_source(ErrorKind::Validation, "Failed to decode image", e))?;

    let height = scaled_height(img.width(), img.height(), width);
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    let format = format.unwrap_or(ImageFormat::Png);
    match encode(&resized, format) {
        Ok(bytes) => Ok(bytes),
        Err(e) if format != ImageFormat::Png => {
            debug!(?format, error = %e, "Source format not encodable, using PNG");
            encode(&resized, ImageFormat::Png)
        }
        Err(e) => Err(e),
    }
}

/// Height that keeps `src_w:src_h` at `width`, never below one pixel.
fn scaled_height(src_w: u32, src_h: u32, width: u32) -> u32 {
    if src_w == 0 {
        return 1;
    }
    let height = (u64::from(src_h) * u64::from(width) + u64::from(src_w) / 2) / u64::from(src_w);
    u32::try_from(height.max(1)).unwrap_or(u32::MAX)
}

fn encode(img: &DynamicImage, format: ImageFormat) -> AppResult<Bytes> {
    // JPEG has no alpha channel.
    let owned;
    let img = if format == ImageFormat::Jpeg && img.color().has_alpha() {
        owned = DynamicImage::ImageRgb8(img.to_rgb8());
        &owned
    } else {
        img
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to encode thumbnail", e))?;
    Ok(Bytes::from(buf))
}
