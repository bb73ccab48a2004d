//! Inline thumbnails for channel pages

use crate::error::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat};
use std::io::Cursor;
use std::path::Path;

/// Size of an inlined thumbnail (16:9)
pub const INLINE_WIDTH: u32 = 25;
pub const INLINE_HEIGHT: u32 = (9 * INLINE_WIDTH) / 16;

const JPEG_QUALITY: u8 = 80;

/// Decode an image, scale it to exactly `width` x `height` and encode it as JPEG
pub fn resize_thumbnail(path: &Path, width: u32, height: u32) -> Result<Vec<u8>> {
    let image = image::open(path)?;
    let resized = image.resize_exact(width, height, FilterType::Triangle);
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageOutputFormat::Jpeg(JPEG_QUALITY))?;
    Ok(buf.into_inner())
}

/// `data:` URI of a tiny copy of the image; empty payload if it cannot be read
pub fn thumbnail_data_uri(path: &Path) -> String {
    let bytes = resize_thumbnail(path, INLINE_WIDTH, INLINE_HEIGHT).unwrap_or_else(|e| {
        tracing::warn!(file = %path.display(), error = %e, "could not inline thumbnail");
        Vec::new()
    });
    format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
}
