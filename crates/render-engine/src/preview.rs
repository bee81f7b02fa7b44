//! Compressed gallery previews.

use std::io::Cursor;

use booth_common::{BoothError, BoothResult};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::compositor::CompositeImage;

/// Preview width cap in pixels.
pub const PREVIEW_MAX_WIDTH: u32 = 800;
/// JPEG quality of gallery previews.
pub const PREVIEW_QUALITY: u8 = 70;

/// Downscale (never upscale) to `max_width` and encode as JPEG.
pub fn encode_preview(image: &CompositeImage, max_width: u32, quality: u8) -> BoothResult<Vec<u8>> {
    let rgba = RgbaImage::from_raw(image.width(), image.height(), image.to_rgba())
        .ok_or_else(|| BoothError::render("composite buffer has unexpected size"))?;

    let (width, height) = preview_size(image.width(), image.height(), max_width);
    let resized = if width == image.width() {
        rgba
    } else {
        image::imageops::resize(&rgba, width, height, FilterType::Triangle)
    };
    let rgb = DynamicImage::ImageRgba8(resized).to_rgb8();

    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| BoothError::render(format!("JPEG encoding failed: {e}")))?;

    tracing::debug!(width, height, bytes = out.get_ref().len(), "Preview encoded");
    Ok(out.into_inner())
}

/// Gallery preview with the default size and quality.
pub fn default_preview(image: &CompositeImage) -> BoothResult<Vec<u8>> {
    encode_preview(image, PREVIEW_MAX_WIDTH, PREVIEW_QUALITY)
}

/// Aspect-preserving size no wider than `max_width`.
pub fn preview_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if max_width == 0 || width <= max_width {
        return (width, height);
    }
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round() as u32;
    (max_width, scaled.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_size() {
        assert_eq!(preview_size(1200, 1800, 800), (800, 1200));
        assert_eq!(preview_size(640, 480, 800), (640, 480));
        assert_eq!(preview_size(1200, 1800, 0), (1200, 1800));
    }
}
