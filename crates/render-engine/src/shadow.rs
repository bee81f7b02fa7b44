//! Soft drop shadows.
//!
//! Shadow blur follows the canvas convention: the gaussian sigma is half
//! the blur value. Shadows are black at a fixed opacity.

use booth_common::{BoothError, BoothResult};
use booth_processing_core::geometry::PixelRect;
use image::{imageops, GrayImage, Luma};
use tiny_skia::{IntSize, Pixmap};

/// Fixed shadow parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropShadow {
    pub opacity: f32,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Shadow beneath each photo.
pub const PHOTO_SHADOW: DropShadow = DropShadow {
    opacity: 0.1,
    blur: 25.0,
    offset_x: 0.0,
    offset_y: 10.0,
};

/// Shadow beneath each sticker.
pub const STICKER_SHADOW: DropShadow = DropShadow {
    opacity: 0.1,
    blur: 5.0,
    offset_x: 0.0,
    offset_y: 0.0,
};

impl DropShadow {
    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }

    /// Padding the blur needs around its source: three sigmas.
    pub fn radius(&self) -> u32 {
        (self.sigma() * 3.0).ceil().max(0.0) as u32
    }

    /// Shadow of an arbitrary image: its alpha, blurred and tinted black.
    ///
    /// `source` must already be padded by [`DropShadow::radius`] so the blur
    /// has room to spread. The result has the same size as `source`.
    pub fn cast(&self, source: &Pixmap) -> BoothResult<Pixmap> {
        let alpha: Vec<u8> = source.pixels().iter().map(|p| p.alpha()).collect();
        let mask = GrayImage::from_raw(source.width(), source.height(), alpha)
            .ok_or_else(|| BoothError::render("shadow mask does not match its source"))?;
        self.tint(&self.blur(&mask))
    }

    /// Shadow of an opaque rectangle, with fractional edges antialiased.
    ///
    /// Returns the shadow pixmap and the integer canvas position to draw it
    /// at (offset included).
    pub fn cast_rect(&self, rect: PixelRect) -> BoothResult<(Pixmap, i32, i32)> {
        let pad = f64::from(self.radius() + 1);
        let origin_x = (rect.x - pad).floor();
        let origin_y = (rect.y - pad).floor();
        let width = ((rect.right() + pad).ceil() - origin_x).max(1.0) as u32;
        let height = ((rect.bottom() + pad).ceil() - origin_y).max(1.0) as u32;

        let px = coverage(origin_x, width, rect.x, rect.right());
        let py = coverage(origin_y, height, rect.y, rect.bottom());
        let mask = GrayImage::from_fn(width, height, |x, y| {
            Luma([(px[x as usize] * py[y as usize] * 255.0).round() as u8])
        });

        let pixmap = self.tint(&self.blur(&mask))?;
        Ok((
            pixmap,
            origin_x as i32 + self.offset_x.round() as i32,
            origin_y as i32 + self.offset_y.round() as i32,
        ))
    }

    fn blur(&self, mask: &GrayImage) -> GrayImage {
        let sigma = self.sigma();
        if sigma.is_finite() && sigma > 0.0 {
            imageops::blur(mask, sigma)
        } else {
            mask.clone()
        }
    }

    fn tint(&self, mask: &GrayImage) -> BoothResult<Pixmap> {
        let mut data = Vec::with_capacity(mask.as_raw().len() * 4);
        for Luma([a]) in mask.pixels() {
            let a = (f32::from(*a) * self.opacity).round().clamp(0.0, 255.0) as u8;
            // Premultiplied black is all zeros except alpha.
            data.extend_from_slice(&[0, 0, 0, a]);
        }
        let size = IntSize::from_wh(mask.width(), mask.height())
            .ok_or_else(|| BoothError::render("shadow has empty dimensions"))?;
        Pixmap::from_vec(data, size).ok_or_else(|| BoothError::render("failed to allocate shadow"))
    }
}

/// Fraction of each unit pixel `[origin + k, origin + k + 1)` covered by `[start, end)`.
fn coverage(origin: f64, len: u32, start: f64, end: f64) -> Vec<f64> {
    (0..len)
        .map(|k| {
            let lo = origin + f64::from(k);
            let hi = lo + 1.0;
            (end.min(hi) - start.max(lo)).clamp(0.0, 1.0)
        })
        .collect()
}
