//! Image decoding into drawable sources.
//!
//! Raster formats go through the `image` crate; SVG goes through usvg.

use booth_common::{BoothError, BoothResult};
use resvg::usvg;
use tiny_skia::{ColorU8, FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};

/// A decoded image ready to be drawn at any size.
pub enum DecodedImage {
    Raster(Pixmap),
    Vector(usvg::Tree),
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raster(p) => write!(f, "Raster({}x{})", p.width(), p.height()),
            Self::Vector(t) => write!(f, "Vector({}x{})", t.size().width(), t.size().height()),
        }
    }
}

impl DecodedImage {
    /// Intrinsic size in pixels.
    pub fn size(&self) -> (f32, f32) {
        match self {
            Self::Raster(p) => (p.width() as f32, p.height() as f32),
            Self::Vector(t) => (t.size().width(), t.size().height()),
        }
    }

    /// Draw stretched into the rect `(x, y, w, h)` of `target`.
    pub fn draw_into(&self, target: &mut Pixmap, x: f32, y: f32, w: f32, h: f32) {
        let (sw, sh) = self.size();
        if sw <= 0.0 || sh <= 0.0 || w <= 0.0 || h <= 0.0 {
            return;
        }
        let transform = Transform::from_row(w / sw, 0.0, 0.0, h / sh, x, y);
        match self {
            Self::Raster(src) => {
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                target.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
            }
            Self::Vector(tree) => {
                resvg::render(tree, transform, &mut target.as_mut());
            }
        }
    }
}

/// Decode image bytes, sniffing SVG by content.
///
/// `reference` only labels errors.
pub fn decode_image(reference: &str, bytes: &[u8]) -> BoothResult<DecodedImage> {
    if bytes.is_empty() {
        return Err(BoothError::decode(reference, "empty image data"));
    }

    if looks_like_svg(bytes) {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
            .map_err(|e| BoothError::decode(reference, e.to_string()))?;
        let size = tree.size();
        if size.width() <= 0.0 || size.height() <= 0.0 {
            return Err(BoothError::decode(reference, "SVG has empty dimensions"));
        }
        return Ok(DecodedImage::Vector(tree));
    }

    let img = image::load_from_memory(bytes).map_err(|e| BoothError::decode(reference, e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    pixmap_from_rgba(rgba.into_raw(), width, height)
        .map(DecodedImage::Raster)
        .ok_or_else(|| BoothError::decode(reference, "image has empty dimensions"))
}

/// Build a pixmap from straight (non-premultiplied) RGBA8 bytes.
pub fn pixmap_from_rgba(mut rgba: Vec<u8>, width: u32, height: u32) -> Option<Pixmap> {
    premultiply_rgba8_in_place(&mut rgba);
    Pixmap::from_vec(rgba, IntSize::from_wh(width, height)?)
}

/// Straight RGBA8 bytes of a pixmap.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        px.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 3, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let decoded = decode_image("photo 0", &png_bytes([10, 20, 30, 255])).unwrap();
        match decoded {
            DecodedImage::Raster(p) => {
                assert_eq!((p.width(), p.height()), (4, 3));
                let c = p.pixel(0, 0).unwrap().demultiply();
                assert_eq!((c.red(), c.green(), c.blue()), (10, 20, 30));
            }
            other => panic!("expected raster, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_svg_by_content() {
        let svg = br#"<?xml version="1.0"?>
            <svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10"/></svg>"#;
        let decoded = decode_image("sticker", svg).unwrap();
        assert!(matches!(decoded, DecodedImage::Vector(_)));
        assert_eq!(decoded.size(), (20.0, 10.0));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_image("photo 1", b"definitely not an image").unwrap_err();
        match err {
            BoothError::Decode { reference, .. } => assert_eq!(reference, "photo 1"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(decode_image("photo 2", &[]).is_err());
    }

    #[test]
    fn test_premultiply_roundtrip_of_opaque_pixels() {
        let p = pixmap_from_rgba(vec![200, 100, 50, 255, 0, 0, 0, 0], 2, 1).unwrap();
        assert_eq!(pixmap_to_rgba(&p), vec![200, 100, 50, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn test_translucent_pixels_are_premultiplied() {
        let p = pixmap_from_rgba(vec![255, 255, 255, 128, 90, 60, 30, 0], 2, 1).unwrap();
        let half = p.pixel(0, 0).unwrap();
        assert_eq!((half.red(), half.green(), half.blue(), half.alpha()), (128, 128, 128, 128));
        let clear = p.pixel(1, 0).unwrap();
        assert_eq!((clear.red(), clear.alpha()), (0, 0));
    }
}
