//! Composite renderer: frame color, photos and stickers flattened to one PNG.
//!
//! Rendering runs in two phases. Every source is loaded first, sequentially
//! in draw order (photos, then custom stickers in list order). Decoding and
//! painting then happen synchronously off the async runtime. A failure in
//! either phase aborts the whole composite.

use booth_common::{BoothError, BoothResult};
use booth_model::composition::Composition;
use booth_model::sticker::{Sticker, StickerSource, BASE_STICKER_PX};
use booth_processing_core::layout::{plan_layout, LayoutPlan};
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::assets;
use crate::decode::{decode_image, pixmap_to_rgba, DecodedImage};
use crate::loader::SourceLoader;
use crate::shadow::{PHOTO_SHADOW, STICKER_SHADOW};

/// Largest sticker bitmap drawn, shadow padding included.
pub const MAX_STICKER_SIDE_PX: u32 = 4096;

/// A rendered composite.
#[derive(Clone)]
pub struct CompositeImage {
    pixmap: Pixmap,
    png: Vec<u8>,
}

impl std::fmt::Debug for CompositeImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

impl CompositeImage {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Lossless PNG encoding.
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Straight RGBA8 of the whole image.
    pub fn to_rgba(&self) -> Vec<u8> {
        pixmap_to_rgba(&self.pixmap)
    }

    pub fn to_data_url(&self) -> String {
        booth_model::image_ref::ImageRef::from_bytes("image/png", &self.png)
            .as_str()
            .to_string()
    }
}

/// Encoded bytes for every source a composite draws.
///
/// `photos[i]` is `None` for blank slots; `stickers[i]` is `None` for
/// built-in stickers.
#[derive(Debug, Clone, Default)]
pub struct LoadedSources {
    pub photos: Vec<Option<Vec<u8>>>,
    pub stickers: Vec<Option<Vec<u8>>>,
}

/// Render a composition.
///
/// Output dimensions always match the layout, whatever the photo count.
pub async fn generate_composite(
    composition: &Composition,
    loader: &dyn SourceLoader,
) -> BoothResult<CompositeImage> {
    let plan = plan_layout(composition.layout, composition.photos.len());
    tracing::info!(
        layout = %composition.layout,
        photos = composition.photos.len(),
        stickers = composition.stickers.len(),
        frame = %composition.frame_color,
        "Rendering composite"
    );

    let sources = load_sources(composition, &plan, loader).await?;

    let composition = composition.clone();
    tokio::task::spawn_blocking(move || render_composite(&composition, &plan, &sources))
        .await
        .map_err(|e| BoothError::render(format!("render task failed: {e}")))?
}

/// Load photo bytes then custom sticker bytes, one at a time, in draw order.
pub async fn load_sources(
    composition: &Composition,
    plan: &LayoutPlan,
    loader: &dyn SourceLoader,
) -> BoothResult<LoadedSources> {
    let placed = composition.photos.len().min(composition.layout.config().photo_count);
    let mut photos = Vec::with_capacity(placed);
    for (index, photo) in composition.photos.iter().take(placed).enumerate() {
        if photo.is_blank() || plan.placements_of(index).next().is_none() {
            photos.push(None);
            continue;
        }
        let bytes = loader.load(photo).await.map_err(|e| {
            tracing::warn!(photo = index, reference = %photo, error = %e, "Failed to load photo");
            relabel(e, format!("photo {}", index + 1))
        })?;
        photos.push(Some(bytes));
    }

    let mut stickers = Vec::with_capacity(composition.stickers.len());
    for sticker in &composition.stickers {
        match &sticker.source {
            StickerSource::Builtin { .. } => stickers.push(None),
            StickerSource::Custom { url } => {
                let bytes = loader.load(url).await.map_err(|e| {
                    tracing::warn!(sticker = %sticker.id, reference = %url, error = %e, "Failed to load sticker");
                    relabel(e, format!("sticker {}", sticker.id))
                })?;
                stickers.push(Some(bytes));
            }
        }
    }

    Ok(LoadedSources { photos, stickers })
}

/// Decode and paint. Synchronous and deterministic.
pub fn render_composite(
    composition: &Composition,
    plan: &LayoutPlan,
    sources: &LoadedSources,
) -> BoothResult<CompositeImage> {
    // Decode everything before touching the canvas so a bad source never
    // leaves a half-drawn composite behind.
    let photos = sources
        .photos
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            bytes
                .as_deref()
                .map(|b| decode_image(&format!("photo {}", index + 1), b))
                .transpose()
        })
        .collect::<BoothResult<Vec<_>>>()?;

    let stickers = composition
        .stickers
        .iter()
        .enumerate()
        .map(|(index, sticker)| decode_sticker(sticker, sources.stickers.get(index)))
        .collect::<BoothResult<Vec<_>>>()?;

    let mut canvas = Pixmap::new(plan.width, plan.height)
        .ok_or_else(|| BoothError::render("failed to allocate canvas"))?;
    let fc = composition.frame_color;
    canvas.fill(Color::from_rgba8(fc.r, fc.g, fc.b, 255));

    for placement in &plan.placements {
        let Some(Some(photo)) = photos.get(placement.photo_index) else {
            continue;
        };
        let rect = placement.rect;
        let (shadow, sx, sy) = PHOTO_SHADOW.cast_rect(rect)?;
        canvas.draw_pixmap(
            sx,
            sy,
            shadow.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        photo.draw_into(
            &mut canvas,
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        );
    }

    for (sticker, image) in composition.stickers.iter().zip(&stickers) {
        draw_sticker(&mut canvas, image, sticker)?;
    }

    let png = canvas
        .encode_png()
        .map_err(|e| BoothError::render(format!("PNG encoding failed: {e}")))?;

    tracing::debug!(bytes = png.len(), "Composite encoded");
    Ok(CompositeImage { pixmap: canvas, png })
}

fn decode_sticker(sticker: &Sticker, bytes: Option<&Option<Vec<u8>>>) -> BoothResult<DecodedImage> {
    match &sticker.source {
        StickerSource::Builtin { key } => assets::parse_template(*key).map(DecodedImage::Vector),
        StickerSource::Custom { url } => match bytes {
            Some(Some(b)) => decode_image(&url.describe(), b),
            _ => Err(BoothError::decode(url.describe(), "sticker was not loaded")),
        },
    }
}

/// Draw one sticker into a `150 * scale` square centered on its position,
/// rotated about that center, over a soft shadow.
fn draw_sticker(canvas: &mut Pixmap, image: &DecodedImage, sticker: &Sticker) -> BoothResult<()> {
    let size = (BASE_STICKER_PX * sticker.scale) as f32;
    if !size.is_finite() || size <= 0.0 {
        tracing::warn!(sticker = %sticker.id, scale = sticker.scale, "Skipping sticker with degenerate size");
        return Ok(());
    }

    let pad = STICKER_SHADOW.radius() + 1;
    let side = f64::from(size).ceil() + f64::from(2 * pad);
    if side > f64::from(MAX_STICKER_SIDE_PX) {
        return Err(BoothError::render(format!(
            "sticker {} is too large to draw (scale {})",
            sticker.id, sticker.scale
        )));
    }
    let side = side as u32;
    let mut local = Pixmap::new(side, side)
        .ok_or_else(|| BoothError::render(format!("sticker {} is too large to draw", sticker.id)))?;
    image.draw_into(&mut local, pad as f32, pad as f32, size, size);
    let shadow = STICKER_SHADOW.cast(&local)?;

    let cx = (sticker.x / 100.0 * f64::from(canvas.width())) as f32;
    let cy = (sticker.y / 100.0 * f64::from(canvas.height())) as f32;
    let half = size / 2.0 + pad as f32;
    let transform =
        Transform::from_rotate_at(sticker.rotation as f32, cx, cy).pre_translate(cx - half, cy - half);

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(
        0,
        0,
        shadow.as_ref(),
        &paint,
        transform.post_translate(STICKER_SHADOW.offset_x, STICKER_SHADOW.offset_y),
        None,
    );
    canvas.draw_pixmap(0, 0, local.as_ref(), &paint, transform, None);
    Ok(())
}

/// Name the failing slot while keeping the original reference.
fn relabel(err: BoothError, label: String) -> BoothError {
    match err {
        BoothError::Decode { reference, message } => BoothError::Decode {
            reference: format!("{label} ({reference})"),
            message,
        },
        other => other,
    }
}
