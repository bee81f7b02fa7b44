//! Layout template engine.
//!
//! Maps a layout and the number of supplied photo slots to placement
//! rectangles in composite pixels. Pure and deterministic: the same inputs
//! always produce bit-identical geometry.

use booth_model::layout::LayoutKind;
use serde::Serialize;

use crate::geometry::PixelRect;

/// Postcard top and bottom margin.
pub const POSTCARD_VERTICAL_MARGIN: f64 = 40.0;
/// Postcard minimum side margin, used when a 16:9 photo would be too wide.
pub const POSTCARD_SIDE_MARGIN: f64 = 20.0;
/// Postcard gap between stacked photos.
pub const POSTCARD_SPACING: f64 = 20.0;

/// Horizontal padding on each side of a photo inside a strip.
pub const STRIP_PADDING_X: f64 = 20.0;
/// Vertical gap between photos in a strip.
pub const STRIP_GAP_Y: f64 = 12.0;
/// Strips are printed edge to edge with no gap between the two columns.
pub const STRIP_COLUMNS: usize = 2;

/// One photo drawn at one rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhotoPlacement {
    /// Index into the supplied photo list.
    pub photo_index: usize,
    /// Strip column (0 = left, 1 = right). Always 0 for the postcard.
    pub column: usize,
    pub rect: PixelRect,
}

/// Output geometry for one composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPlan {
    pub layout: LayoutKind,
    pub width: u32,
    pub height: u32,
    /// In draw order.
    pub placements: Vec<PhotoPlacement>,
}

impl LayoutPlan {
    /// Placements of a single photo (one per strip column).
    pub fn placements_of(&self, photo_index: usize) -> impl Iterator<Item = &PhotoPlacement> {
        self.placements
            .iter()
            .filter(move |p| p.photo_index == photo_index)
    }

    pub fn canvas_rect(&self) -> PixelRect {
        PixelRect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Compute photo placements for `supplied` photo slots.
///
/// Slots beyond the layout's photo count are ignored; fewer slots simply
/// produce fewer placements.
pub fn plan_layout(layout: LayoutKind, supplied: usize) -> LayoutPlan {
    let config = layout.config();
    let width = f64::from(config.width);
    let height = f64::from(config.height);
    let count = supplied.min(config.photo_count);

    let placements = match layout {
        LayoutKind::Postcard => {
            postcard_placements(width, height, config.aspect_ratio, config.photo_count, count)
        }
        LayoutKind::Strips => strip_placements(width, height, config.aspect_ratio, count),
    };

    LayoutPlan {
        layout,
        width: config.width,
        height: config.height,
        placements,
    }
}

fn postcard_placements(
    width: f64,
    height: f64,
    aspect: f64,
    slots: usize,
    count: usize,
) -> Vec<PhotoPlacement> {
    let gaps = slots.saturating_sub(1) as f64;
    let available = height - 2.0 * POSTCARD_VERTICAL_MARGIN - gaps * POSTCARD_SPACING;
    let photo_h = available / slots as f64;
    let max_w = width - 2.0 * POSTCARD_SIDE_MARGIN;
    let photo_w = (photo_h * aspect).min(max_w);
    let x = width / 2.0 - photo_w / 2.0;

    (0..count)
        .map(|i| PhotoPlacement {
            photo_index: i,
            column: 0,
            rect: PixelRect::new(
                x,
                POSTCARD_VERTICAL_MARGIN + i as f64 * (photo_h + POSTCARD_SPACING),
                photo_w,
                photo_h,
            ),
        })
        .collect()
}

fn strip_placements(width: f64, height: f64, aspect: f64, count: usize) -> Vec<PhotoPlacement> {
    if count == 0 {
        return Vec::new();
    }

    let strip_w = width / STRIP_COLUMNS as f64;
    let photo_w = strip_w - 2.0 * STRIP_PADDING_X;
    let photo_h = photo_w / aspect;
    let n = count as f64;
    let content_h = n * photo_h + (n - 1.0) * STRIP_GAP_Y;
    let start_y = (height - content_h) / 2.0;

    let mut placements = Vec::with_capacity(count * STRIP_COLUMNS);
    for i in 0..count {
        let y = start_y + i as f64 * (photo_h + STRIP_GAP_Y);
        for column in 0..STRIP_COLUMNS {
            placements.push(PhotoPlacement {
                photo_index: i,
                column,
                rect: PixelRect::new(
                    column as f64 * strip_w + STRIP_PADDING_X,
                    y,
                    photo_w,
                    photo_h,
                ),
            });
        }
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_postcard_three_photos() {
        let plan = plan_layout(LayoutKind::Postcard, 3);
        assert_eq!((plan.width, plan.height), (1200, 1800));
        assert_eq!(plan.placements.len(), 3);

        let first = plan.placements[0].rect;
        assert!(approx(first.height, 560.0));
        assert!(approx(first.width, 560.0 * 16.0 / 9.0));
        assert!(approx(first.x, 600.0 - first.width / 2.0));
        assert!(approx(first.y, 40.0));
        assert!(approx(plan.placements[1].rect.y, 620.0));
        assert!(approx(plan.placements[2].rect.y, 1200.0));
        assert!(approx(plan.placements[2].rect.bottom(), 1760.0));
    }

    #[test]
    fn test_postcard_partial_keeps_slot_positions() {
        let plan = plan_layout(LayoutKind::Postcard, 1);
        assert_eq!(plan.placements.len(), 1);
        assert!(approx(plan.placements[0].rect.y, 40.0));
        assert!(approx(plan.placements[0].rect.height, 560.0));
    }

    #[test]
    fn test_postcard_caps_at_photo_count() {
        let plan = plan_layout(LayoutKind::Postcard, 7);
        assert_eq!(plan.placements.len(), 3);
    }

    #[test]
    fn test_strips_four_photos_fill_block() {
        let plan = plan_layout(LayoutKind::Strips, 4);
        assert_eq!(plan.placements.len(), 8);
        let first = plan.placements[0].rect;
        assert!(approx(first.width, 560.0));
        assert!(approx(first.height, 420.0));
        // 4 * 420 + 3 * 12 = 1716, centered in 1800.
        assert!(approx(first.y, 42.0));
    }

    #[test]
    fn test_strips_two_photos_centered_as_two_block() {
        let plan = plan_layout(LayoutKind::Strips, 2);
        assert_eq!(plan.placements.len(), 4);
        let ys: Vec<f64> = plan.placements.iter().map(|p| p.rect.y).collect();
        assert!(approx(ys[0], 474.0));
        assert!(approx(ys[2], 906.0));
        for column in 0..2 {
            assert_eq!(
                plan.placements.iter().filter(|p| p.column == column).count(),
                2
            );
        }
    }

    #[test]
    fn test_strips_columns_mirror_at_same_y() {
        for supplied in 1..=4 {
            let plan = plan_layout(LayoutKind::Strips, supplied);
            for i in 0..supplied {
                let rects: Vec<PixelRect> = plan.placements_of(i).map(|p| p.rect).collect();
                assert_eq!(rects.len(), 2);
                assert_eq!(rects[0].y, rects[1].y);
                assert!(approx(rects[0].x, 20.0));
                assert!(approx(rects[1].x, 620.0));
            }
        }
    }

    #[test]
    fn test_zero_photos_yield_no_placements() {
        for layout in LayoutKind::ALL {
            let plan = plan_layout(layout, 0);
            assert!(plan.placements.is_empty());
            assert_eq!((plan.width, plan.height), (1200, 1800));
        }
    }

    #[test]
    fn test_placements_stay_inside_canvas() {
        for layout in LayoutKind::ALL {
            for supplied in 0..=layout.config().photo_count {
                let plan = plan_layout(layout, supplied);
                let canvas = plan.canvas_rect();
                for p in &plan.placements {
                    assert!(canvas.contains_rect(&p.rect), "{layout} {supplied}: {p:?}");
                }
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        assert_eq!(plan_layout(LayoutKind::Strips, 3), plan_layout(LayoutKind::Strips, 3));
    }
}
