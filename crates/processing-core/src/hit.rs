//! Hit testing on the preview canvas.
//!
//! A sticker's footprint on the preview is a square of side
//! `canvas.width * PREVIEW_FOOTPRINT_RATIO * scale`, centered on its
//! percent-space position and rotated clockwise by its rotation.

use booth_model::sticker::{Sticker, StickerBoard, StickerId, PREVIEW_FOOTPRINT_RATIO};

use crate::geometry::{CanvasRect, ScreenPoint};
use crate::interaction::PointerTarget;

/// Touch radius of the delete and rotate handles, in screen pixels.
pub const HANDLE_RADIUS_PX: f64 = 24.0;

/// A sticker's footprint in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickerFootprint {
    pub center: ScreenPoint,
    pub half_side: f64,
    pub rotation_rad: f64,
}

impl StickerFootprint {
    pub fn of(sticker: &Sticker, canvas: CanvasRect) -> Self {
        Self {
            center: canvas.percent_to_screen(sticker.x, sticker.y),
            half_side: canvas.width * PREVIEW_FOOTPRINT_RATIO * sticker.scale / 2.0,
            rotation_rad: sticker.rotation.to_radians(),
        }
    }

    /// Map a sticker-local offset to screen space.
    fn to_screen(&self, lx: f64, ly: f64) -> ScreenPoint {
        let (sin, cos) = self.rotation_rad.sin_cos();
        ScreenPoint::new(
            self.center.x + lx * cos - ly * sin,
            self.center.y + lx * sin + ly * cos,
        )
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        let (sin, cos) = self.rotation_rad.sin_cos();
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        let lx = dx * cos + dy * sin;
        let ly = -dx * sin + dy * cos;
        lx.abs() <= self.half_side && ly.abs() <= self.half_side
    }

    /// Delete button position: the top-right corner.
    pub fn delete_handle(&self) -> ScreenPoint {
        self.to_screen(self.half_side, -self.half_side)
    }

    /// Rotate/scale handle position: the bottom-right corner.
    pub fn rotate_handle(&self) -> ScreenPoint {
        self.to_screen(self.half_side, self.half_side)
    }
}

/// Resolve what a pointer-down at `point` lands on.
///
/// The active sticker's handles win, then the active sticker's body (drawn
/// above the rest), then the other stickers from topmost to bottom.
pub fn hit_test(
    point: ScreenPoint,
    board: &StickerBoard,
    active: Option<StickerId>,
    canvas: CanvasRect,
) -> PointerTarget {
    if canvas.is_degenerate() {
        return PointerTarget::Background;
    }

    if let Some(sticker) = active.and_then(|id| board.get(id)) {
        let footprint = StickerFootprint::of(sticker, canvas);
        if point.distance_to(footprint.delete_handle()) <= HANDLE_RADIUS_PX {
            return PointerTarget::DeleteHandle(sticker.id);
        }
        if point.distance_to(footprint.rotate_handle()) <= HANDLE_RADIUS_PX {
            return PointerTarget::RotateHandle(sticker.id);
        }
        if footprint.contains(point) {
            return PointerTarget::Body(sticker.id);
        }
    }

    board
        .iter()
        .rev()
        .filter(|s| Some(s.id) != active)
        .find(|s| StickerFootprint::of(s, canvas).contains(point))
        .map_or(PointerTarget::Background, |s| PointerTarget::Body(s.id))
}
