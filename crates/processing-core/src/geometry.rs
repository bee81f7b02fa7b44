//! Screen-space and output-space geometry primitives.

use serde::{Deserialize, Serialize};

/// A pointer position in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: ScreenPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// The preview canvas' current on-screen bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A zero-area or non-finite rect cannot map pointer deltas.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Screen position of a percent-space point.
    pub fn percent_to_screen(&self, x_pct: f64, y_pct: f64) -> ScreenPoint {
        ScreenPoint::new(
            self.left + x_pct / 100.0 * self.width,
            self.top + y_pct / 100.0 * self.height,
        )
    }
}

/// Axis-aligned rectangle in composite pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `other` lies entirely inside this rect.
    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_canvas() {
        assert!(CanvasRect::new(0.0, 0.0, 0.0, 600.0).is_degenerate());
        assert!(CanvasRect::new(0.0, 0.0, 400.0, f64::NAN).is_degenerate());
        assert!(!CanvasRect::new(10.0, 10.0, 400.0, 600.0).is_degenerate());
    }

    #[test]
    fn test_percent_to_screen() {
        let canvas = CanvasRect::new(100.0, 50.0, 400.0, 600.0);
        assert_eq!(canvas.percent_to_screen(50.0, 50.0), ScreenPoint::new(300.0, 350.0));
        assert_eq!(canvas.percent_to_screen(0.0, 100.0), ScreenPoint::new(100.0, 650.0));
    }
}
