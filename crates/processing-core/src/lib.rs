//! Photobooth Processing Core
//!
//! The editing math behind the kiosk:
//! - **Layout:** photo placement rectangles for each layout template
//! - **Interaction:** pointer gestures turned into sticker moves, rotations and scales
//! - **Hit testing:** which sticker or handle sits under a pointer
//!
//! This crate is pure computation: no I/O and no rendering.
//! All inputs are data; all outputs are data.

pub mod geometry;
pub mod hit;
pub mod interaction;
pub mod layout;

pub use geometry::{CanvasRect, PixelRect, ScreenPoint};
pub use hit::hit_test;
pub use interaction::{DragMode, DragSession, DragState, EditorEffect, PointerTarget, StickerEditor};
pub use layout::{plan_layout, LayoutPlan, PhotoPlacement};
