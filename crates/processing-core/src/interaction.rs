//! Pointer interaction controller for placed stickers.
//!
//! Pointer events arrive in screen pixels against the preview canvas and are
//! turned into percent-space sticker updates. A gesture is tracked by an
//! explicit [`DragState`]; at most one [`DragSession`] exists at a time and
//! starting a new one replaces the old one.

use std::f64::consts::SQRT_2;

use booth_model::sticker::{
    Sticker, StickerBoard, StickerId, StickerSource, StickerTransform, MAX_SLIDER_SCALE,
    MIN_STICKER_SCALE, PREVIEW_FOOTPRINT_RATIO,
};

use crate::geometry::{CanvasRect, ScreenPoint};

/// Angle of the rotate handle relative to the sticker center at rotation 0.
pub const TRANSFORM_HANDLE_OFFSET_DEG: f64 = 45.0;

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas or anything outside a sticker.
    Background,
    /// A sticker's body.
    Body(StickerId),
    /// The rotate/scale handle of a sticker.
    RotateHandle(StickerId),
    /// The delete button of a sticker.
    DeleteHandle(StickerId),
}

/// Drag behaviour chosen at gesture start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Translate the sticker, clamped to the canvas.
    Move,
    /// Rotate and scale about the sticker's pre-drag center.
    Transform,
}

/// One in-progress gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub sticker_id: StickerId,
    pub mode: DragMode,
    /// Pointer position at gesture start.
    pub start: ScreenPoint,
    /// Sticker transform at gesture start.
    pub initial: StickerTransform,
}

/// Gesture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Active(DragSession),
}

/// Observable effect of one pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEffect {
    /// Nothing changed.
    None,
    /// The active sticker changed (including to none).
    SelectionChanged,
    /// A drag session started on this sticker.
    DragStarted(StickerId),
    /// This sticker's transform changed.
    Updated(StickerId),
    /// This sticker was removed.
    Deleted(StickerId),
    /// The drag session ended.
    DragEnded,
}

/// Owns the sticker board, the selection and the drag state.
#[derive(Debug, Clone, Default)]
pub struct StickerEditor {
    board: StickerBoard,
    active: Option<StickerId>,
    drag: DragState,
}

impl StickerEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume editing an existing board with nothing selected.
    pub fn with_board(board: StickerBoard) -> Self {
        Self {
            board,
            active: None,
            drag: DragState::Idle,
        }
    }

    pub fn board(&self) -> &StickerBoard {
        &self.board
    }

    pub fn stickers(&self) -> &[Sticker] {
        self.board.as_slice()
    }

    pub fn active(&self) -> Option<StickerId> {
        self.active
    }

    pub fn active_sticker(&self) -> Option<&Sticker> {
        self.active.and_then(|id| self.board.get(id))
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Active(_))
    }

    /// Place a new sticker at the canvas center and make it active.
    pub fn add_sticker(&mut self, source: StickerSource) -> StickerId {
        let id = self.board.add(Sticker::new(source));
        self.active = Some(id);
        tracing::debug!(sticker = %id, "Sticker added");
        id
    }

    /// Delete a sticker. Clears the selection when it pointed at `id`.
    pub fn remove_sticker(&mut self, id: StickerId) -> Option<Sticker> {
        let removed = self.board.remove(id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        tracing::debug!(sticker = %id, "Sticker removed");
        Some(removed)
    }

    /// Size slider for the active sticker.
    pub fn set_active_scale(&mut self, scale: f64) -> EditorEffect {
        let Some(id) = self.active else {
            return EditorEffect::None;
        };
        let Some(sticker) = self.board.get_mut(id) else {
            return EditorEffect::None;
        };
        if !scale.is_finite() {
            return EditorEffect::None;
        }
        sticker.scale = scale.clamp(MIN_STICKER_SCALE, MAX_SLIDER_SCALE);
        EditorEffect::Updated(id)
    }

    /// Drop the selection and any gesture.
    pub fn deselect(&mut self) -> EditorEffect {
        self.drag = DragState::Idle;
        if self.active.take().is_some() {
            EditorEffect::SelectionChanged
        } else {
            EditorEffect::None
        }
    }

    pub fn pointer_down(&mut self, target: PointerTarget, point: ScreenPoint) -> EditorEffect {
        match target {
            PointerTarget::Background => self.deselect(),
            PointerTarget::Body(id) => self.begin_drag(id, DragMode::Move, point),
            PointerTarget::RotateHandle(id) => {
                if self.active != Some(id) {
                    return EditorEffect::None;
                }
                self.begin_drag(id, DragMode::Transform, point)
            }
            PointerTarget::DeleteHandle(id) => {
                if self.active != Some(id) {
                    return EditorEffect::None;
                }
                if let DragState::Active(session) = self.drag {
                    if session.sticker_id == id {
                        self.drag = DragState::Idle;
                    }
                }
                match self.remove_sticker(id) {
                    Some(_) => EditorEffect::Deleted(id),
                    None => EditorEffect::None,
                }
            }
        }
    }

    /// Apply the active gesture for the pointer at `point`.
    ///
    /// `canvas` is the preview canvas' current on-screen rect.
    pub fn pointer_move(&mut self, point: ScreenPoint, canvas: CanvasRect) -> EditorEffect {
        let DragState::Active(session) = self.drag else {
            return EditorEffect::None;
        };
        if canvas.is_degenerate() {
            return EditorEffect::None;
        }
        let Some(sticker) = self.board.get_mut(session.sticker_id) else {
            return EditorEffect::None;
        };

        let next = match session.mode {
            DragMode::Move => move_transform(&session, point, canvas),
            DragMode::Transform => rotate_scale_transform(&session, point, canvas),
        };
        sticker.set_transform(next);
        EditorEffect::Updated(session.sticker_id)
    }

    pub fn pointer_up(&mut self) -> EditorEffect {
        self.end_drag()
    }

    pub fn pointer_cancel(&mut self) -> EditorEffect {
        self.end_drag()
    }

    /// Take the board out, resetting selection and gesture state.
    pub fn take_board(&mut self) -> StickerBoard {
        self.active = None;
        self.drag = DragState::Idle;
        std::mem::take(&mut self.board)
    }

    fn begin_drag(&mut self, id: StickerId, mode: DragMode, point: ScreenPoint) -> EditorEffect {
        let Some(sticker) = self.board.get(id) else {
            return EditorEffect::None;
        };
        let session = DragSession {
            sticker_id: id,
            mode,
            start: point,
            initial: sticker.transform(),
        };
        if let DragState::Active(previous) = self.drag {
            tracing::debug!(
                previous = %previous.sticker_id,
                next = %id,
                "Replacing drag session"
            );
        }
        self.active = Some(id);
        self.drag = DragState::Active(session);
        EditorEffect::DragStarted(id)
    }

    fn end_drag(&mut self) -> EditorEffect {
        match std::mem::take(&mut self.drag) {
            DragState::Active(_) => EditorEffect::DragEnded,
            DragState::Idle => EditorEffect::None,
        }
    }
}

/// Move-mode result: pointer delta mapped to percent space, clamped per axis.
pub fn move_transform(
    session: &DragSession,
    point: ScreenPoint,
    canvas: CanvasRect,
) -> StickerTransform {
    let dx_pct = (point.x - session.start.x) / canvas.width * 100.0;
    let dy_pct = (point.y - session.start.y) / canvas.height * 100.0;
    StickerTransform {
        x: (session.initial.x + dx_pct).clamp(0.0, 100.0),
        y: (session.initial.y + dy_pct).clamp(0.0, 100.0),
        ..session.initial
    }
}

/// Transform-mode result: rotation and scale from the pivot-to-pointer vector.
///
/// Position is left untouched.
pub fn rotate_scale_transform(
    session: &DragSession,
    point: ScreenPoint,
    canvas: CanvasRect,
) -> StickerTransform {
    let pivot = canvas.percent_to_screen(session.initial.x, session.initial.y);
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    let rotation = dy.atan2(dx).to_degrees() - TRANSFORM_HANDLE_OFFSET_DEG;
    let scale = (dx.hypot(dy) / reference_radius(canvas)).max(MIN_STICKER_SCALE);
    StickerTransform {
        rotation,
        scale,
        ..session.initial
    }
}

/// Pivot-to-corner distance of a scale-1 sticker on the preview canvas.
pub fn reference_radius(canvas: CanvasRect) -> f64 {
    canvas.width * PREVIEW_FOOTPRINT_RATIO / SQRT_2
}
