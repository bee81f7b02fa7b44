//! Editing state for one set of captured photos.

use booth_common::BoothResult;
use booth_model::color::FrameColor;
use booth_model::composition::Composition;
use booth_model::image_ref::ImageRef;
use booth_model::layout::LayoutKind;
use booth_model::recipient::{format_partial, RecipientNumber, MAX_RECIPIENT_DIGITS};
use booth_model::records::SavedPhoto;
use booth_processing_core::interaction::StickerEditor;

use crate::export::PendingExport;

/// Where the session is in the save flow.
#[derive(Debug, Clone, Default)]
pub enum ExportPhase {
    #[default]
    Editing,
    /// Composite rendered; collecting an optional phone number.
    AwaitingRecipient {
        pending: Box<PendingExport>,
        digits: String,
    },
    /// Saved to the gallery.
    Confirmed(SavedPhoto),
}

/// Photos, stickers and frame color being edited.
#[derive(Debug, Clone)]
pub struct EditorSession {
    layout: LayoutKind,
    photos: Vec<ImageRef>,
    editor: StickerEditor,
    frame_color: FrameColor,
    phase: ExportPhase,
}

impl EditorSession {
    pub fn new(layout: LayoutKind, photos: Vec<ImageRef>, frame_color: FrameColor) -> Self {
        Self {
            layout,
            photos,
            editor: StickerEditor::new(),
            frame_color,
            phase: ExportPhase::Editing,
        }
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn photos(&self) -> &[ImageRef] {
        &self.photos
    }

    pub fn editor(&self) -> &StickerEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut StickerEditor {
        &mut self.editor
    }

    pub fn frame_color(&self) -> FrameColor {
        self.frame_color
    }

    pub fn set_frame_color(&mut self, color: FrameColor) {
        self.frame_color = color;
    }

    pub fn phase(&self) -> &ExportPhase {
        &self.phase
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.phase, ExportPhase::Editing)
    }

    /// Independent copy of the current composition.
    pub fn snapshot(&self) -> Composition {
        Composition {
            layout: self.layout,
            photos: self.photos.clone(),
            stickers: self.editor.stickers().to_vec(),
            frame_color: self.frame_color,
        }
    }

    /// Move to recipient entry with a rendered composite.
    pub fn await_recipient(&mut self, pending: PendingExport) {
        self.editor.deselect();
        self.phase = ExportPhase::AwaitingRecipient {
            pending: Box::new(pending),
            digits: String::new(),
        };
    }

    pub fn pending(&self) -> Option<&PendingExport> {
        match &self.phase {
            ExportPhase::AwaitingRecipient { pending, .. } => Some(pending.as_ref()),
            _ => None,
        }
    }

    /// Keypad input. Non-digits and digits past the maximum are ignored.
    pub fn enter_digit(&mut self, c: char) -> bool {
        match &mut self.phase {
            ExportPhase::AwaitingRecipient { digits, .. }
                if c.is_ascii_digit() && digits.len() < MAX_RECIPIENT_DIGITS =>
            {
                digits.push(c);
                true
            }
            _ => false,
        }
    }

    pub fn erase_digit(&mut self) -> bool {
        match &mut self.phase {
            ExportPhase::AwaitingRecipient { digits, .. } => digits.pop().is_some(),
            _ => false,
        }
    }

    /// Typed number as the keypad shows it.
    pub fn recipient_display(&self) -> Option<String> {
        match &self.phase {
            ExportPhase::AwaitingRecipient { digits, .. } => Some(format_partial(digits)),
            _ => None,
        }
    }

    /// Validate the typed number.
    pub fn recipient(&self) -> Option<BoothResult<RecipientNumber>> {
        match &self.phase {
            ExportPhase::AwaitingRecipient { digits, .. } => Some(RecipientNumber::parse(digits)),
            _ => None,
        }
    }

    /// Drop the rendered composite and go back to editing.
    pub fn cancel_recipient(&mut self) {
        if matches!(self.phase, ExportPhase::AwaitingRecipient { .. }) {
            self.phase = ExportPhase::Editing;
        }
    }

    pub fn confirm(&mut self, saved: SavedPhoto) {
        self.phase = ExportPhase::Confirmed(saved);
    }

    /// Back to editing after a save, stickers and frame intact.
    pub fn resume_editing(&mut self) {
        self.phase = ExportPhase::Editing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booth_model::sticker::{BuiltinSticker, StickerSource};

    fn session() -> EditorSession {
        EditorSession::new(
            LayoutKind::Postcard,
            vec![ImageRef::new("a"), ImageRef::new("b"), ImageRef::new("c")],
            FrameColor::WHITE,
        )
    }

    #[test]
    fn test_snapshot_is_independent_of_later_edits() {
        let mut s = session();
        s.editor_mut().add_sticker(StickerSource::Builtin {
            key: BuiltinSticker::Pearl,
        });
        let snap = s.snapshot();
        s.editor_mut().add_sticker(StickerSource::Builtin {
            key: BuiltinSticker::Crab,
        });
        s.set_frame_color(FrameColor::rgb(0, 0, 0));

        assert_eq!(snap.stickers.len(), 1);
        assert_eq!(snap.frame_color, FrameColor::WHITE);
        assert_eq!(snap.photos.len(), 3);
        assert_eq!(s.snapshot().stickers.len(), 2);
    }

    #[test]
    fn test_keypad_only_while_awaiting_recipient() {
        let mut s = session();
        assert!(!s.enter_digit('5'));
        assert!(s.recipient().is_none());
        assert!(s.recipient_display().is_none());
    }
}
