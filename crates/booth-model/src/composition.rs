//! Renderer input.

use serde::{Deserialize, Serialize};

use crate::color::FrameColor;
use crate::image_ref::ImageRef;
use crate::layout::LayoutKind;
use crate::sticker::Sticker;

/// Everything needed to produce one composite.
///
/// Photo order is slot order; sticker order is draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub layout: LayoutKind,
    #[serde(default)]
    pub photos: Vec<ImageRef>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default)]
    pub frame_color: FrameColor,
}

impl Composition {
    pub fn new(layout: LayoutKind) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    pub fn with_photos(mut self, photos: impl IntoIterator<Item = ImageRef>) -> Self {
        self.photos = photos.into_iter().collect();
        self
    }

    pub fn with_stickers(mut self, stickers: Vec<Sticker>) -> Self {
        self.stickers = stickers;
        self
    }

    pub fn with_frame_color(mut self, color: FrameColor) -> Self {
        self.frame_color = color;
        self
    }

    /// Load a composition from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sticker::BuiltinSticker;

    #[test]
    fn test_minimal_document_uses_defaults() {
        let c = Composition::from_json(r#"{ "layout": "strips" }"#).unwrap();
        assert_eq!(c.layout, LayoutKind::Strips);
        assert!(c.photos.is_empty());
        assert!(c.stickers.is_empty());
        assert_eq!(c.frame_color, FrameColor::WHITE);
    }

    #[test]
    fn test_document_with_stickers() {
        let json = r##"{
            "layout": "postcard",
            "photos": ["a.png", "b.png", ""],
            "frame_color": "#ffe4e6",
            "stickers": [{
                "id": "6f1c1d9e-8a39-4c7e-9a51-0d0c2f9b7a11",
                "source": { "kind": "builtin", "key": "heart" },
                "x": 25.0, "y": 75.0, "scale": 1.5, "rotation": -30.0
            }]
        }"##;
        let c = Composition::from_json(json).unwrap();
        assert_eq!(c.photos.len(), 3);
        assert!(c.photos[2].is_blank());
        assert_eq!(c.stickers[0].scale, 1.5);
        assert_eq!(c.stickers[0].source, crate::StickerSource::Builtin { key: BuiltinSticker::Heart });
    }
}
