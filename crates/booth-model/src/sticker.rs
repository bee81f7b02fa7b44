//! Sticker placement model.
//!
//! Positions are percentages (`0..=100`) of the canvas width/height and refer
//! to the sticker's center. `scale` multiplies [`BASE_STICKER_PX`] on the
//! full-resolution composite; `rotation` is clockwise degrees and is never
//! normalized.

use std::fmt;
use std::str::FromStr;

use booth_common::BoothError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::image_ref::ImageRef;

/// Sticker edge length on the composite at scale 1.
pub const BASE_STICKER_PX: f64 = 150.0;

/// Smallest scale a transform drag may produce.
pub const MIN_STICKER_SCALE: f64 = 0.2;

/// Largest scale reachable from the size slider.
pub const MAX_SLIDER_SCALE: f64 = 2.5;

/// Sticker width on the preview canvas at scale 1, as a fraction of canvas width.
pub const PREVIEW_FOOTPRINT_RATIO: f64 = 0.125;

/// Stable identifier of one placed sticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StickerId(Uuid);

impl StickerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for StickerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StickerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Built-in vector sticker assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinSticker {
    Starfish,
    Shell,
    Bubble,
    Heart,
    Sparkles,
    Pearl,
    Anchor,
    Fish,
    Crab,
    Seaweed,
    Coral,
    Bow,
}

impl BuiltinSticker {
    /// Every built-in asset, in palette order.
    pub const ALL: [BuiltinSticker; 12] = [
        Self::Starfish,
        Self::Shell,
        Self::Bubble,
        Self::Heart,
        Self::Sparkles,
        Self::Pearl,
        Self::Anchor,
        Self::Fish,
        Self::Crab,
        Self::Seaweed,
        Self::Coral,
        Self::Bow,
    ];

    /// Symbolic key used in serialized compositions.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Starfish => "starfish",
            Self::Shell => "shell",
            Self::Bubble => "bubble",
            Self::Heart => "heart",
            Self::Sparkles => "sparkles",
            Self::Pearl => "pearl",
            Self::Anchor => "anchor",
            Self::Fish => "fish",
            Self::Crab => "crab",
            Self::Seaweed => "seaweed",
            Self::Coral => "coral",
            Self::Bow => "bow",
        }
    }
}

impl fmt::Display for BuiltinSticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BuiltinSticker {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sticker| sticker.key() == s)
            .ok_or_else(|| BoothError::validation(format!("unknown built-in sticker '{s}'")))
    }
}

/// Where a sticker's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StickerSource {
    /// A built-in vector template.
    Builtin { key: BuiltinSticker },
    /// A user-uploaded raster or vector image.
    Custom { url: ImageRef },
}

/// Position, scale and rotation of one sticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StickerTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl Default for StickerTransform {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// One placed decoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    /// Generated when a document omits it.
    #[serde(default)]
    pub id: StickerId,
    pub source: StickerSource,
    /// Center x as percent of canvas width.
    pub x: f64,
    /// Center y as percent of canvas height.
    pub y: f64,
    pub scale: f64,
    /// Clockwise degrees about the sticker center.
    pub rotation: f64,
}

impl Sticker {
    /// New sticker centered on the canvas at scale 1, unrotated.
    pub fn new(source: StickerSource) -> Self {
        let t = StickerTransform::default();
        Self {
            id: StickerId::new(),
            source,
            x: t.x,
            y: t.y,
            scale: t.scale,
            rotation: t.rotation,
        }
    }

    pub fn builtin(key: BuiltinSticker) -> Self {
        Self::new(StickerSource::Builtin { key })
    }

    pub fn custom(url: impl Into<ImageRef>) -> Self {
        Self::new(StickerSource::Custom { url: url.into() })
    }

    pub fn is_custom_asset(&self) -> bool {
        matches!(self.source, StickerSource::Custom { .. })
    }

    pub fn transform(&self) -> StickerTransform {
        StickerTransform {
            x: self.x,
            y: self.y,
            scale: self.scale,
            rotation: self.rotation,
        }
    }

    pub fn set_transform(&mut self, t: StickerTransform) {
        self.x = t.x;
        self.y = t.y;
        self.scale = t.scale;
        self.rotation = t.rotation;
    }

    /// Builder-style placement, mostly for tests and scripted compositions.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Ordered sticker list. Insertion order is draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StickerBoard {
    stickers: Vec<Sticker>,
}

impl StickerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sticker on top of all others.
    pub fn add(&mut self, sticker: Sticker) -> StickerId {
        let id = sticker.id;
        self.stickers.push(sticker);
        id
    }

    /// Remove a sticker, returning it if it was present.
    pub fn remove(&mut self, id: StickerId) -> Option<Sticker> {
        let idx = self.stickers.iter().position(|s| s.id == id)?;
        Some(self.stickers.remove(idx))
    }

    pub fn get(&self, id: StickerId) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: StickerId) -> Option<&mut Sticker> {
        self.stickers.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: StickerId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sticker> {
        self.stickers.iter()
    }

    pub fn len(&self) -> usize {
        self.stickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty()
    }

    pub fn clear(&mut self) {
        self.stickers.clear();
    }

    pub fn as_slice(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn to_vec(&self) -> Vec<Sticker> {
        self.stickers.clone()
    }
}

impl From<Vec<Sticker>> for StickerBoard {
    fn from(stickers: Vec<Sticker>) -> Self {
        Self { stickers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sticker_defaults() {
        let s = Sticker::builtin(BuiltinSticker::Heart);
        assert_eq!(s.x, 50.0);
        assert_eq!(s.y, 50.0);
        assert_eq!(s.scale, 1.0);
        assert_eq!(s.rotation, 0.0);
        assert!(!s.is_custom_asset());
        assert!(Sticker::custom("https://cdn.example/a.png").is_custom_asset());
    }

    #[test]
    fn test_builtin_keys_roundtrip_through_fromstr() {
        for sticker in BuiltinSticker::ALL {
            assert_eq!(sticker.key().parse::<BuiltinSticker>().unwrap(), sticker);
        }
        assert!("kraken".parse::<BuiltinSticker>().is_err());
    }

    #[test]
    fn test_unknown_builtin_key_fails_deserialization() {
        let json = r#"{"kind":"builtin","key":"kraken"}"#;
        assert!(serde_json::from_str::<StickerSource>(json).is_err());

        let json = r#"{"kind":"builtin","key":"starfish"}"#;
        let source: StickerSource = serde_json::from_str(json).unwrap();
        assert_eq!(
            source,
            StickerSource::Builtin {
                key: BuiltinSticker::Starfish
            }
        );
    }

    #[test]
    fn test_board_preserves_insertion_order() {
        let mut board = StickerBoard::new();
        let a = board.add(Sticker::builtin(BuiltinSticker::Shell));
        let b = board.add(Sticker::builtin(BuiltinSticker::Crab));
        let c = board.add(Sticker::builtin(BuiltinSticker::Bow));

        let ids: Vec<_> = board.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, b, c]);

        board.remove(b).unwrap();
        let ids: Vec<_> = board.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(board.remove(b).is_none());
    }

    #[test]
    fn test_sticker_ids_are_unique() {
        let a = Sticker::builtin(BuiltinSticker::Pearl);
        let b = Sticker::builtin(BuiltinSticker::Pearl);
        assert_ne!(a.id, b.id);
    }
}
