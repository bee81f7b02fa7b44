//! Frame (background) colors.

use std::fmt;
use std::str::FromStr;

use booth_common::BoothError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FrameColor {
    pub const WHITE: FrameColor = FrameColor::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for FrameColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for FrameColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for FrameColor {
    type Err = BoothError;

    /// Accepts `#rrggbb` and `#rgb` (leading `#` optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BoothError::validation(format!("invalid color '{s}'"));
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |src: &str| u8::from_str_radix(src, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl Serialize for FrameColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FrameColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A named palette entry offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedColor {
    pub name: &'static str,
    pub color: FrameColor,
}

/// Frame colors offered in the editor, in display order.
pub const FRAME_PALETTE: [NamedColor; 10] = [
    NamedColor { name: "Classic White", color: FrameColor::rgb(0xff, 0xff, 0xff) },
    NamedColor { name: "Cream", color: FrameColor::rgb(0xff, 0xfb, 0xeb) },
    NamedColor { name: "Soft Rose", color: FrameColor::rgb(0xff, 0xe4, 0xe6) },
    NamedColor { name: "Pale Azure", color: FrameColor::rgb(0xe0, 0xf2, 0xfe) },
    NamedColor { name: "Mint", color: FrameColor::rgb(0xd1, 0xfa, 0xe5) },
    NamedColor { name: "Lavender", color: FrameColor::rgb(0xf3, 0xe8, 0xff) },
    NamedColor { name: "Peach", color: FrameColor::rgb(0xff, 0xed, 0xd5) },
    NamedColor { name: "Lemon", color: FrameColor::rgb(0xfe, 0xf9, 0xc3) },
    NamedColor { name: "Slate Gray", color: FrameColor::rgb(0xcb, 0xd5, 0xe1) },
    NamedColor { name: "Obsidian", color: FrameColor::rgb(0x0f, 0x17, 0x2a) },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_hex() {
        assert_eq!("#0f172a".parse::<FrameColor>().unwrap(), FrameColor::rgb(15, 23, 42));
        assert_eq!("#fff".parse::<FrameColor>().unwrap(), FrameColor::WHITE);
        assert_eq!("FFE4E6".parse::<FrameColor>().unwrap().to_hex(), "#ffe4e6");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("#12345".parse::<FrameColor>().is_err());
        assert!("#gggggg".parse::<FrameColor>().is_err());
        assert!("rgb(0,0,0)".parse::<FrameColor>().is_err());
        assert!("#ééé".parse::<FrameColor>().is_err());
    }

    #[test]
    fn test_palette_starts_with_white() {
        assert_eq!(FRAME_PALETTE[0].color, FrameColor::default());
        assert_eq!(FRAME_PALETTE[9].color.to_hex(), "#0f172a");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&FrameColor::rgb(0xd1, 0xfa, 0xe5)).unwrap();
        assert_eq!(json, "\"#d1fae5\"");
        let back: FrameColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FrameColor::rgb(0xd1, 0xfa, 0xe5));
    }
}
