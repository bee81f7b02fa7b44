//! Layout templates.
//!
//! A layout fixes the composite's pixel dimensions, the per-photo aspect
//! ratio and the number of photos the capture step collects.

use std::fmt;
use std::str::FromStr;

use booth_common::BoothError;
use serde::{Deserialize, Serialize};

/// Named output template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Three 16:9 photos stacked on a 4x6 portrait card.
    #[default]
    Postcard,
    /// Four 4:3 photos printed twice as side-by-side 2x6 strips.
    Strips,
}

/// Immutable per-layout constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub photo_count: usize,
    pub width: u32,
    pub height: u32,
    /// Photo width over height.
    pub aspect_ratio: f64,
    pub name: &'static str,
    pub description: &'static str,
}

const POSTCARD: LayoutConfig = LayoutConfig {
    photo_count: 3,
    width: 1200,
    height: 1800,
    aspect_ratio: 16.0 / 9.0,
    name: "The Portrait",
    description: "A classic 4x6 vertical layout with three cinematic portraits.",
};

const STRIPS: LayoutConfig = LayoutConfig {
    photo_count: 4,
    width: 1200,
    height: 1800,
    aspect_ratio: 4.0 / 3.0,
    name: "Twin Strips",
    description: "Four moments, printed as two identical photo strips.",
};

impl LayoutKind {
    pub const ALL: [LayoutKind; 2] = [Self::Postcard, Self::Strips];

    pub fn config(&self) -> &'static LayoutConfig {
        match self {
            Self::Postcard => &POSTCARD,
            Self::Strips => &STRIPS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postcard => "postcard",
            Self::Strips => "strips",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postcard" => Ok(Self::Postcard),
            "strips" => Ok(Self::Strips),
            other => Err(BoothError::validation(format!("unknown layout '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_layouts_are_4x6_at_300dpi() {
        for layout in LayoutKind::ALL {
            let cfg = layout.config();
            assert_eq!((cfg.width, cfg.height), (1200, 1800));
        }
        assert_eq!(LayoutKind::Postcard.config().photo_count, 3);
        assert_eq!(LayoutKind::Strips.config().photo_count, 4);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Strips".parse::<LayoutKind>().unwrap(), LayoutKind::Strips);
        assert_eq!(LayoutKind::Postcard.to_string(), "postcard");
        assert!("collage".parse::<LayoutKind>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&LayoutKind::Strips).unwrap();
        assert_eq!(json, "\"strips\"");
    }
}
