//! Built-in sticker templates.
//!
//! Embedded so packaging does not need to locate assets on disk.

use booth_common::{BoothError, BoothResult};
use booth_model::sticker::BuiltinSticker;
use resvg::usvg;

/// SVG source for a built-in sticker.
pub fn svg_template(sticker: BuiltinSticker) -> &'static str {
    match sticker {
        BuiltinSticker::Starfish => include_str!("../assets/stickers/starfish.svg"),
        BuiltinSticker::Shell => include_str!("../assets/stickers/shell.svg"),
        BuiltinSticker::Bubble => include_str!("../assets/stickers/bubble.svg"),
        BuiltinSticker::Heart => include_str!("../assets/stickers/heart.svg"),
        BuiltinSticker::Sparkles => include_str!("../assets/stickers/sparkles.svg"),
        BuiltinSticker::Pearl => include_str!("../assets/stickers/pearl.svg"),
        BuiltinSticker::Anchor => include_str!("../assets/stickers/anchor.svg"),
        BuiltinSticker::Fish => include_str!("../assets/stickers/fish.svg"),
        BuiltinSticker::Crab => include_str!("../assets/stickers/crab.svg"),
        BuiltinSticker::Seaweed => include_str!("../assets/stickers/seaweed.svg"),
        BuiltinSticker::Coral => include_str!("../assets/stickers/coral.svg"),
        BuiltinSticker::Bow => include_str!("../assets/stickers/bow.svg"),
    }
}

/// Parse a built-in template into a render tree.
pub fn parse_template(sticker: BuiltinSticker) -> BoothResult<usvg::Tree> {
    usvg::Tree::from_data(svg_template(sticker).as_bytes(), &usvg::Options::default())
        .map_err(|e| BoothError::decode(format!("built-in sticker {sticker}"), e.to_string()))
}

/// Parse every built-in template, returning the ones that fail.
pub fn validate_templates() -> Vec<(BuiltinSticker, BoothError)> {
    BuiltinSticker::ALL
        .into_iter()
        .filter_map(|sticker| parse_template(sticker).err().map(|e| (sticker, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_parses() {
        let failures = validate_templates();
        assert!(failures.is_empty(), "unparseable templates: {failures:?}");
    }

    #[test]
    fn test_templates_are_square() {
        for sticker in BuiltinSticker::ALL {
            let tree = parse_template(sticker).unwrap();
            assert_eq!(tree.size().width(), tree.size().height(), "{sticker}");
        }
    }
}
