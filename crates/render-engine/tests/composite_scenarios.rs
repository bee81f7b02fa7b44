//! End-to-end composite rendering through the in-memory loader.

use std::io::Cursor;

use booth_common::BoothError;
use booth_model::{BuiltinSticker, Composition, FrameColor, ImageRef, LayoutKind, Sticker};
use booth_render_engine::{encode_preview, generate_composite, MemorySourceLoader};
use image::{ImageFormat, Rgba, RgbaImage};

const BLUE: [u8; 4] = [0, 0, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn solid_png(color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(8, 6, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn solid_sticker(color: [u8; 4]) -> Sticker {
    Sticker::custom(ImageRef::from_bytes("image/png", &solid_png(color)))
}

fn blue_loader(names: &[&str]) -> MemorySourceLoader {
    names
        .iter()
        .fold(MemorySourceLoader::new(), |loader, name| {
            loader.with(*name, solid_png(BLUE))
        })
}

fn photos(names: &[&str]) -> Vec<ImageRef> {
    names.iter().map(|n| ImageRef::new(*n)).collect()
}

#[tokio::test]
async fn test_postcard_with_centered_sticker() {
    let names = ["a.png", "b.png", "c.png"];
    let composition = Composition::new(LayoutKind::Postcard)
        .with_photos(photos(&names))
        .with_stickers(vec![solid_sticker(RED).at(50.0, 50.0)]);

    let image = generate_composite(&composition, &blue_loader(&names))
        .await
        .unwrap();

    assert_eq!((image.width(), image.height()), (1200, 1800));
    // Sticker is a 150px square centered on the canvas.
    assert_eq!(image.pixel(600, 900), Some(RED));
    assert_eq!(image.pixel(530, 830), Some(RED));
    assert_eq!(image.pixel(670, 970), Some(RED));
    // Beyond the sticker and its shadow, the middle photo shows through.
    assert_eq!(image.pixel(700, 900), Some(BLUE));
    // Frame border stays the frame color.
    assert_eq!(image.pixel(10, 10), Some(WHITE));
    // Photo shadow darkens the frame just below the first photo.
    let below = image.pixel(600, 605).unwrap();
    assert!(below[0] < 255 && below[0] > 200, "shadow pixel {below:?}");
}

#[tokio::test]
async fn test_rotated_sticker_turns_about_its_center() {
    let names = ["a.png", "b.png", "c.png"];
    let composition = Composition::new(LayoutKind::Postcard)
        .with_photos(photos(&names))
        .with_stickers(vec![solid_sticker(RED).at(50.0, 50.0).with_rotation(45.0)]);

    let image = generate_composite(&composition, &blue_loader(&names))
        .await
        .unwrap();

    assert_eq!(image.pixel(600, 900), Some(RED));
    // A diamond now: further along the axis, the old corner is uncovered.
    assert_eq!(image.pixel(695, 900), Some(RED));
    assert_eq!(image.pixel(670, 830), Some(BLUE));
}

#[tokio::test]
async fn test_strips_with_partial_photos() {
    let names = ["a.png", "b.png"];
    let composition = Composition::new(LayoutKind::Strips).with_photos(photos(&names));

    let image = generate_composite(&composition, &blue_loader(&names))
        .await
        .unwrap();

    assert_eq!((image.width(), image.height()), (1200, 1800));
    // Each photo is printed twice, side by side.
    for (x, y) in [(300, 684), (900, 684), (300, 1116), (900, 1116)] {
        assert_eq!(image.pixel(x, y), Some(BLUE), "at ({x}, {y})");
    }
    // Empty slots leave the frame untouched.
    assert_eq!(image.pixel(300, 200), Some(WHITE));
    assert_eq!(image.pixel(300, 1600), Some(WHITE));
}

#[tokio::test]
async fn test_dimensions_never_depend_on_photo_count() {
    let names = ["a.png", "b.png", "c.png", "d.png"];
    let teal = FrameColor::rgb(0x0d, 0x94, 0x88);
    for layout in LayoutKind::ALL {
        for count in 0..=layout.config().photo_count {
            let composition = Composition::new(layout)
                .with_photos(photos(&names[..count]))
                .with_frame_color(teal);
            let image = generate_composite(&composition, &blue_loader(&names))
                .await
                .unwrap();
            assert_eq!((image.width(), image.height()), (1200, 1800), "{layout} x{count}");
            assert_eq!(image.pixel(0, 0), Some([0x0d, 0x94, 0x88, 255]));
        }
    }
}

#[tokio::test]
async fn test_later_stickers_draw_on_top() {
    let red_then_green = Composition::new(LayoutKind::Postcard).with_stickers(vec![
        solid_sticker(RED).at(50.0, 50.0),
        solid_sticker(GREEN).at(50.0, 50.0),
    ]);
    let loader = MemorySourceLoader::new();
    let image = generate_composite(&red_then_green, &loader).await.unwrap();
    assert_eq!(image.pixel(600, 900), Some(GREEN));

    let mut stickers = red_then_green.stickers.clone();
    stickers.reverse();
    let green_then_red = red_then_green.clone().with_stickers(stickers);
    let image = generate_composite(&green_then_red, &loader).await.unwrap();
    assert_eq!(image.pixel(600, 900), Some(RED));
}

#[tokio::test]
async fn test_rendering_is_deterministic() {
    let names = ["a.png", "b.png", "c.png"];
    let composition = Composition::new(LayoutKind::Postcard)
        .with_photos(photos(&names))
        .with_stickers(vec![
            Sticker::builtin(BuiltinSticker::Starfish).at(20.0, 30.0).with_scale(1.4),
            solid_sticker(GREEN).at(70.0, 80.0).with_rotation(-30.0),
        ])
        .with_frame_color(FrameColor::rgb(0xfd, 0xf2, 0xf8));
    let loader = blue_loader(&names);

    let first = generate_composite(&composition, &loader).await.unwrap();
    let second = generate_composite(&composition, &loader).await.unwrap();
    assert_eq!(first.png(), second.png());
}

#[tokio::test]
async fn test_builtin_sticker_paints_inside_its_box() {
    let composition = Composition::new(LayoutKind::Postcard)
        .with_stickers(vec![Sticker::builtin(BuiltinSticker::Heart).at(50.0, 50.0)]);
    let image = generate_composite(&composition, &MemorySourceLoader::new())
        .await
        .unwrap();

    let painted = (525..675)
        .step_by(5)
        .flat_map(|x| (825..975).step_by(5).map(move |y| (x, y)))
        .filter(|&(x, y)| image.pixel(x, y) != Some(WHITE))
        .count();
    assert!(painted > 0);
    assert_eq!(image.pixel(400, 900), Some(WHITE));
}

#[tokio::test]
async fn test_undecodable_photo_fails_whole_composite() {
    let loader = MemorySourceLoader::new()
        .with("a.png", solid_png(BLUE))
        .with("broken.png", b"not an image at all".to_vec());
    let composition =
        Composition::new(LayoutKind::Postcard).with_photos(photos(&["a.png", "broken.png"]));

    let err = generate_composite(&composition, &loader).await.unwrap_err();
    match err {
        BoothError::Decode { reference, .. } => assert!(reference.contains("photo 2"), "{reference}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_sticker_fails_whole_composite() {
    let composition = Composition::new(LayoutKind::Postcard)
        .with_stickers(vec![Sticker::custom(ImageRef::new("missing.png"))]);
    let err = generate_composite(&composition, &MemorySourceLoader::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BoothError::Decode { .. }));
}

#[tokio::test]
async fn test_oversized_sticker_is_a_render_error() {
    let composition = Composition::new(LayoutKind::Postcard)
        .with_stickers(vec![Sticker::builtin(BuiltinSticker::Heart).with_scale(1e8)]);
    let err = generate_composite(&composition, &MemorySourceLoader::new())
        .await
        .unwrap_err();
    match err {
        BoothError::Render { message } => assert!(message.contains("too large"), "{message}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_slots_keep_their_position() {
    let loader = blue_loader(&["b.png"]);
    let composition = Composition::new(LayoutKind::Postcard).with_photos(vec![
        ImageRef::blank(),
        ImageRef::new("b.png"),
        ImageRef::blank(),
    ]);

    let image = generate_composite(&composition, &loader).await.unwrap();
    assert_eq!(image.pixel(600, 320), Some(WHITE));
    assert_eq!(image.pixel(600, 900), Some(BLUE));
    assert_eq!(image.pixel(600, 1480), Some(WHITE));
    assert_eq!(loader.requests(), vec!["b.png"]);
}

#[tokio::test]
async fn test_sources_load_in_draw_order() {
    let loader = MemorySourceLoader::new()
        .with("p1.png", solid_png(BLUE))
        .with("p2.png", solid_png(BLUE))
        .with("s1.png", solid_png(RED))
        .with("s2.png", solid_png(GREEN));
    let composition = Composition::new(LayoutKind::Strips)
        .with_photos(photos(&["p1.png", "p2.png"]))
        .with_stickers(vec![
            Sticker::custom(ImageRef::new("s2.png")),
            Sticker::builtin(BuiltinSticker::Bow),
            Sticker::custom(ImageRef::new("s1.png")),
        ]);

    generate_composite(&composition, &loader).await.unwrap();
    assert_eq!(loader.requests(), vec!["p1.png", "p2.png", "s2.png", "s1.png"]);
}

#[tokio::test]
async fn test_extra_photos_are_ignored() {
    let names = ["a.png", "b.png", "c.png", "d.png"];
    let loader = blue_loader(&names);
    let composition = Composition::new(LayoutKind::Postcard).with_photos(photos(&names));

    generate_composite(&composition, &loader).await.unwrap();
    assert_eq!(loader.requests(), vec!["a.png", "b.png", "c.png"]);
}

#[tokio::test]
async fn test_preview_is_a_downscaled_jpeg() {
    let composition = Composition::new(LayoutKind::Strips);
    let image = generate_composite(&composition, &MemorySourceLoader::new())
        .await
        .unwrap();

    let jpeg = encode_preview(&image, 800, 70).unwrap();
    let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 1200));
}
