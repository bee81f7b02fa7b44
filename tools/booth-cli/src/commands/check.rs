//! Show configuration and check the built-in sticker assets.

use booth_common::config::{config_file_path, AppConfig};
use booth_model::{BuiltinSticker, LayoutKind};
use booth_render_engine::assets::validate_templates;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Photobooth Check");
    println!("{}", "=".repeat(50));

    let path = config_file_path();
    if path.exists() {
        println!("[OK] Config file: {}", path.display());
    } else {
        println!("[--] Config file: {} (not found, using defaults)", path.display());
    }

    match (&config.backend.base_url, &config.backend.api_key) {
        (Some(url), Some(_)) => println!("[OK] Backend: {url}"),
        (Some(url), None) => println!("[WARN] Backend: {url} (no API key)"),
        _ => println!("[WARN] Backend: not configured (BOOTH_BACKEND_URL)"),
    }
    println!(
        "     buckets: photos={} stickers={} table={}",
        config.backend.photos_bucket, config.backend.stickers_bucket, config.backend.stickers_table
    );

    match &config.messaging.endpoint {
        Some(url) => println!("[OK] Messaging relay: {url}"),
        None => println!("[WARN] Messaging relay: not configured (BOOTH_MESSAGING_URL)"),
    }

    let kiosk = &config.kiosk;
    println!(
        "[OK] Kiosk: layout={} frame={} confirmation={}s page size={}",
        kiosk.default_layout, kiosk.default_frame_color, kiosk.confirmation_secs, kiosk.gallery_page_size
    );
    if kiosk.default_layout.parse::<LayoutKind>().is_err() {
        println!("[WARN] Unknown default layout '{}', postcard will be used", kiosk.default_layout);
    }
    if kiosk.admin_pin == "1234" {
        println!("[WARN] Admin PIN is the factory default");
    }

    println!();
    let failures = validate_templates();
    println!(
        "Built-in stickers: {}/{} parse",
        BuiltinSticker::ALL.len() - failures.len(),
        BuiltinSticker::ALL.len()
    );
    for (sticker, err) in &failures {
        println!("  [FAIL] {sticker}: {err}");
    }

    println!();
    if failures.is_empty() {
        println!("All built-in assets are available. The booth is ready.");
        Ok(())
    } else {
        anyhow::bail!("{} built-in sticker templates failed to parse", failures.len())
    }
}
