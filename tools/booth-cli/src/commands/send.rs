//! Send an image through the messaging relay.

use std::path::Path;

use booth_backend::stickers::mime_for_name;
use booth_backend::ImageReference;
use booth_common::config::AppConfig;

use super::console;

pub async fn run(
    config: &AppConfig,
    pin: &str,
    to: &str,
    image: &str,
    caption: Option<String>,
) -> anyhow::Result<()> {
    let image = if image.starts_with("http://") || image.starts_with("https://") {
        ImageReference::Url(image.to_string())
    } else {
        let bytes = tokio::fs::read(image)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {image}: {e}"))?;
        let name = Path::new(image)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(image);
        ImageReference::inline(mime_for_name(name).unwrap_or("image/jpeg"), &bytes)
    };

    let mut console = console::open(config, pin).await?;
    let outcome = console.send(to, image, caption).await?;
    if !outcome.success {
        anyhow::bail!("Relay rejected the message: {}", outcome.provider_response);
    }
    println!("Sent to {to}");
    Ok(())
}
