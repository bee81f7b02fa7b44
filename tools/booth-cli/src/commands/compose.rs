//! Render a composition file.

use std::path::PathBuf;

use booth_model::Composition;
use booth_render_engine::{default_preview, generate_composite, HttpSourceLoader};

pub async fn run(input: PathBuf, output: PathBuf, preview: Option<PathBuf>) -> anyhow::Result<()> {
    let json = tokio::fs::read_to_string(&input)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;
    let composition = Composition::from_json(&json)
        .map_err(|e| anyhow::anyhow!("Invalid composition {}: {e}", input.display()))?;

    let loader = HttpSourceLoader::new()?;
    let image = generate_composite(&composition, &loader).await?;
    tokio::fs::write(&output, image.png()).await?;
    println!(
        "Wrote {} ({}x{}, {} photos, {} stickers)",
        output.display(),
        image.width(),
        image.height(),
        composition.photos.len(),
        composition.stickers.len()
    );

    if let Some(path) = preview {
        let jpeg = default_preview(&image)?;
        tokio::fs::write(&path, &jpeg).await?;
        println!("Wrote preview {} ({} bytes)", path.display(), jpeg.len());
    }

    Ok(())
}
