//! Custom sticker administration.

use std::path::PathBuf;

use booth_backend::StickerFile;
use booth_common::config::AppConfig;
use clap::Subcommand;

use super::console;

#[derive(Subcommand)]
pub enum StickerAction {
    /// List uploaded stickers, newest first
    List,

    /// Upload image files as stickers
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Delete an uploaded sticker
    Delete { id: String },
}

pub async fn run(config: &AppConfig, pin: &str, action: StickerAction) -> anyhow::Result<()> {
    let mut console = console::open(config, pin).await?;

    match action {
        StickerAction::List => {
            let stickers = console.custom_stickers();
            println!("{} custom stickers", stickers.len());
            for s in stickers {
                println!("  {}  {}  {}  {}", s.id, s.name, s.mime_type, s.url);
            }
        }
        StickerAction::Upload { files } => {
            let mut batch = Vec::with_capacity(files.len());
            for path in &files {
                batch.push(StickerFile::from_path(path).await?);
            }
            let report = console.upload_stickers(batch).await?;
            for s in &report.succeeded {
                println!("[OK]   {} -> {}", s.name, s.url);
            }
            for f in &report.failed {
                println!("[FAIL] {}: {}", f.file, f.reason);
            }
            if report.succeeded.is_empty() && !report.failed.is_empty() {
                anyhow::bail!("No stickers were uploaded");
            }
        }
        StickerAction::Delete { id } => {
            if !console.delete_sticker(&id).await? {
                anyhow::bail!("Failed to delete sticker {id}");
            }
            println!("Deleted {id}");
        }
    }

    Ok(())
}
