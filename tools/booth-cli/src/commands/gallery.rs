//! Gallery administration.

use std::path::PathBuf;
use std::sync::Arc;

use booth_backend::RestBackend;
use booth_common::config::AppConfig;
use booth_kiosk::Exporter;
use booth_model::{Composition, GalleryPage, RecipientNumber};
use booth_render_engine::HttpSourceLoader;
use clap::Subcommand;

use super::console;

#[derive(Subcommand)]
pub enum GalleryAction {
    /// List one page of saved photos, newest first
    List {
        #[arg(long, default_value = "1")]
        page: u32,

        /// Override the configured page size
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Render a composition and save it to the gallery
    Save {
        /// Composition file
        input: PathBuf,

        /// Phone number to attach
        #[arg(long)]
        recipient: Option<String>,
    },

    /// Delete one photo
    Delete { id: String },

    /// Delete every photo
    Clear {
        /// Confirm deleting the whole gallery
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(mut config: AppConfig, pin: &str, action: GalleryAction) -> anyhow::Result<()> {
    if let GalleryAction::List {
        page_size: Some(size),
        ..
    } = &action
    {
        config.kiosk.gallery_page_size = *size;
    }
    let mut console = console::open(&config, pin).await?;

    match action {
        GalleryAction::List { page, .. } => {
            let listing = console.load_page(page).await?;
            print_page(listing);
        }
        GalleryAction::Save { input, recipient } => {
            let recipient = recipient.as_deref().map(RecipientNumber::parse).transpose()?;
            let json = tokio::fs::read_to_string(&input).await?;
            let composition = Composition::from_json(&json)
                .map_err(|e| anyhow::anyhow!("Invalid composition {}: {e}", input.display()))?;

            let backend = Arc::new(RestBackend::from_config(&config.backend)?);
            let exporter = Exporter::new(Arc::new(HttpSourceLoader::new()?), backend);
            let saved = exporter.export(&composition, recipient).await?;
            println!("Saved {}", saved.id);
            println!("  Preview: {}", saved.preview_url);
            if let Some(url) = &saved.full_size_url {
                println!("  Full size: {url}");
            }
        }
        GalleryAction::Delete { id } => {
            console.delete_photo(&id).await?;
            println!("Deleted {id}");
        }
        GalleryAction::Clear { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete every photo without --yes");
            }
            console.delete_all_photos().await?;
            println!("Gallery cleared");
        }
    }

    Ok(())
}

fn print_page(page: &GalleryPage) {
    println!(
        "Page {} of {} ({} photos)",
        page.page, page.total_pages, page.total
    );
    for photo in &page.items {
        let recipient = photo
            .recipient
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {}  {}  {}",
            photo.id,
            photo.created_at.format("%Y-%m-%d %H:%M"),
            recipient,
            photo.preview_url
        );
    }
}
