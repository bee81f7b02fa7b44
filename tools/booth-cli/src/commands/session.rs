//! One kiosk session, start to finish, without a screen.

use std::path::PathBuf;
use std::sync::Arc;

use booth_backend::{GalleryStore, MemoryGallery, RestBackend};
use booth_common::config::AppConfig;
use booth_kiosk::{Exporter, FlowSettings, KioskFlow, KioskStep, ReplayFrameSource};
use booth_model::{BuiltinSticker, FrameColor, LayoutKind, StickerSource};
use booth_render_engine::HttpSourceLoader;

pub struct SessionArgs {
    pub frames: Vec<PathBuf>,
    pub layout: Option<String>,
    pub stickers: Vec<String>,
    pub frame_color: Option<String>,
    pub recipient: Option<String>,
    pub output: Option<PathBuf>,
}

pub async fn run(config: &AppConfig, args: SessionArgs) -> anyhow::Result<()> {
    let gallery: Arc<dyn GalleryStore> = match RestBackend::from_config(&config.backend) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            tracing::warn!(error = %e, "Backend not configured, saving to an in-memory gallery");
            Arc::new(MemoryGallery::new())
        }
    };
    let exporter = Exporter::new(Arc::new(HttpSourceLoader::new()?), gallery);

    let (mut flow, _events) = KioskFlow::new(FlowSettings::from_config(&config.kiosk));
    let layout = match &args.layout {
        Some(name) => name.parse::<LayoutKind>()?,
        None => flow.layout(),
    };
    flow.select_layout(layout)?;

    let camera = ReplayFrameSource::from_files(&args.frames).await?;
    let mut shots = 0;
    while flow.capture_next(&camera).await? == KioskStep::Capture {
        shots += 1;
        println!("Captured photo {shots}");
    }
    println!("Captured photo {}; opening the editor", shots + 1);

    let session = flow
        .session_mut()
        .ok_or_else(|| anyhow::anyhow!("Editor did not open"))?;
    for key in &args.stickers {
        let key: BuiltinSticker = key.parse()?;
        session.editor_mut().add_sticker(StickerSource::Builtin { key });
    }
    if let Some(color) = &args.frame_color {
        session.set_frame_color(color.parse::<FrameColor>()?);
    }

    flow.begin_save(&exporter).await?;
    if let Some(path) = &args.output {
        let pending = flow
            .session()
            .and_then(|s| s.pending())
            .ok_or_else(|| anyhow::anyhow!("No composite was rendered"))?;
        tokio::fs::write(path, pending.image.png()).await?;
        println!(
            "Wrote {} ({}x{})",
            path.display(),
            pending.image.width(),
            pending.image.height()
        );
    }

    let saved = match &args.recipient {
        Some(number) => {
            if let Some(session) = flow.session_mut() {
                for c in number.chars() {
                    session.enter_digit(c);
                }
            }
            flow.submit_recipient(&exporter).await?
        }
        None => flow.skip_recipient(&exporter).await?,
    };

    println!("Saved {} to the gallery", saved.id);
    if let Some(recipient) = &saved.recipient {
        println!("  Recipient: {recipient}");
    }
    if let Some(secs) = flow.seconds_left() {
        println!("  Kiosk would return home in {secs}s");
    }
    flow.back_to_home();
    Ok(())
}
