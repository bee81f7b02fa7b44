//! Rendering and saving the finished composite.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use booth_backend::GalleryStore;
use booth_common::{BoothError, BoothResult};
use booth_model::composition::Composition;
use booth_model::recipient::RecipientNumber;
use booth_model::records::SavedPhoto;
use booth_render_engine::{default_preview, generate_composite, CompositeImage, SourceLoader};

/// Admits at most one export at a time.
#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    busy: Arc<AtomicBool>,
}

impl ExportGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or fail with [`BoothError::ExportInFlight`].
    pub fn try_acquire(&self) -> BoothResult<ExportTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BoothError::ExportInFlight)?;
        Ok(ExportTicket {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of one export. Dropping it reopens the gate,
/// including when the export future itself is dropped.
#[derive(Debug)]
pub struct ExportTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// A rendered composite waiting for the recipient step.
#[derive(Debug, Clone)]
pub struct PendingExport {
    pub image: CompositeImage,
    /// JPEG gallery preview.
    pub preview: Vec<u8>,
}

/// Renders snapshots and saves them to the gallery.
pub struct Exporter {
    loader: Arc<dyn SourceLoader>,
    gallery: Arc<dyn GalleryStore>,
    gate: ExportGate,
}

impl Exporter {
    pub fn new(loader: Arc<dyn SourceLoader>, gallery: Arc<dyn GalleryStore>) -> Self {
        Self {
            loader,
            gallery,
            gate: ExportGate::new(),
        }
    }

    pub fn gate(&self) -> &ExportGate {
        &self.gate
    }

    /// Render `composition` and encode its preview.
    pub async fn render(&self, composition: &Composition) -> BoothResult<PendingExport> {
        let _ticket = self.gate.try_acquire()?;
        self.render_unguarded(composition).await
    }

    /// Save a rendered composite, optionally tagged with a recipient.
    pub async fn save(
        &self,
        pending: &PendingExport,
        recipient: Option<RecipientNumber>,
    ) -> BoothResult<SavedPhoto> {
        let _ticket = self.gate.try_acquire()?;
        self.save_unguarded(pending, recipient).await
    }

    /// Render and save in one step.
    pub async fn export(
        &self,
        composition: &Composition,
        recipient: Option<RecipientNumber>,
    ) -> BoothResult<SavedPhoto> {
        let _ticket = self.gate.try_acquire()?;
        let pending = self.render_unguarded(composition).await?;
        self.save_unguarded(&pending, recipient).await
    }

    async fn render_unguarded(&self, composition: &Composition) -> BoothResult<PendingExport> {
        let image = generate_composite(composition, self.loader.as_ref())
            .await
            .inspect_err(|e| tracing::error!(operation = "export.render", error = %e, "Composite failed"))?;
        let for_preview = image.clone();
        let preview = tokio::task::spawn_blocking(move || default_preview(&for_preview))
            .await
            .map_err(|e| BoothError::render(format!("preview task failed: {e}")))??;
        Ok(PendingExport { image, preview })
    }

    async fn save_unguarded(
        &self,
        pending: &PendingExport,
        recipient: Option<RecipientNumber>,
    ) -> BoothResult<SavedPhoto> {
        let has_recipient = recipient.is_some();
        let saved = self
            .gallery
            .save(pending.image.png().to_vec(), pending.preview.clone(), recipient)
            .await?;
        tracing::info!(
            operation = "export.save",
            id = %saved.id,
            has_recipient,
            "Composite saved to gallery"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_admits_one_ticket() {
        let gate = ExportGate::new();
        let ticket = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(matches!(gate.try_acquire(), Err(BoothError::ExportInFlight)));
        drop(ticket);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_ok());
    }

    #[test]
    fn test_gate_clones_share_state() {
        let gate = ExportGate::new();
        let other = gate.clone();
        let _ticket = other.try_acquire().unwrap();
        assert!(gate.try_acquire().is_err());
    }
}
