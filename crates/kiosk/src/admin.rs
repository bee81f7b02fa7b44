//! PIN-gated admin console.
//!
//! Local state only changes after the collaborator confirms an operation;
//! a failed delete or upload leaves the cached listing as it was.

use std::collections::VecDeque;
use std::sync::Arc;

use booth_backend::{
    GalleryStore, ImageReference, MessagingRelay, SendOutcome, SendRequest, SentMessage,
    StickerFile, StickerStore, UploadReport,
};
use booth_common::config::KioskConfig;
use booth_common::{BoothError, BoothResult};
use booth_model::recipient::RecipientNumber;
use booth_model::records::{CustomSticker, GalleryPage};

/// Sent messages kept for the history panel.
pub const SENT_HISTORY_LIMIT: usize = 20;

pub struct AdminConsole {
    pin: String,
    unlocked: bool,
    page_size: u32,
    default_caption: String,
    gallery: Arc<dyn GalleryStore>,
    stickers: Arc<dyn StickerStore>,
    relay: Arc<dyn MessagingRelay>,
    page: Option<GalleryPage>,
    custom_stickers: Vec<CustomSticker>,
    sent: VecDeque<SentMessage>,
}

impl AdminConsole {
    pub fn new(
        config: &KioskConfig,
        gallery: Arc<dyn GalleryStore>,
        stickers: Arc<dyn StickerStore>,
        relay: Arc<dyn MessagingRelay>,
    ) -> Self {
        Self {
            pin: config.admin_pin.clone(),
            unlocked: false,
            page_size: config.gallery_page_size.max(1),
            default_caption: String::new(),
            gallery,
            stickers,
            relay,
            page: None,
            custom_stickers: Vec::new(),
            sent: VecDeque::with_capacity(SENT_HISTORY_LIMIT),
        }
    }

    /// Caption used when a send does not provide one.
    pub fn with_default_caption(mut self, caption: impl Into<String>) -> Self {
        self.default_caption = caption.into();
        self
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Unlock with the PIN, then load the first gallery page and the stickers.
    pub async fn unlock(&mut self, pin: &str) -> BoothResult<()> {
        if pin != self.pin {
            tracing::warn!("Rejected admin PIN");
            return Err(BoothError::Locked);
        }
        self.unlocked = true;
        tracing::info!("Admin console unlocked");
        self.load_page(1).await?;
        self.refresh_stickers().await?;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
        self.page = None;
        self.custom_stickers.clear();
    }

    pub fn page(&self) -> Option<&GalleryPage> {
        self.page.as_ref()
    }

    pub fn custom_stickers(&self) -> &[CustomSticker] {
        &self.custom_stickers
    }

    /// Most recent first.
    pub fn sent_messages(&self) -> impl Iterator<Item = &SentMessage> {
        self.sent.iter()
    }

    pub async fn load_page(&mut self, page: u32) -> BoothResult<&GalleryPage> {
        self.ensure_unlocked()?;
        let mut loaded = self.gallery.list(page.max(1), self.page_size).await?;
        // Deleting the last item of the last page leaves us past the end.
        if loaded.items.is_empty() && loaded.page > loaded.total_pages {
            loaded = self.gallery.list(loaded.total_pages, self.page_size).await?;
        }
        Ok(self.page.insert(loaded))
    }

    pub async fn next_page(&mut self) -> BoothResult<&GalleryPage> {
        let page = self.current_page_number();
        let next = match &self.page {
            Some(p) if p.has_next() => page + 1,
            _ => page,
        };
        self.load_page(next).await
    }

    pub async fn previous_page(&mut self) -> BoothResult<&GalleryPage> {
        let page = self.current_page_number();
        self.load_page(page.saturating_sub(1).max(1)).await
    }

    /// Delete one photo, then refetch the current page.
    pub async fn delete_photo(&mut self, id: &str) -> BoothResult<()> {
        self.ensure_unlocked()?;
        self.gallery.delete(id).await?;
        let page = self.current_page_number();
        self.load_page(page).await?;
        Ok(())
    }

    pub async fn delete_all_photos(&mut self) -> BoothResult<()> {
        self.ensure_unlocked()?;
        self.gallery.delete_all().await?;
        tracing::warn!("Gallery cleared from admin console");
        self.load_page(1).await?;
        Ok(())
    }

    pub async fn refresh_stickers(&mut self) -> BoothResult<&[CustomSticker]> {
        self.ensure_unlocked()?;
        self.custom_stickers = self.stickers.list_custom().await?;
        Ok(&self.custom_stickers)
    }

    /// Upload a batch and refresh the listing if anything went through.
    pub async fn upload_stickers(&mut self, files: Vec<StickerFile>) -> BoothResult<UploadReport> {
        self.ensure_unlocked()?;
        let report = self.stickers.upload(files).await;
        for failure in &report.failed {
            tracing::warn!(file = %failure.file, reason = %failure.reason, "Sticker upload rejected");
        }
        if !report.succeeded.is_empty() {
            self.refresh_stickers().await?;
        }
        Ok(report)
    }

    /// Delete a custom sticker by id. `Ok(false)` when the store refused.
    pub async fn delete_sticker(&mut self, id: &str) -> BoothResult<bool> {
        self.ensure_unlocked()?;
        let sticker = self
            .custom_stickers
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| BoothError::not_found(format!("sticker {id}")))?;
        let deleted = self.stickers.delete(&sticker).await;
        if deleted {
            self.custom_stickers.retain(|s| s.id != id);
        }
        Ok(deleted)
    }

    /// Send an image through the relay and record the attempt.
    pub async fn send(
        &mut self,
        recipient: &str,
        image: ImageReference,
        caption: Option<String>,
    ) -> BoothResult<SendOutcome> {
        self.ensure_unlocked()?;
        let request = SendRequest {
            recipient: RecipientNumber::parse(recipient)?,
            image,
            caption: caption.unwrap_or_else(|| self.default_caption.clone()),
        };
        let result = self.relay.send(&request).await;
        let entry = SentMessage::record(&request, &result);
        tracing::info!(
            recipient = %entry.recipient,
            image = %entry.image_ref,
            caption = %entry.caption,
            status = ?entry.status,
            error = entry.error.as_deref().unwrap_or(""),
            "Messaging attempt"
        );
        self.sent.push_front(entry);
        self.sent.truncate(SENT_HISTORY_LIMIT);
        result
    }

    fn current_page_number(&self) -> u32 {
        self.page.as_ref().map(|p| p.page).unwrap_or(1)
    }

    fn ensure_unlocked(&self) -> BoothResult<()> {
        if self.unlocked {
            Ok(())
        } else {
            Err(BoothError::Locked)
        }
    }
}
