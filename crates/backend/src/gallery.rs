//! Saved composites.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use booth_common::{BoothError, BoothResult};
use booth_model::image_ref::ImageRef;
use booth_model::recipient::RecipientNumber;
use booth_model::records::{GalleryPage, SavedPhoto};
use chrono::Utc;
use uuid::Uuid;

/// Remote gallery of saved composites.
#[async_trait::async_trait]
pub trait GalleryStore: Send + Sync {
    /// Store the full-size PNG and its JPEG preview. Fails on any upload or
    /// write error.
    async fn save(
        &self,
        png: Vec<u8>,
        preview: Vec<u8>,
        recipient: Option<RecipientNumber>,
    ) -> BoothResult<SavedPhoto>;

    /// One 1-based page, newest first.
    async fn list(&self, page: u32, page_size: u32) -> BoothResult<GalleryPage>;

    async fn delete(&self, id: &str) -> BoothResult<()>;

    async fn delete_all(&self) -> BoothResult<()>;
}

/// In-memory gallery. Images are kept as data URLs.
#[derive(Default)]
pub struct MemoryGallery {
    photos: Mutex<Vec<SavedPhoto>>,
    fail_writes: AtomicBool,
}

impl MemoryGallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following save and delete fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.photos.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self, operation: &str) -> BoothResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BoothError::gallery(format!("{operation} rejected by store")));
        }
        Ok(())
    }

    fn lock(&self) -> BoothResult<std::sync::MutexGuard<'_, Vec<SavedPhoto>>> {
        self.photos
            .lock()
            .map_err(|_| BoothError::gallery("gallery poisoned"))
    }
}

#[async_trait::async_trait]
impl GalleryStore for MemoryGallery {
    async fn save(
        &self,
        png: Vec<u8>,
        preview: Vec<u8>,
        recipient: Option<RecipientNumber>,
    ) -> BoothResult<SavedPhoto> {
        self.check_writable("save")?;
        let photo = SavedPhoto {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            preview_url: ImageRef::from_bytes("image/jpeg", &preview).as_str().to_string(),
            full_size_url: Some(ImageRef::from_bytes("image/png", &png).as_str().to_string()),
            recipient,
        };
        self.lock()?.insert(0, photo.clone());
        Ok(photo)
    }

    async fn list(&self, page: u32, page_size: u32) -> BoothResult<GalleryPage> {
        let photos = self.lock()?;
        let size = page_size.max(1) as usize;
        let start = (page.max(1) as usize - 1) * size;
        let items = photos.iter().skip(start).take(size).cloned().collect();
        Ok(GalleryPage::new(items, photos.len() as u64, page, page_size))
    }

    async fn delete(&self, id: &str) -> BoothResult<()> {
        self.check_writable("delete")?;
        let mut photos = self.lock()?;
        let before = photos.len();
        photos.retain(|p| p.id != id);
        if photos.len() == before {
            return Err(BoothError::not_found(format!("photo {id}")));
        }
        Ok(())
    }

    async fn delete_all(&self) -> BoothResult<()> {
        self.check_writable("delete_all")?;
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_gallery_pages_newest_first() {
        let gallery = MemoryGallery::new();
        let mut ids = Vec::new();
        for i in 0..5u8 {
            ids.push(gallery.save(vec![i], vec![i], None).await.unwrap().id);
        }

        let first = gallery.list(1, 2).await.unwrap();
        assert_eq!(first.total, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items[0].id, ids[4]);
        assert!(first.has_next());

        let last = gallery.list(3, 2).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].id, ids[0]);
        assert!(!last.has_next());
    }

    #[tokio::test]
    async fn test_failing_gallery_keeps_contents() {
        let gallery = MemoryGallery::new();
        let saved = gallery.save(vec![1], vec![2], None).await.unwrap();
        gallery.set_failing(true);
        assert!(gallery.save(vec![1], vec![2], None).await.is_err());
        assert!(gallery.delete(&saved.id).await.is_err());
        assert_eq!(gallery.len(), 1);

        gallery.set_failing(false);
        gallery.delete(&saved.id).await.unwrap();
        assert!(gallery.is_empty());
        assert!(matches!(
            gallery.delete(&saved.id).await,
            Err(BoothError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_keeps_recipient() {
        let gallery = MemoryGallery::new();
        let number = RecipientNumber::parse("555-123-4567").unwrap();
        let saved = gallery.save(vec![1], vec![2], Some(number.clone())).await.unwrap();
        assert_eq!(saved.recipient, Some(number));
        assert!(saved.preview_url.starts_with("data:image/jpeg;base64,"));
    }
}
