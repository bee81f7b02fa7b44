//! Records owned by the remote collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recipient::RecipientNumber;

/// A composite persisted in the remote gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPhoto {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Compressed preview used by gallery listings.
    pub preview_url: String,
    /// Full-resolution PNG, when one was stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_size_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<RecipientNumber>,
}

/// One page of the gallery listing. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryPage {
    pub items: Vec<SavedPhoto>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl GalleryPage {
    /// Build a page, deriving `total_pages` (never less than 1).
    pub fn new(items: Vec<SavedPhoto>, total: u64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total,
            page: page.max(1),
            total_pages: total_pages(total, page_size),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// `ceil(total / page_size)`, at least 1.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Zero-based row range `[start, end]` (inclusive) for a 1-based page.
pub fn page_range(page: u32, page_size: u32) -> (u64, u64) {
    let size = u64::from(page_size.max(1));
    let start = u64::from(page.max(1) - 1) * size;
    (start, start + size - 1)
}

/// A user-uploaded sticker asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSticker {
    pub id: String,
    pub name: String,
    pub url: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_page_range_is_one_based() {
        assert_eq!(page_range(1, 20), (0, 19));
        assert_eq!(page_range(3, 20), (40, 59));
        assert_eq!(page_range(0, 10), (0, 9));
    }

    #[test]
    fn test_page_navigation() {
        let page = GalleryPage::new(Vec::new(), 45, 2, 20);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_previous());
    }
}
