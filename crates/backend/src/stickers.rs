//! Custom sticker assets.

use std::path::Path;
use std::sync::Mutex;

use booth_common::{BoothError, BoothResult};
use booth_model::image_ref::ImageRef;
use booth_model::records::CustomSticker;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Upload size limit per sticker file.
pub const MAX_STICKER_BYTES: usize = 2 * 1024 * 1024;

/// Accepted sticker MIME types.
pub const ALLOWED_STICKER_TYPES: [&str; 5] = [
    "image/png",
    "image/webp",
    "image/jpeg",
    "image/jpg",
    "image/svg+xml",
];

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl StickerFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, typing it by extension.
    pub async fn from_path(path: impl AsRef<Path>) -> BoothResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_for_name(&name).unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime_type, bytes))
    }

    /// Extension used for the stored object.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/svg+xml" => "svg",
            _ => self.name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("bin"),
        }
    }
}

/// MIME type for a sticker file name, by extension.
pub fn mime_for_name(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Check type then size. Runs before any network call.
pub fn validate_sticker_file(file: &StickerFile) -> BoothResult<()> {
    if !ALLOWED_STICKER_TYPES.contains(&file.mime_type.as_str()) {
        return Err(BoothError::validation(
            "Invalid file type. Allowed types: PNG, WEBP, JPG, SVG",
        ));
    }
    if file.bytes.len() > MAX_STICKER_BYTES {
        return Err(BoothError::validation("File too large. Maximum size: 2MB"));
    }
    Ok(())
}

/// One rejected file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadFailure {
    pub file: String,
    pub reason: String,
}

/// Outcome of a batch upload. Files are processed independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadReport {
    pub succeeded: Vec<CustomSticker>,
    pub failed: Vec<UploadFailure>,
}

impl UploadReport {
    pub fn reject(&mut self, file: &StickerFile, err: &BoothError) {
        self.failed.push(UploadFailure {
            file: file.name.clone(),
            reason: err.to_string(),
        });
    }
}

/// Remote store of uploaded sticker assets.
#[async_trait::async_trait]
pub trait StickerStore: Send + Sync {
    /// All custom stickers, newest first.
    async fn list_custom(&self) -> BoothResult<Vec<CustomSticker>>;

    async fn upload(&self, files: Vec<StickerFile>) -> UploadReport;

    /// Remove a sticker; `false` when the record could not be deleted.
    async fn delete(&self, sticker: &CustomSticker) -> bool;
}

/// In-memory sticker store. Assets are kept as data URLs.
#[derive(Default)]
pub struct MemoryStickerStore {
    stickers: Mutex<Vec<CustomSticker>>,
}

impl MemoryStickerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StickerStore for MemoryStickerStore {
    async fn list_custom(&self) -> BoothResult<Vec<CustomSticker>> {
        let stickers = self
            .stickers
            .lock()
            .map_err(|_| BoothError::stickers("sticker store poisoned"))?;
        let mut out = stickers.clone();
        out.reverse();
        Ok(out)
    }

    async fn upload(&self, files: Vec<StickerFile>) -> UploadReport {
        let mut report = UploadReport::default();
        for file in files {
            if let Err(e) = validate_sticker_file(&file) {
                report.reject(&file, &e);
                continue;
            }
            let sticker = CustomSticker {
                id: Uuid::new_v4().to_string(),
                name: file.name.clone(),
                url: ImageRef::from_bytes(&file.mime_type, &file.bytes)
                    .as_str()
                    .to_string(),
                mime_type: file.mime_type.clone(),
                created_at: Utc::now(),
            };
            match self.stickers.lock() {
                Ok(mut stickers) => {
                    stickers.push(sticker.clone());
                    report.succeeded.push(sticker);
                }
                Err(_) => report.reject(&file, &BoothError::stickers("sticker store poisoned")),
            }
        }
        report
    }

    async fn delete(&self, sticker: &CustomSticker) -> bool {
        let Ok(mut stickers) = self.stickers.lock() else {
            return false;
        };
        let before = stickers.len();
        stickers.retain(|s| s.id != sticker.id);
        stickers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_checks_type_then_size() {
        let ok = StickerFile::new("a.png", "image/png", vec![0; 10]);
        assert!(validate_sticker_file(&ok).is_ok());

        let gif = StickerFile::new("a.gif", "image/gif", vec![0; 10]);
        let err = validate_sticker_file(&gif).unwrap_err();
        assert!(err.to_string().contains("Invalid file type"));

        let big = StickerFile::new("big.png", "image/png", vec![0; MAX_STICKER_BYTES + 1]);
        let err = validate_sticker_file(&big).unwrap_err();
        assert!(err.to_string().contains("too large"));

        let limit = StickerFile::new("edge.webp", "image/webp", vec![0; MAX_STICKER_BYTES]);
        assert!(validate_sticker_file(&limit).is_ok());
    }

    #[test]
    fn test_mime_for_name() {
        assert_eq!(mime_for_name("Shell.PNG"), Some("image/png"));
        assert_eq!(mime_for_name("x.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_name("logo.svg"), Some("image/svg+xml"));
        assert_eq!(mime_for_name("notes.txt"), None);
        assert_eq!(mime_for_name("noext"), None);
    }

    #[tokio::test]
    async fn test_memory_store_reports_each_file() {
        let store = MemoryStickerStore::new();
        let report = store
            .upload(vec![
                StickerFile::new("one.png", "image/png", vec![1, 2, 3]),
                StickerFile::new("two.gif", "image/gif", vec![1]),
                StickerFile::new("three.svg", "image/svg+xml", b"<svg/>".to_vec()),
            ])
            .await;
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file, "two.gif");

        let listed = store.list_custom().await.unwrap();
        assert_eq!(listed[0].name, "three.svg");
        assert_eq!(listed[1].name, "one.png");

        assert!(store.delete(&listed[0]).await);
        assert!(!store.delete(&listed[0]).await);
        assert_eq!(store.list_custom().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_from_path_types_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crab.webp");
        std::fs::write(&path, [7u8; 4]).unwrap();
        let file = StickerFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "crab.webp");
        assert_eq!(file.mime_type, "image/webp");
        assert_eq!(file.extension(), "webp");
    }
}
