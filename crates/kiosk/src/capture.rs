//! Photo capture for the selected layout.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use booth_common::{BoothError, BoothResult};
use booth_model::image_ref::ImageRef;
use booth_model::layout::LayoutKind;

/// Camera black box: each call yields one captured frame.
#[async_trait::async_trait]
pub trait FrameSource: Send + Sync {
    async fn capture(&self) -> BoothResult<ImageRef>;
}

/// Replays a fixed list of frames, wrapping around.
pub struct ReplayFrameSource {
    frames: Vec<ImageRef>,
    next: AtomicUsize,
}

impl ReplayFrameSource {
    pub fn new(frames: Vec<ImageRef>) -> Self {
        Self {
            frames,
            next: AtomicUsize::new(0),
        }
    }

    /// Frames read from image files, embedded as data URLs.
    pub async fn from_files(paths: &[PathBuf]) -> BoothResult<Self> {
        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = tokio::fs::read(path).await?;
            let mime = match path.extension().and_then(|e| e.to_str()) {
                Some("png") => "image/png",
                Some("webp") => "image/webp",
                _ => "image/jpeg",
            };
            frames.push(ImageRef::from_bytes(mime, &bytes));
        }
        Ok(Self::new(frames))
    }
}

#[async_trait::async_trait]
impl FrameSource for ReplayFrameSource {
    async fn capture(&self) -> BoothResult<ImageRef> {
        if self.frames.is_empty() {
            return Err(BoothError::not_found("camera frame"));
        }
        let index = self.next.fetch_add(1, Ordering::SeqCst) % self.frames.len();
        Ok(self.frames[index].clone())
    }
}

/// Frames collected for one layout, in capture order.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSequence {
    layout: LayoutKind,
    frames: Vec<ImageRef>,
}

impl CaptureSequence {
    pub fn new(layout: LayoutKind) -> Self {
        Self {
            layout,
            frames: Vec::with_capacity(layout.config().photo_count),
        }
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn frames(&self) -> &[ImageRef] {
        &self.frames
    }

    /// Number of photos the layout needs.
    pub fn target(&self) -> usize {
        self.layout.config().photo_count
    }

    pub fn remaining(&self) -> usize {
        self.target().saturating_sub(self.frames.len())
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Append a frame. Returns whether the sequence is now complete.
    pub fn push(&mut self, frame: ImageRef) -> BoothResult<bool> {
        if self.is_complete() {
            return Err(BoothError::validation(format!(
                "{} already has {} photos",
                self.layout,
                self.target()
            )));
        }
        self.frames.push(frame);
        Ok(self.is_complete())
    }

    /// Capture the next frame from `source`.
    pub async fn capture_next(&mut self, source: &dyn FrameSource) -> BoothResult<bool> {
        if self.is_complete() {
            return Ok(true);
        }
        let frame = source.capture().await?;
        tracing::debug!(
            layout = %self.layout,
            shot = self.frames.len() + 1,
            of = self.target(),
            "Captured frame"
        );
        self.push(frame)
    }

    /// Drop the most recent frame so it can be taken again.
    pub fn retake_last(&mut self) -> Option<ImageRef> {
        self.frames.pop()
    }

    pub fn into_photos(self) -> Vec<ImageRef> {
        self.frames
    }
}
