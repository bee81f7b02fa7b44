//! Photobooth Collaborators
//!
//! The remote services the kiosk talks to, behind traits:
//! - [`GalleryStore`]: saved composites (full-size PNG plus JPEG preview)
//! - [`StickerStore`]: user-uploaded sticker assets
//! - [`MessagingRelay`]: delivers an image to a phone number
//!
//! [`RestBackend`] and [`HttpMessagingRelay`] reach the real services; the
//! `Memory*` implementations serve tests and offline use.

pub mod gallery;
pub mod messaging;
pub mod rest;
pub mod stickers;

pub use gallery::{GalleryStore, MemoryGallery};
pub use messaging::{
    HttpMessagingRelay, ImageReference, MemoryMessagingRelay, MessageStatus, MessagingRelay,
    SendOutcome, SendRequest, SentMessage,
};
pub use rest::RestBackend;
pub use stickers::{
    validate_sticker_file, MemoryStickerStore, StickerFile, StickerStore, UploadFailure,
    UploadReport,
};
