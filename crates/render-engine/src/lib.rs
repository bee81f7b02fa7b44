//! Photobooth Render Engine
//!
//! Flattens a composition into the print-ready PNG:
//!
//! ```text
//! frame color ─────────┐
//!                      ├── Fill canvas (layout size)
//! photos ── load ──────┤         │
//!                      │         ├── Photos per layout plan (drop shadow)
//! stickers ── load ────┘         │
//!                                ├── Stickers in list order (drop shadow)
//!                                ▼
//!                           Encode (PNG)
//!                                │
//!                                ├──► gallery full-size
//!                                ▼
//!                      Preview (JPEG, 800px)
//! ```

pub mod assets;
pub mod compositor;
pub mod decode;
pub mod loader;
pub mod preview;
pub mod shadow;

pub use compositor::{generate_composite, CompositeImage};
pub use loader::{HttpSourceLoader, MemorySourceLoader, SourceLoader};
pub use preview::{default_preview, encode_preview};
