//! Photobooth Data Model
//!
//! Defines the data contracts shared by the editor, the renderer and the
//! remote collaborators:
//! - **Stickers:** placed decorations with percent-space position, scale and rotation
//! - **Layouts:** immutable output templates (`postcard`, `strips`)
//! - **Composition:** everything the composite renderer consumes
//! - **Records:** saved gallery photos, custom sticker assets, recipients
//!
//! Sticker positions are percentages of the output canvas so the same
//! placement survives the preview canvas and the full-resolution composite.

pub mod color;
pub mod composition;
pub mod image_ref;
pub mod layout;
pub mod recipient;
pub mod records;
pub mod sticker;

pub use color::*;
pub use composition::*;
pub use image_ref::*;
pub use layout::*;
pub use recipient::*;
pub use records::*;
pub use sticker::*;
