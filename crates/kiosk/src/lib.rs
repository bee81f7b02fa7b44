//! Photobooth Kiosk
//!
//! The capture/editor shell around the renderer: photo capture, sticker
//! editing, the save flow with its single-export gate, the confirmation
//! countdown, and the PIN-gated admin console.

pub mod admin;
pub mod capture;
pub mod export;
pub mod flow;
pub mod session;
pub mod timer;

pub use admin::AdminConsole;
pub use capture::{CaptureSequence, FrameSource, ReplayFrameSource};
pub use export::{ExportGate, ExportTicket, Exporter, PendingExport};
pub use flow::{FlowSettings, KioskFlow, KioskStep};
pub use session::{EditorSession, ExportPhase};
pub use timer::{AutoAdvanceTimer, KioskEvent};
