//! Kiosk step flow: Home → Capture → Editor → Confirmation → Home.

use std::time::Duration;

use booth_common::config::KioskConfig;
use booth_common::{BoothError, BoothResult};
use booth_model::color::FrameColor;
use booth_model::layout::LayoutKind;
use booth_model::recipient::RecipientNumber;
use booth_model::records::SavedPhoto;
use tokio::sync::mpsc;

use crate::capture::{CaptureSequence, FrameSource};
use crate::export::Exporter;
use crate::session::EditorSession;
use crate::timer::{AutoAdvanceTimer, KioskEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskStep {
    Home,
    Capture,
    Editor,
    Confirmation,
}

/// Flow settings taken from the kiosk configuration.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub confirmation: Duration,
    pub default_layout: LayoutKind,
    pub default_frame_color: FrameColor,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            confirmation: Duration::from_secs(15),
            default_layout: LayoutKind::default(),
            default_frame_color: FrameColor::WHITE,
        }
    }
}

impl FlowSettings {
    /// Unparseable layout or color values fall back to the defaults.
    pub fn from_config(config: &KioskConfig) -> Self {
        let defaults = Self::default();
        Self {
            confirmation: Duration::from_secs(config.confirmation_secs),
            default_layout: config.default_layout.parse().unwrap_or_else(|e| {
                tracing::warn!(value = %config.default_layout, error = %e, "Ignoring default layout");
                defaults.default_layout
            }),
            default_frame_color: config.default_frame_color.parse().unwrap_or_else(|e| {
                tracing::warn!(value = %config.default_frame_color, error = %e, "Ignoring default frame color");
                defaults.default_frame_color
            }),
        }
    }
}

/// Drives one kiosk through its steps.
pub struct KioskFlow {
    settings: FlowSettings,
    step: KioskStep,
    layout: LayoutKind,
    capture: Option<CaptureSequence>,
    session: Option<EditorSession>,
    timer: AutoAdvanceTimer,
}

impl KioskFlow {
    /// Create a flow and the receiver for its timer events.
    pub fn new(settings: FlowSettings) -> (Self, mpsc::UnboundedReceiver<KioskEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let flow = Self {
            layout: settings.default_layout,
            settings,
            step: KioskStep::Home,
            capture: None,
            session: None,
            timer: AutoAdvanceTimer::new(tx),
        };
        (flow, rx)
    }

    pub fn step(&self) -> KioskStep {
        self.step
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn capture(&self) -> Option<&CaptureSequence> {
        self.capture.as_ref()
    }

    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditorSession> {
        self.session.as_mut()
    }

    /// Countdown shown on the confirmation screen.
    pub fn seconds_left(&self) -> Option<u64> {
        self.timer.seconds_left()
    }

    /// Home: pick a layout and start capturing.
    pub fn select_layout(&mut self, layout: LayoutKind) -> BoothResult<()> {
        self.expect_step(KioskStep::Home)?;
        tracing::info!(layout = %layout, "Layout selected");
        self.layout = layout;
        self.capture = Some(CaptureSequence::new(layout));
        self.step = KioskStep::Capture;
        Ok(())
    }

    /// Take the next photo; the editor opens once the layout is filled.
    pub async fn capture_next(&mut self, source: &dyn FrameSource) -> BoothResult<KioskStep> {
        self.expect_step(KioskStep::Capture)?;
        let sequence = self
            .capture
            .as_mut()
            .ok_or_else(|| BoothError::not_found("capture sequence"))?;
        if sequence.capture_next(source).await? {
            if let Some(done) = self.capture.take() {
                self.session = Some(EditorSession::new(
                    done.layout(),
                    done.into_photos(),
                    self.settings.default_frame_color,
                ));
                self.step = KioskStep::Editor;
            }
        }
        Ok(self.step)
    }

    pub fn retake_last(&mut self) -> BoothResult<()> {
        self.expect_step(KioskStep::Capture)?;
        if let Some(sequence) = self.capture.as_mut() {
            sequence.retake_last();
        }
        Ok(())
    }

    /// Editor: render the composite and ask for a phone number.
    pub async fn begin_save(&mut self, exporter: &Exporter) -> BoothResult<()> {
        self.expect_step(KioskStep::Editor)?;
        let session = self.editing_session()?;
        if !session.is_editing() {
            return Err(BoothError::validation("a save is already awaiting a recipient"));
        }
        let pending = exporter.render(&session.snapshot()).await?;
        if let Some(session) = self.session.as_mut() {
            session.await_recipient(pending);
        }
        Ok(())
    }

    /// Save with the typed phone number. An invalid number changes nothing.
    pub async fn submit_recipient(&mut self, exporter: &Exporter) -> BoothResult<SavedPhoto> {
        let recipient = self
            .editing_session()?
            .recipient()
            .ok_or_else(|| BoothError::validation("no save is awaiting a recipient"))??;
        self.finish_save(exporter, Some(recipient)).await
    }

    /// Save without a phone number.
    pub async fn skip_recipient(&mut self, exporter: &Exporter) -> BoothResult<SavedPhoto> {
        self.finish_save(exporter, None).await
    }

    pub fn cancel_recipient(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.cancel_recipient();
        }
    }

    /// Confirmation: keep editing the same composition.
    pub fn continue_editing(&mut self) -> BoothResult<()> {
        self.expect_step(KioskStep::Confirmation)?;
        self.timer.cancel();
        if let Some(session) = self.session.as_mut() {
            session.resume_editing();
        }
        self.step = KioskStep::Editor;
        Ok(())
    }

    /// Abandon everything and return to the layout picker.
    pub fn back_to_home(&mut self) {
        self.timer.cancel();
        self.capture = None;
        self.session = None;
        self.layout = self.settings.default_layout;
        self.step = KioskStep::Home;
        tracing::info!("Returned to home");
    }

    /// Apply a timer event. Returns whether the flow changed.
    pub fn handle_event(&mut self, event: KioskEvent) -> bool {
        match event {
            KioskEvent::AutoAdvance { generation } if !self.timer.is_current(generation) => {
                tracing::debug!(generation, "Ignoring stale auto-advance");
                false
            }
            KioskEvent::AutoAdvance { .. } if self.step == KioskStep::Confirmation => {
                self.back_to_home();
                true
            }
            KioskEvent::AutoAdvance { .. } => false,
        }
    }

    async fn finish_save(
        &mut self,
        exporter: &Exporter,
        recipient: Option<RecipientNumber>,
    ) -> BoothResult<SavedPhoto> {
        self.expect_step(KioskStep::Editor)?;
        let pending = self
            .editing_session()?
            .pending()
            .cloned()
            .ok_or_else(|| BoothError::validation("no save is awaiting a recipient"))?;

        let saved = exporter.save(&pending, recipient).await?;
        if let Some(session) = self.session.as_mut() {
            session.confirm(saved.clone());
        }
        self.step = KioskStep::Confirmation;
        self.timer.arm(self.settings.confirmation);
        Ok(saved)
    }

    fn editing_session(&self) -> BoothResult<&EditorSession> {
        self.session
            .as_ref()
            .ok_or_else(|| BoothError::not_found("editor session"))
    }

    fn expect_step(&self, expected: KioskStep) -> BoothResult<()> {
        if self.step != expected {
            return Err(BoothError::validation(format!(
                "expected {expected:?} step, kiosk is at {:?}",
                self.step
            )));
        }
        Ok(())
    }
}
