//! Single-shot auto-advance timer.
//!
//! Each `arm` bumps a generation counter and schedules a task holding that
//! generation. A task only fires if the counter still matches when it
//! wakes, so re-arming or cancelling invalidates every earlier firing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Events the kiosk reacts to outside of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskEvent {
    /// The confirmation countdown ran out. `generation` identifies the
    /// arming that produced it.
    AutoAdvance { generation: u64 },
}

pub struct AutoAdvanceTimer {
    generation: Arc<AtomicU64>,
    deadline: Arc<Mutex<Option<Instant>>>,
    events: mpsc::UnboundedSender<KioskEvent>,
}

impl AutoAdvanceTimer {
    pub fn new(events: mpsc::UnboundedSender<KioskEvent>) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            deadline: Arc::new(Mutex::new(None)),
            events,
        }
    }

    /// Schedule `AutoAdvance` after `delay`, replacing any pending firing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&self, delay: Duration) {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_deadline(Some(Instant::now() + delay));

        let generation = Arc::clone(&self.generation);
        let deadline = Arc::clone(&self.deadline);
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != token {
                return;
            }
            if let Ok(mut slot) = deadline.lock() {
                *slot = None;
            }
            tracing::debug!(generation = token, "Auto-advance fired");
            // The receiver is gone once the kiosk shuts down.
            let _ = events.send(KioskEvent::AutoAdvance { generation: token });
        });
    }

    /// Invalidate any pending firing.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.set_deadline(None);
    }

    /// Whether `generation` belongs to the latest arming. A firing that was
    /// queued before a re-arm or cancel is stale.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.lock().map(|d| d.is_some()).unwrap_or(false)
    }

    /// Whole seconds until firing, rounded up; `None` when not armed.
    pub fn seconds_left(&self) -> Option<u64> {
        let deadline = (*self.deadline.lock().ok()?)?;
        let left = deadline.saturating_duration_since(Instant::now());
        Some(left.as_millis().div_ceil(1000) as u64)
    }

    fn set_deadline(&self, value: Option<Instant>) {
        if let Ok(mut slot) = self.deadline.lock() {
            *slot = value;
        }
    }
}

impl Drop for AutoAdvanceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
