//! Capture timing: debounce plus a periodic fallback.

use std::time::Duration;
use web_time::Instant;

use crate::constants::{DEFAULT_DEBOUNCE_MS, DEFAULT_FALLBACK_INTERVAL_MS};

/// Which timer asked for a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTrigger {
    /// The quiet period after a burst elapsed
    Debounce,
    /// The fixed cadence came around
    Fallback,
}

/// Decides when history should attempt a capture.
///
/// Two mechanisms:
/// 1. **Debounce**: bursty events push a deadline forward; once the events
///    stop for `debounce_delay` one capture covers the whole gesture.
/// 2. **Fallback**: every `fallback_interval` a capture is attempted
///    regardless, bounding how far history can drift from the live scene.
///
/// The scheduler owns no clock. Callers pass `now` so timing is driven by
/// the editor's tick.
#[derive(Debug)]
pub struct CaptureScheduler {
    debounce_delay: Duration,
    fallback_interval: Duration,
    /// Pending debounce deadline
    debounce_deadline: Option<Instant>,
    /// Next fallback attempt; `None` while stopped
    next_fallback: Option<Instant>,
}

impl Default for CaptureScheduler {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            Duration::from_millis(DEFAULT_FALLBACK_INTERVAL_MS),
        )
    }
}

impl CaptureScheduler {
    pub fn new(debounce_delay: Duration, fallback_interval: Duration) -> Self {
        Self {
            debounce_delay,
            fallback_interval,
            debounce_deadline: None,
            next_fallback: None,
        }
    }

    /// Start the fallback cadence.
    pub fn start(&mut self, now: Instant) {
        self.next_fallback = Some(now + self.fallback_interval);
    }

    /// Stop both timers.
    pub fn stop(&mut self) {
        self.debounce_deadline = None;
        self.next_fallback = None;
        log::trace!("Capture timers stopped");
    }

    /// Whether the fallback cadence is running.
    pub fn is_running(&self) -> bool {
        self.next_fallback.is_some()
    }

    /// Re-arm the debounce deadline after a bursty event.
    pub fn schedule_debounce(&mut self, now: Instant) {
        self.debounce_deadline = Some(now + self.debounce_delay);
    }

    /// Drop a pending debounce, typically because a capture just happened.
    pub fn clear_debounce(&mut self) {
        self.debounce_deadline = None;
    }

    /// Whether a debounced capture is pending.
    pub fn debounce_pending(&self) -> bool {
        self.debounce_deadline.is_some()
    }

    /// Fire whichever timer is due at `now`.
    ///
    /// A due debounce wins over the fallback. Firing consumes the debounce;
    /// the fallback is rescheduled one interval after `now`.
    pub fn poll(&mut self, now: Instant) -> Option<CaptureTrigger> {
        if let Some(deadline) = self.debounce_deadline
            && now >= deadline
        {
            self.debounce_deadline = None;
            log::trace!("Debounce elapsed");
            return Some(CaptureTrigger::Debounce);
        }

        if let Some(next) = self.next_fallback
            && now >= next
        {
            self.next_fallback = Some(now + self.fallback_interval);
            log::trace!("Fallback capture due");
            return Some(CaptureTrigger::Fallback);
        }

        None
    }
}
