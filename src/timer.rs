//! Single-slot idle timer
//!
//! The session owns exactly one pending deadline. Rearming replaces it and
//! firing consumes it, so at most one idle callback can ever be outstanding.
//! Time comes from event timestamps rather than a wall clock, which keeps
//! replayed sessions deterministic.

/// A cancelable deferred deadline, in milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct IdleTimer {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl IdleTimer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and schedule a new one `delay_ms` after `now`
    pub fn rearm(&mut self, now: f64) {
        self.deadline = Some(now + self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Fire the pending deadline if `now` has reached it
    ///
    /// Returns `true` at most once per arming.
    pub fn fire_if_due(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
