//! Cooperative timer handles.
//!
//! Nothing in the core runs on its own thread. A `Timer` is a plain deadline
//! value owned by whoever armed it (a press, the auto-scan driver). The owner
//! polls it with the host's monotonic clock; dropping the value cancels it.

/// A one-shot or repeating deadline measured in host milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    due_ms: u64,
    period_ms: Option<u64>,
}

impl Timer {
    /// Arm a timer that fires once, `delay_ms` after `now_ms`.
    pub fn one_shot(now_ms: u64, delay_ms: u64) -> Self {
        Self {
            due_ms: now_ms.saturating_add(delay_ms),
            period_ms: None,
        }
    }

    /// Arm a timer that first fires `period_ms` after `now_ms` and then every
    /// `period_ms` after that.
    pub fn repeating(now_ms: u64, period_ms: u64) -> Self {
        let period = period_ms.max(1);
        Self {
            due_ms: now_ms.saturating_add(period),
            period_ms: Some(period),
        }
    }

    /// When the timer will next fire.
    pub fn due_ms(&self) -> u64 {
        self.due_ms
    }

    /// Repeat period, `None` for one-shot timers.
    pub fn period_ms(&self) -> Option<u64> {
        self.period_ms
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.due_ms
    }

    /// Check the timer and consume one firing if it is due.
    ///
    /// A repeating timer reschedules itself one period after the deadline it
    /// just served. A host that polls late gets one firing per poll rather
    /// than a burst: if the next deadline is already behind `now_ms` the
    /// cadence restarts from `now_ms`.
    ///
    /// Returns `true` when the timer fired. A fired one-shot timer stays due;
    /// the owner is expected to drop or replace it.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        if let Some(period) = self.period_ms {
            let next = self.due_ms.saturating_add(period);
            self.due_ms = if next <= now_ms {
                now_ms.saturating_add(period)
            } else {
                next
            };
        }
        true
    }
}
