//! Shared auto-scan interval timer.
//!
//! When enabled, the driver asks for a `ScanForward` every period. It is
//! independent of manual Advance presses, and it pauses itself while a
//! backward repeat is running, while a text-entry overlay owns input, or
//! while a modal with its own scan context is open.

use crate::timer::Timer;
use tracing::debug;

/// Why auto-scan is paused. Several can hold at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuspendReason {
    LongPressRepeat,
    TextEntry,
    Modal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Suspensions {
    long_press_repeat: bool,
    text_entry: bool,
    modal: bool,
}

impl Suspensions {
    fn flag(&mut self, reason: SuspendReason) -> &mut bool {
        match reason {
            SuspendReason::LongPressRepeat => &mut self.long_press_repeat,
            SuspendReason::TextEntry => &mut self.text_entry,
            SuspendReason::Modal => &mut self.modal,
        }
    }

    fn any(&self) -> bool {
        self.long_press_repeat || self.text_entry || self.modal
    }
}

#[derive(Debug, Clone)]
pub struct AutoScanDriver {
    period_ms: u64,
    running: bool,
    timer: Option<Timer>,
    suspended: Suspensions,
}

impl AutoScanDriver {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            running: false,
            timer: None,
            suspended: Suspensions::default(),
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.any()
    }

    /// Whether a tick can currently fire.
    pub fn is_active(&self) -> bool {
        self.running && self.timer.is_some()
    }

    /// Start ticking. A no-op if already running.
    pub fn start(&mut self, now_ms: u64) {
        if self.running {
            return;
        }
        self.running = true;
        self.arm(now_ms);
        debug!(period_ms = self.period_ms, "auto-scan started");
    }

    /// Stop ticking. A no-op if already stopped.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.timer = None;
        debug!("auto-scan stopped");
    }

    pub fn set_running(&mut self, running: bool, now_ms: u64) {
        if running {
            self.start(now_ms);
        } else {
            self.stop();
        }
    }

    /// Change the period. A running timer is cancelled and restarted with the
    /// new period; scan position is not the driver's concern and is untouched.
    pub fn set_period(&mut self, period_ms: u64, now_ms: u64) {
        let period_ms = period_ms.max(1);
        if period_ms == self.period_ms {
            return;
        }
        self.period_ms = period_ms;
        if self.running {
            self.arm(now_ms);
        }
        debug!(period_ms, "auto-scan period changed");
    }

    pub fn suspend(&mut self, reason: SuspendReason) {
        let flag = self.suspended.flag(reason);
        if *flag {
            return;
        }
        *flag = true;
        self.timer = None;
        debug!(?reason, "auto-scan suspended");
    }

    /// Lift one suspension. Ticking restarts a full period from `now_ms` once
    /// nothing else holds it.
    pub fn resume(&mut self, reason: SuspendReason, now_ms: u64) {
        let flag = self.suspended.flag(reason);
        if !*flag {
            return;
        }
        *flag = false;
        if self.running {
            self.arm(now_ms);
        }
        debug!(?reason, "auto-scan resumed");
    }

    pub fn set_suspended(&mut self, reason: SuspendReason, suspended: bool, now_ms: u64) {
        if suspended {
            self.suspend(reason);
        } else {
            self.resume(reason, now_ms);
        }
    }

    /// Returns true when a `ScanForward` is due.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.timer.as_mut() {
            Some(timer) => timer.fire(now_ms),
            None => false,
        }
    }

    fn arm(&mut self, now_ms: u64) {
        self.timer = if self.suspended.any() {
            None
        } else {
            Some(Timer::repeating(now_ms, self.period_ms))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_every_period() {
        let mut d = AutoScanDriver::new(1000);
        d.start(0);
        assert!(!d.poll(999));
        assert!(d.poll(1000));
        assert!(d.poll(2000));
    }

    #[test]
    fn start_is_idempotent() {
        let mut d = AutoScanDriver::new(1000);
        d.start(0);
        d.start(900);
        assert!(d.poll(1000));
    }

    #[test]
    fn stopped_driver_never_ticks() {
        let mut d = AutoScanDriver::new(1000);
        d.start(0);
        d.stop();
        d.stop();
        assert!(!d.poll(5000));
    }

    #[test]
    fn period_change_restarts_running_timer() {
        let mut d = AutoScanDriver::new(1000);
        d.start(0);
        d.set_period(3000, 500);
        assert!(!d.poll(1000));
        assert!(!d.poll(3000));
        assert!(d.poll(3500));
    }

    #[test]
    fn suspension_stacks() {
        let mut d = AutoScanDriver::new(1000);
        d.start(0);
        d.suspend(SuspendReason::Modal);
        d.suspend(SuspendReason::LongPressRepeat);
        assert!(!d.poll(5000));
        d.resume(SuspendReason::LongPressRepeat, 5000);
        assert!(d.is_suspended());
        assert!(!d.poll(7000));
        d.resume(SuspendReason::Modal, 7000);
        assert!(!d.is_suspended());
        assert!(d.poll(8000));
    }

    #[test]
    fn period_change_while_stopped_applies_on_start() {
        let mut d = AutoScanDriver::new(1000);
        d.set_period(2000, 0);
        d.start(100);
        assert!(!d.poll(1100));
        assert!(d.poll(2100));
    }
}
