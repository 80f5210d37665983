//! Press/release classification for the two logical switches.
//!
//! The `TimingController` turns raw down/up events on `Signal::Advance` and
//! `Signal::Select` into `ScanAction`s:
//!
//! - Advance short press: `ScanForward` on release.
//! - Advance held past the long-press threshold: `ScanBackward` immediately,
//!   then every repeat interval until release. No forward step on release.
//! - Select short press (>= minimum duration): `Select` on release.
//! - Select held past the threshold: `LongPressSelect` once, if the active
//!   context gives long-press a meaning. The release is then swallowed.
//!
//! The host drives time: every call takes `now_ms` and pending timers are
//! serviced by `poll`.

use crate::timer::Timer;
use crate::Config;
use tracing::debug;

/// One of the two logical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Advance,
    Select,
}

/// Logical action produced by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    ScanForward,
    ScanBackward,
    Select,
    LongPressSelect,
}

/// Per-switch state, bounded to one press/release cycle.
#[derive(Debug, Clone, Default)]
pub struct PressState {
    pressed: bool,
    press_start_ms: u64,
    /// For Advance: backward scanning happened during this press.
    /// For Select: the long-press action fired and the release is suppressed.
    long_press_fired: bool,
    timer: Option<Timer>,
}

impl PressState {
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn press_start_ms(&self) -> u64 {
        self.press_start_ms
    }

    pub fn long_press_fired(&self) -> bool {
        self.long_press_fired
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    fn begin(&mut self, now_ms: u64, threshold_ms: u64) {
        // Any leftover handle from a previous cycle is dropped here.
        self.pressed = true;
        self.press_start_ms = now_ms;
        self.long_press_fired = false;
        self.timer = Some(Timer::one_shot(now_ms, threshold_ms));
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Timing parameters, normally derived from `Config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub long_press_threshold_ms: u64,
    pub repeat_interval_ms: u64,
    pub min_select_duration_ms: u64,
}

impl TimingConfig {
    pub const MIN_REPEAT_MS: u64 = 1000;
    pub const MAX_REPEAT_MS: u64 = 4000;

    pub fn from_config(config: &Config) -> Self {
        Self {
            long_press_threshold_ms: config.long_press_threshold_ms,
            repeat_interval_ms: config.repeat_interval_ms,
            min_select_duration_ms: config.min_select_duration_ms,
        }
        .clamped()
    }

    fn clamped(mut self) -> Self {
        self.repeat_interval_ms = self
            .repeat_interval_ms
            .clamp(Self::MIN_REPEAT_MS, Self::MAX_REPEAT_MS);
        self.long_press_threshold_ms = self.long_press_threshold_ms.max(1);
        self
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            long_press_threshold_ms: 3000,
            repeat_interval_ms: 2000,
            min_select_duration_ms: 100,
        }
    }
}

/// Classifies switch events into scan actions.
#[derive(Debug, Clone)]
pub struct TimingController {
    config: TimingConfig,
    advance: PressState,
    select: PressState,
    select_long_press: bool,
}

impl TimingController {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            config: config.clamped(),
            advance: PressState::default(),
            select: PressState::default(),
            select_long_press: false,
        }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Replace the timing parameters. Presses in flight keep their armed
    /// deadlines; the new values apply from the next timer that is armed.
    pub fn set_config(&mut self, config: TimingConfig) {
        self.config = config.clamped();
    }

    /// Whether the current context gives a long Select press a meaning.
    pub fn set_select_long_press(&mut self, enabled: bool) {
        self.select_long_press = enabled;
    }

    pub fn select_long_press(&self) -> bool {
        self.select_long_press
    }

    pub fn press_state(&self, signal: Signal) -> &PressState {
        match signal {
            Signal::Advance => &self.advance,
            Signal::Select => &self.select,
        }
    }

    /// True while Advance is held and backward scanning is repeating.
    pub fn is_repeating(&self) -> bool {
        self.advance.pressed && self.advance.long_press_fired
    }

    /// Handle a switch-down event. Duplicate downs (key auto-repeat) are
    /// ignored.
    pub fn press(&mut self, signal: Signal, now_ms: u64) {
        let threshold = self.config.long_press_threshold_ms;
        let state = self.state_mut(signal);
        if state.pressed {
            return;
        }
        state.begin(now_ms, threshold);
        debug!(?signal, now_ms, "switch down");
    }

    /// Handle a switch-up event and return the short-press action, if any.
    pub fn release(&mut self, signal: Signal, now_ms: u64) -> Option<ScanAction> {
        let min_select = self.config.min_select_duration_ms;
        let state = self.state_mut(signal);
        if !state.pressed {
            return None;
        }
        let held_ms = now_ms.saturating_sub(state.press_start_ms);
        let long_fired = state.long_press_fired;
        state.clear();
        debug!(?signal, held_ms, long_fired, "switch up");

        match signal {
            Signal::Advance if !long_fired => Some(ScanAction::ScanForward),
            Signal::Select if !long_fired && held_ms >= min_select => Some(ScanAction::Select),
            _ => None,
        }
    }

    /// Service pending long-press and repeat timers.
    pub fn poll(&mut self, now_ms: u64) -> Vec<ScanAction> {
        let mut actions = Vec::new();
        let repeat = self.config.repeat_interval_ms;

        if self.advance.pressed {
            if let Some(timer) = self.advance.timer.as_mut() {
                if timer.fire(now_ms) {
                    actions.push(ScanAction::ScanBackward);
                    if !self.advance.long_press_fired {
                        // Threshold reached: switch the one-shot into the
                        // repeat timer. It keeps the threshold's cadence
                        // unless this poll is already a full interval late.
                        self.advance.long_press_fired = true;
                        let due = timer.due_ms();
                        let anchor = if due.saturating_add(repeat) <= now_ms {
                            now_ms
                        } else {
                            due
                        };
                        self.advance.timer = Some(Timer::repeating(anchor, repeat));
                        debug!(now_ms, "advance long press, scanning backward");
                    }
                }
            }
        }

        if self.select.pressed && !self.select.long_press_fired {
            let due = self
                .select
                .timer
                .as_mut()
                .is_some_and(|timer| timer.fire(now_ms));
            if due {
                self.select.timer = None;
                if self.select_long_press {
                    self.select.long_press_fired = true;
                    actions.push(ScanAction::LongPressSelect);
                    debug!(now_ms, "select long press");
                }
            }
        }

        actions
    }

    /// Window blur equivalent: cancel everything, forget every press. Nothing
    /// fires until a fresh down event.
    pub fn focus_lost(&mut self) {
        debug!("focus lost, cancelling switch timers");
        self.cancel_all();
    }

    /// Cancel all timers and press flags for both switches.
    pub fn cancel_all(&mut self) {
        self.advance.clear();
        self.select.clear();
    }

    fn state_mut(&mut self, signal: Signal) -> &mut PressState {
        match signal {
            Signal::Advance => &mut self.advance,
            Signal::Select => &mut self.select,
        }
    }
}

impl Default for TimingController {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}
