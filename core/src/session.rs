//! Scanning session over a stack of screens.
//!
//! `ScanSession` owns the single `TimingController` and `AutoScanDriver` of an
//! app plus one `ScanEngine` per open screen. Hosts feed it raw switch
//! events and clock ticks; it turns them into engine calls and handles the
//! `Activation` each Select produces (screen pushes and pops, speech,
//! settings changes).
//!
//! Every screen transition cancels outstanding timers before the new screen
//! context is reset, so nothing scheduled for one screen fires on another.

use crate::autoscan::{AutoScanDriver, SuspendReason};
use crate::feedback::{announce, Feedback, Highlight};
use crate::scan::{ScanEngine, SetUpdate};
use crate::screen::{Activation, ScreenKind, ScreenProvider};
use crate::timing::{ScanAction, Signal, TimingConfig, TimingController};
use crate::{Config, ConfigChange};
use tracing::{debug, info};

struct ScreenContext {
    screen: Box<dyn ScreenProvider>,
    engine: ScanEngine,
}

impl ScreenContext {
    fn enter(screen: Box<dyn ScreenProvider>, feedback: &mut dyn Feedback) -> Self {
        let mut engine = ScanEngine::new(screen.navigable_set());
        engine.reset(feedback);
        debug!(screen = screen.name(), "screen entered");
        Self { screen, engine }
    }
}

pub struct ScanSession<F: Feedback> {
    config: Config,
    timing: TimingController,
    autoscan: AutoScanDriver,
    stack: Vec<ScreenContext>,
    feedback: F,
    exited: bool,
}

impl<F: Feedback> ScanSession<F> {
    /// Open `root` as the first screen. Auto-scan starts if configured.
    pub fn new(config: Config, mut feedback: F, root: Box<dyn ScreenProvider>, now_ms: u64) -> Self {
        let root = ScreenContext::enter(root, &mut feedback);
        let mut session = Self {
            timing: TimingController::new(TimingConfig::from_config(&config)),
            autoscan: AutoScanDriver::new(config.scan_interval_ms),
            config,
            stack: vec![root],
            feedback,
            exited: false,
        };
        session.apply_config(now_ms);
        session.sync_context(now_ms);
        session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    pub fn timing(&self) -> &TimingController {
        &self.timing
    }

    pub fn autoscan(&self) -> &AutoScanDriver {
        &self.autoscan
    }

    /// Number of open screens.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Scan engine of the top screen.
    pub fn engine(&self) -> Option<&ScanEngine> {
        self.stack.last().map(|ctx| &ctx.engine)
    }

    pub fn screen_name(&self) -> Option<&str> {
        self.stack.last().map(|ctx| ctx.screen.name())
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    // ========== Input ==========

    pub fn press(&mut self, signal: Signal, now_ms: u64) {
        if self.exited {
            return;
        }
        // Auto-scan stopped by a focus loss comes back with the next press.
        if self.config.auto_scan && !self.autoscan.is_running() {
            self.autoscan.start(now_ms);
        }
        self.timing.press(signal, now_ms);
    }

    pub fn release(&mut self, signal: Signal, now_ms: u64) {
        if self.exited {
            return;
        }
        let action = self.timing.release(signal, now_ms);
        self.sync_repeat(now_ms);
        if let Some(action) = action {
            self.perform(action, now_ms);
        }
    }

    /// Advance time: fire due long-press, repeat and auto-scan timers.
    pub fn tick(&mut self, now_ms: u64) {
        if self.exited {
            return;
        }
        for action in self.timing.poll(now_ms) {
            self.perform(action, now_ms);
        }
        self.sync_repeat(now_ms);
        if self.autoscan.poll(now_ms) {
            self.perform(ScanAction::ScanForward, now_ms);
        }
    }

    /// The window lost focus: every timer stops and nothing fires until the
    /// next press.
    pub fn focus_lost(&mut self, now_ms: u64) {
        self.timing.focus_lost();
        self.autoscan.stop();
        self.sync_repeat(now_ms);
        debug!("focus lost, timers cancelled");
    }

    /// Run one scan action against the top screen.
    pub fn perform(&mut self, action: ScanAction, now_ms: u64) {
        let Some(ctx) = self.stack.last_mut() else {
            return;
        };
        match action {
            ScanAction::ScanForward => ctx.engine.scan_forward(&mut self.feedback),
            ScanAction::ScanBackward => ctx.engine.scan_backward(&mut self.feedback),
            ScanAction::LongPressSelect => ctx.engine.long_press_select(&mut self.feedback),
            ScanAction::Select => {
                let activation = ctx.engine.select(ctx.screen.as_mut(), &mut self.feedback);
                self.apply(activation, now_ms);
            }
        }
        self.sync_context(now_ms);
    }

    // ========== Screens ==========

    pub fn push_screen(&mut self, screen: Box<dyn ScreenProvider>, now_ms: u64) {
        self.apply(Activation::Push(screen), now_ms);
        self.sync_context(now_ms);
    }

    /// Rebuild the top screen's set after its content changed from outside
    /// (e.g. predictions became available). Scan position is kept.
    pub fn refresh(&mut self, now_ms: u64) {
        if let Some(ctx) = self.stack.last_mut() {
            let set = ctx.screen.navigable_set();
            ctx.engine.replace_set(set, SetUpdate::Retain, &mut self.feedback);
        }
        self.sync_context(now_ms);
    }

    /// Replace the whole configuration. Scan position is kept.
    pub fn set_config(&mut self, config: Config, now_ms: u64) {
        self.config = config;
        self.config_changed(now_ms);
    }

    fn apply(&mut self, activation: Activation, now_ms: u64) {
        match activation {
            // Refresh was already absorbed by the engine.
            Activation::Stay | Activation::Refresh => {}
            Activation::Speak(text) => {
                announce(&mut self.feedback, &text);
                // Speaking may have changed what the screen shows.
                if let Some(ctx) = self.stack.last_mut() {
                    let set = ctx.screen.navigable_set();
                    ctx.engine.replace_set(set, SetUpdate::Retain, &mut self.feedback);
                }
            }
            Activation::Push(screen) => {
                self.cancel_timers(now_ms);
                let ctx = ScreenContext::enter(screen, &mut self.feedback);
                self.stack.push(ctx);
            }
            Activation::Pop => {
                if self.stack.len() <= 1 {
                    self.exit();
                    return;
                }
                self.cancel_timers(now_ms);
                if let Some(closed) = self.stack.pop() {
                    debug!(screen = closed.screen.name(), "screen closed");
                }
                if let Some(ctx) = self.stack.last_mut() {
                    let set = ctx.screen.navigable_set();
                    ctx.engine.replace_set(set, SetUpdate::Reset, &mut self.feedback);
                }
            }
            Activation::Replace(screen) => {
                self.cancel_timers(now_ms);
                self.stack.pop();
                let ctx = ScreenContext::enter(screen, &mut self.feedback);
                self.stack.push(ctx);
            }
            Activation::Configure(change) => self.configure(change, now_ms),
            Activation::Exit => self.exit(),
        }
    }

    fn configure(&mut self, change: ConfigChange, now_ms: u64) {
        self.config.apply(change);
        info!(?change, "settings changed");
        self.config_changed(now_ms);
    }

    fn config_changed(&mut self, now_ms: u64) {
        self.apply_config(now_ms);
        for ctx in self.stack.iter_mut() {
            ctx.screen.config_applied(&self.config);
        }
        if let Some(ctx) = self.stack.last_mut() {
            let set = ctx.screen.navigable_set();
            ctx.engine.replace_set(set, SetUpdate::Retain, &mut self.feedback);
            ctx.engine.announce_current(&mut self.feedback);
        }
    }

    fn apply_config(&mut self, now_ms: u64) {
        self.timing.set_config(TimingConfig::from_config(&self.config));
        self.autoscan.set_period(self.config.scan_interval_ms, now_ms);
        self.autoscan.set_running(self.config.auto_scan, now_ms);
    }

    fn cancel_timers(&mut self, now_ms: u64) {
        self.timing.cancel_all();
        self.sync_repeat(now_ms);
    }

    fn exit(&mut self) {
        self.exited = true;
        self.timing.cancel_all();
        self.autoscan.stop();
        self.feedback.cancel_speech();
        self.feedback.highlight(Highlight::None);
        info!("session exited");
    }

    fn sync_repeat(&mut self, now_ms: u64) {
        let repeating = self.timing.is_repeating();
        self.autoscan
            .set_suspended(SuspendReason::LongPressRepeat, repeating, now_ms);
    }

    /// Align timing and auto-scan with whatever screen is on top.
    fn sync_context(&mut self, now_ms: u64) {
        let Some(ctx) = self.stack.last() else {
            return;
        };
        self.timing.set_select_long_press(ctx.engine.has_long_press());
        let kind = ctx.screen.kind();
        self.autoscan
            .set_suspended(SuspendReason::Modal, kind == ScreenKind::Modal, now_ms);
        self.autoscan
            .set_suspended(SuspendReason::TextEntry, kind == ScreenKind::TextEntry, now_ms);
    }
}

impl<F: Feedback + std::fmt::Debug> std::fmt::Debug for ScanSession<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("screens", &self.stack.iter().map(|c| c.screen.name()).collect::<Vec<_>>())
            .field("timing", &self.timing)
            .field("autoscan", &self.autoscan)
            .field("exited", &self.exited)
            .finish()
    }
}
