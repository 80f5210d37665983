//! Scan navigation over a screen's `NavigableSet`.
//!
//! One `ScanEngine` exists per screen context. It owns the scan position and
//! interprets `ScanForward`, `ScanBackward`, `Select` and `LongPressSelect`
//! against the set it was given, driving highlight and speech through a
//! `Feedback` collaborator.
//!
//! Slot -1 is the header/back slot when the set has one, and "nothing
//! highlighted" otherwise. Row mode walks the top-level items; item mode walks
//! the children of the selected composite row.

use crate::feedback::{announce, Feedback, Highlight};
use crate::navigable::{BackwardEntry, ItemRef, NavigableSet};
use crate::screen::{Activation, ScreenProvider};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Coarse: rows or flat items.
    #[default]
    Row,
    /// Fine: children of the current row.
    Item,
}

/// Position of the scan highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanState {
    pub index: isize,
    pub mode: ScanMode,
    pub sub_index: usize,
    /// False until the first step after a reset.
    pub started: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            index: -1,
            mode: ScanMode::Row,
            sub_index: 0,
            started: false,
        }
    }
}

/// How a replacement set relates to the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetUpdate {
    /// New screen or new content: back to idle.
    Reset,
    /// Same screen, refreshed content: keep the position where possible.
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn delta(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Scan state machine for one screen.
#[derive(Debug, Clone, Default)]
pub struct ScanEngine {
    set: NavigableSet,
    state: ScanState,
    jump_origin: Option<isize>,
}

impl ScanEngine {
    pub fn new(set: NavigableSet) -> Self {
        Self {
            set,
            state: ScanState::default(),
            jump_origin: None,
        }
    }

    pub fn set(&self) -> &NavigableSet {
        &self.set
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn index(&self) -> isize {
        self.state.index
    }

    pub fn mode(&self) -> ScanMode {
        self.state.mode
    }

    pub fn is_idle(&self) -> bool {
        !self.state.started
    }

    /// Whether long-press Select means anything on this set.
    pub fn has_long_press(&self) -> bool {
        self.set.jump_target().is_some()
    }

    /// What Select would act on right now.
    pub fn current_target(&self) -> Option<ItemRef> {
        if self.state.index < 0 {
            return None;
        }
        let index = self.state.index as usize;
        match self.state.mode {
            ScanMode::Row => Some(ItemRef::item(index)),
            ScanMode::Item => Some(ItemRef::child(index, self.state.sub_index)),
        }
    }

    /// Back to idle: nothing highlighted, row mode, nothing spoken.
    pub fn reset(&mut self, feedback: &mut dyn Feedback) {
        self.state = ScanState::default();
        self.jump_origin = None;
        feedback.highlight(Highlight::None);
    }

    /// Install a new set atomically.
    pub fn replace_set(
        &mut self,
        set: NavigableSet,
        update: SetUpdate,
        feedback: &mut dyn Feedback,
    ) {
        self.set = set;
        match update {
            SetUpdate::Reset => self.reset(feedback),
            SetUpdate::Retain => self.reconcile(feedback),
        }
    }

    pub fn scan_forward(&mut self, feedback: &mut dyn Feedback) {
        self.step(Direction::Forward, feedback);
    }

    pub fn scan_backward(&mut self, feedback: &mut dyn Feedback) {
        self.step(Direction::Backward, feedback);
    }

    /// Act on the highlighted slot.
    ///
    /// - Header / idle: the screen's back action.
    /// - Leaf item in row mode: the item's activation.
    /// - Composite row in row mode: enter item mode on its first child.
    /// - Item mode: activate the child, then return to row mode and
    ///   re-announce the row.
    ///
    /// `Activation::Refresh` is handled here (the set is rebuilt in place);
    /// every activation is still returned so the caller can act on
    /// transitions.
    pub fn select(
        &mut self,
        screen: &mut dyn ScreenProvider,
        feedback: &mut dyn Feedback,
    ) -> Activation {
        if self.set.is_empty() {
            return Activation::Stay;
        }

        if self.state.index < 0 {
            debug!(screen = screen.name(), "select on header");
            let activation = screen.on_back();
            self.absorb_refresh(&activation, screen, feedback);
            return activation;
        }

        let index = self.state.index as usize;
        match self.state.mode {
            ScanMode::Row => {
                let Some(item) = self.set.item(index) else {
                    return Activation::Stay;
                };
                if item.is_leaf() {
                    debug!(screen = screen.name(), index, "activate item");
                    let activation = screen.activate(ItemRef::item(index));
                    self.absorb_refresh(&activation, screen, feedback);
                    return activation;
                }
                match item.first_visible_child() {
                    Some(child) => {
                        let label = item.children[child].label.clone();
                        self.state.mode = ScanMode::Item;
                        self.state.sub_index = child;
                        feedback.highlight(Highlight::Child { index, child });
                        announce(feedback, &label);
                    }
                    None => {
                        let label = item.label.clone();
                        announce(feedback, &label);
                    }
                }
                Activation::Stay
            }
            ScanMode::Item => {
                let child = self.state.sub_index;
                debug!(screen = screen.name(), index, child, "activate child");
                let activation = screen.activate(ItemRef::child(index, child));
                self.state.mode = ScanMode::Row;
                self.state.sub_index = 0;
                if activation.leaves_screen() {
                    return activation;
                }
                if matches!(activation, Activation::Refresh) {
                    self.set = screen.navigable_set();
                    self.reconcile(feedback);
                }
                self.highlight_current(feedback);
                self.announce_current(feedback);
                activation
            }
        }
    }

    /// Toggle between the jump-target row and the row highlighted before the
    /// jump.
    pub fn long_press_select(&mut self, feedback: &mut dyn Feedback) {
        let Some(target) = self.set.jump_target() else {
            return;
        };
        let target = target as isize;

        if self.state.started && self.state.index == target {
            let origin = self.jump_origin.take();
            self.state.mode = ScanMode::Row;
            self.state.sub_index = 0;
            if let Some(origin) = origin.filter(|o| self.set.is_slot_visible(*o)) {
                self.state.index = origin;
            }
            debug!(index = self.state.index, "jump back from target row");
        } else {
            self.jump_origin = self.state.started.then_some(self.state.index);
            self.state.index = target;
            self.state.mode = ScanMode::Row;
            self.state.sub_index = 0;
            self.state.started = true;
            debug!(index = target, origin = ?self.jump_origin, "jump to target row");
        }
        self.highlight_current(feedback);
        self.announce_current(feedback);
    }

    /// Re-draw the highlight for the current position.
    pub fn highlight_current(&self, feedback: &mut dyn Feedback) {
        feedback.highlight(self.current_highlight());
    }

    /// Speak the label of the current position.
    pub fn announce_current(&self, feedback: &mut dyn Feedback) {
        if !self.state.started {
            return;
        }
        if let Some(label) = self.current_label() {
            let label = label.to_string();
            announce(feedback, &label);
        }
    }

    fn current_highlight(&self) -> Highlight {
        if !self.state.started {
            return Highlight::None;
        }
        if self.state.index < 0 {
            return if self.set.has_header() {
                Highlight::Header
            } else {
                Highlight::None
            };
        }
        let index = self.state.index as usize;
        match self.state.mode {
            ScanMode::Row => Highlight::Item { index },
            ScanMode::Item => Highlight::Child {
                index,
                child: self.state.sub_index,
            },
        }
    }

    fn current_label(&self) -> Option<&str> {
        match self.state.mode {
            ScanMode::Row => self.set.slot_label(self.state.index),
            ScanMode::Item => {
                let row = self.set.item(usize::try_from(self.state.index).ok()?)?;
                row.children
                    .get(self.state.sub_index)
                    .map(|c| c.label.as_str())
            }
        }
    }

    fn absorb_refresh(
        &mut self,
        activation: &Activation,
        screen: &dyn ScreenProvider,
        feedback: &mut dyn Feedback,
    ) {
        if matches!(activation, Activation::Refresh) {
            self.set = screen.navigable_set();
            self.reconcile(feedback);
        }
    }

    fn step(&mut self, direction: Direction, feedback: &mut dyn Feedback) {
        if self.set.is_empty() {
            return;
        }
        match self.state.mode {
            ScanMode::Row => self.step_row(direction, feedback),
            ScanMode::Item => self.step_child(direction, feedback),
        }
    }

    /// Number of logical slots in row mode, header included.
    fn slot_count(&self) -> isize {
        self.set.len() as isize + isize::from(self.set.has_header())
    }

    fn next_slot(&self, index: isize, direction: Direction) -> isize {
        let n = self.set.len() as isize;
        if self.set.has_header() {
            // Slots -1..=n-1, shifted to 0..=n for the modulo.
            (index + 1 + direction.delta()).rem_euclid(n + 1) - 1
        } else {
            (index + direction.delta()).rem_euclid(n.max(1))
        }
    }

    fn entry_slot(&self, direction: Direction) -> isize {
        let n = self.set.len() as isize;
        if n == 0 {
            return -1;
        }
        match direction {
            Direction::Forward => 0,
            Direction::Backward => match self.set.backward_entry() {
                BackwardEntry::Header if self.set.has_header() => -1,
                _ => n - 1,
            },
        }
    }

    /// Walk from `candidate` in `direction` until a visible slot turns up.
    /// After a full cycle the header is the fallback; without a header there
    /// is nothing to land on.
    fn resolve_visible(&self, mut candidate: isize, direction: Direction) -> Option<isize> {
        let mut steps = 0;
        while !self.set.is_slot_visible(candidate) {
            if steps >= self.slot_count() {
                return self.set.has_header().then_some(-1);
            }
            candidate = self.next_slot(candidate, direction);
            steps += 1;
        }
        Some(candidate)
    }

    fn step_row(&mut self, direction: Direction, feedback: &mut dyn Feedback) {
        let candidate = if self.state.started {
            self.next_slot(self.state.index, direction)
        } else {
            self.entry_slot(direction)
        };

        let Some(index) = self.resolve_visible(candidate, direction) else {
            debug!("no visible slot, staying idle");
            self.reset(feedback);
            return;
        };

        self.state.index = index;
        self.state.started = true;
        self.state.sub_index = 0;
        debug!(index, ?direction, "row step");
        self.highlight_current(feedback);
        self.announce_current(feedback);
    }

    fn step_child(&mut self, direction: Direction, feedback: &mut dyn Feedback) {
        let Some(row) = usize::try_from(self.state.index)
            .ok()
            .and_then(|i| self.set.item(i))
        else {
            self.state.mode = ScanMode::Row;
            return;
        };
        let count = row.children.len() as isize;
        if count == 0 {
            self.state.mode = ScanMode::Row;
            return;
        }

        let mut child = self.state.sub_index as isize;
        for _ in 0..count {
            child = (child + direction.delta()).rem_euclid(count);
            if row.children[child as usize].visible {
                self.state.sub_index = child as usize;
                debug!(row = self.state.index, child, ?direction, "item step");
                self.highlight_current(feedback);
                self.announce_current(feedback);
                return;
            }
        }
    }

    /// Fit the current position to a refreshed set of the same screen.
    fn reconcile(&mut self, feedback: &mut dyn Feedback) {
        if self.set.is_empty() {
            self.reset(feedback);
            return;
        }
        let n = self.set.len() as isize;
        if self.state.index >= n {
            self.state.index = n - 1;
            self.state.mode = ScanMode::Row;
            self.state.sub_index = 0;
        }
        if self.state.mode == ScanMode::Item {
            let child_ok = usize::try_from(self.state.index)
                .ok()
                .and_then(|i| self.set.item(i))
                .and_then(|row| row.children.get(self.state.sub_index))
                .is_some_and(|c| c.visible);
            if !child_ok {
                self.state.mode = ScanMode::Row;
                self.state.sub_index = 0;
            }
        }
        if self.jump_origin.is_some_and(|o| o >= n) {
            self.jump_origin = None;
        }
        if self.state.started && !self.set.is_slot_visible(self.state.index) {
            match self.resolve_visible(self.state.index, Direction::Forward) {
                Some(index) => self.state.index = index,
                None => {
                    self.reset(feedback);
                    return;
                }
            }
        }
        self.highlight_current(feedback);
    }
}
