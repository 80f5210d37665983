//! Contract between screens and the scan engine.
//!
//! Each screen supplies its `NavigableSet` and reacts to activations. What an
//! activation does is the screen's business; the engine and session only act
//! on the returned `Activation`.

use crate::navigable::{ItemRef, NavigableSet};
use crate::ConfigChange;
use std::fmt;

/// How a screen interacts with auto-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenKind {
    #[default]
    Normal,
    /// A modal with its own scan context. Auto-scan pauses while it is open.
    Modal,
    /// A text-entry overlay consuming input. Auto-scan pauses while it is open.
    TextEntry,
}

/// What the host should do after a screen handled Select or Back.
pub enum Activation {
    /// Nothing changed.
    Stay,
    /// The screen's visible content changed; rebuild its set and keep the
    /// current scan position.
    Refresh,
    /// Speak this text (e.g. the composed message).
    Speak(String),
    /// Open a new screen on top of this one.
    Push(Box<dyn ScreenProvider>),
    /// Close this screen and return to the one below.
    Pop,
    /// Swap this screen for another.
    Replace(Box<dyn ScreenProvider>),
    /// Apply a settings change without losing scan position.
    Configure(ConfigChange),
    /// Leave the app.
    Exit,
}

impl Activation {
    /// Another screen takes over, or the app ends.
    pub fn leaves_screen(&self) -> bool {
        matches!(
            self,
            Activation::Push(_) | Activation::Pop | Activation::Replace(_) | Activation::Exit
        )
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Stay => write!(f, "Stay"),
            Activation::Refresh => write!(f, "Refresh"),
            Activation::Speak(text) => f.debug_tuple("Speak").field(text).finish(),
            Activation::Push(screen) => f.debug_tuple("Push").field(&screen.name()).finish(),
            Activation::Pop => write!(f, "Pop"),
            Activation::Replace(screen) => f.debug_tuple("Replace").field(&screen.name()).finish(),
            Activation::Configure(change) => f.debug_tuple("Configure").field(change).finish(),
            Activation::Exit => write!(f, "Exit"),
        }
    }
}

/// A screen (or modal) that exposes scannable content.
pub trait ScreenProvider {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Build the current scannable content. Called on entry and whenever the
    /// screen reports `Activation::Refresh`.
    fn navigable_set(&self) -> NavigableSet;

    /// Select landed on an item (or a child of a composite row).
    fn activate(&mut self, target: ItemRef) -> Activation;

    /// Select landed on the header/back slot.
    fn on_back(&mut self) -> Activation;

    fn kind(&self) -> ScreenKind {
        ScreenKind::Normal
    }

    /// Called after a `Configure` activation was applied, so a settings screen
    /// can relabel itself from the live configuration.
    fn config_applied(&mut self, _config: &crate::Config) {}
}
