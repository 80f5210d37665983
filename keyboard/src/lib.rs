//! switchscan-keyboard crate root
//!
//! A predictive on-screen keyboard driven by two switches. The keyboard is a
//! composite widget: rows are scanned first, then the keys of the selected
//! row. A row of six predictions sits at the bottom and is the long-press
//! jump target.
//!
//! Public API exported here:
//! - `KeyboardScreen` from `keyboard`
//! - `SettingsScreen` from `settings`
//! - `TextBuffer` from `buffer`
//! - `SpeechFeedback` and `spoken_form` from `speech`

pub mod buffer;
pub mod keyboard;
pub mod layout;
pub mod settings;
pub mod speech;

pub use buffer::TextBuffer;
pub use keyboard::KeyboardScreen;
pub use layout::{ControlKey, CONTROL_ROW, PREDICTION_ROW, TEXT_ROW};
pub use settings::SettingsScreen;
pub use speech::{spoken_form, SpeechFeedback};

// Core types callers need to drive a keyboard session.
pub use switchscan_core::{
    Config, Feedback, Highlight, PredictionEngine, RecordingFeedback, ScanSession, Signal,
};
