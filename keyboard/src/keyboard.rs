//! The keyboard screen.
//!
//! Owns the text buffer and the prediction engine. Typing a key, editing, or
//! choosing a prediction changes the buffer, recomputes the six predictions
//! and answers `Activation::Refresh` so the scan position survives the
//! rebuilt set.
//!
//! Learning:
//! - Space records the finished word and its n-gram.
//! - A chosen prediction is recorded against the words before it.
//! - Speaking the same text three times records the whole message with a
//!   boost and clears the buffer for the next one.

use crate::buffer::TextBuffer;
use crate::layout::{self, ControlKey, CONTROL_ROW, PREDICTION_ROW, TEXT_ROW};
use crate::settings::SettingsScreen;
use switchscan_core::{
    Activation, Config, ItemRef, NavigableSet, PredictionEngine, ScreenProvider, PREDICTION_SLOTS,
};
use tracing::{debug, info};

/// Speaking the buffer this many times records it.
pub const SPEAKS_BEFORE_RECORDING: u32 = 3;

pub struct KeyboardScreen {
    buffer: TextBuffer,
    predictor: PredictionEngine,
    predictions: [String; PREDICTION_SLOTS],
    speak_count: u32,
    config: Config,
}

impl KeyboardScreen {
    pub fn new(config: &Config, predictor: PredictionEngine) -> Self {
        let mut screen = Self {
            buffer: TextBuffer::new(),
            predictor,
            predictions: Default::default(),
            speak_count: 0,
            config: config.clone(),
        };
        screen.refresh_predictions();
        screen
    }

    pub fn buffer(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn predictions(&self) -> &[String; PREDICTION_SLOTS] {
        &self.predictions
    }

    pub fn predictor(&self) -> &PredictionEngine {
        &self.predictor
    }

    pub fn predictor_mut(&mut self) -> &mut PredictionEngine {
        &mut self.predictor
    }

    pub fn speak_count(&self) -> u32 {
        self.speak_count
    }

    /// Replace the buffer wholesale (e.g. text typed on a physical keyboard).
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set(text);
        self.buffer_changed();
    }

    /// Recompute predictions for the current buffer.
    pub fn refresh_predictions(&mut self) {
        self.predictions = self.predictor.get_predictions(self.buffer.as_str());
    }

    fn buffer_changed(&mut self) {
        self.speak_count = 0;
        self.refresh_predictions();
    }

    fn speak_buffer(&mut self) -> Activation {
        let text = self.buffer.as_str().replace('|', "").trim().to_string();
        if text.is_empty() {
            return Activation::Stay;
        }
        self.speak_count += 1;
        debug!(count = self.speak_count, "buffer spoken");
        if self.speak_count >= SPEAKS_BEFORE_RECORDING {
            info!("message spoken {SPEAKS_BEFORE_RECORDING} times, recording it");
            self.predictor.record_text(&text);
            self.buffer.clear();
            self.buffer_changed();
        }
        Activation::Speak(text)
    }

    fn control(&mut self, key: ControlKey) -> Activation {
        match key {
            ControlKey::Space => {
                if let Some(done) = self.buffer.space() {
                    self.predictor.record_word(&done.word);
                    if !done.context.is_empty() {
                        self.predictor.record_ngram(&done.context, &done.word);
                    }
                }
            }
            ControlKey::DelLetter => self.buffer.delete_letter(),
            ControlKey::DelWord => self.buffer.delete_word(),
            ControlKey::Clear => self.buffer.clear(),
            ControlKey::Settings => {
                return Activation::Push(Box::new(SettingsScreen::new(&self.config)));
            }
            ControlKey::Exit => return Activation::Exit,
        }
        self.buffer_changed();
        Activation::Refresh
    }

    fn insert_key(&mut self, key: char) -> Activation {
        self.buffer.insert_char(key);
        self.buffer_changed();
        Activation::Refresh
    }

    fn choose_prediction(&mut self, slot: usize) -> Activation {
        let Some(word) = self.predictions.get(slot).filter(|w| !w.is_empty()).cloned() else {
            return Activation::Stay;
        };
        let context = self.buffer.apply_prediction(&word);
        debug!(word = %word, "prediction chosen");
        self.predictor.record_word(&word);
        if !context.is_empty() {
            self.predictor.record_ngram(&context, &word);
        }
        self.buffer_changed();
        Activation::Refresh
    }
}

impl ScreenProvider for KeyboardScreen {
    fn name(&self) -> &str {
        "keyboard"
    }

    fn navigable_set(&self) -> NavigableSet {
        layout::keyboard_set(self.buffer.as_str(), &self.predictions)
    }

    fn activate(&mut self, target: ItemRef) -> Activation {
        match (target.index, target.child) {
            (TEXT_ROW, None) => self.speak_buffer(),
            (CONTROL_ROW, Some(child)) => match ControlKey::from_index(child) {
                Some(key) => self.control(key),
                None => Activation::Stay,
            },
            (PREDICTION_ROW, Some(slot)) => self.choose_prediction(slot),
            (row, Some(child)) => match layout::key_at(row, child) {
                Some(key) => self.insert_key(key),
                None => Activation::Stay,
            },
            _ => Activation::Stay,
        }
    }

    /// The keyboard is the root screen; there is nothing to go back to.
    fn on_back(&mut self) -> Activation {
        Activation::Stay
    }

    fn config_applied(&mut self, config: &Config) {
        self.config = config.clone();
    }
}

impl std::fmt::Debug for KeyboardScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardScreen")
            .field("buffer", &self.buffer.as_str())
            .field("predictions", &self.predictions)
            .field("speak_count", &self.speak_count)
            .finish()
    }
}
