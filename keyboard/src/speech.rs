//! Speech post-processing.
//!
//! Speech engines spell out short all-caps tokens ("IT" becomes "I T") and
//! read key captions literally. `spoken_form` rewrites text before it is
//! spoken; `SpeechFeedback` applies it in front of any other `Feedback`.

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::{Captures, Regex};
use switchscan_core::{Feedback, Highlight};

/// Key captions that should be read as something else. Keys are lowercase.
static SPOKEN_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "del letter" => "delete letter",
    "del word" => "delete word",
    "settings" => "open settings",
    "exit" => "exit keyboard",
};

static SHORT_CAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,4}\b").unwrap());

/// Text as it should be handed to the speech engine.
pub fn spoken_form(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(spoken) = SPOKEN_LABELS.get(trimmed.to_lowercase().as_str()) {
        return (*spoken).to_string();
    }
    SHORT_CAPS
        .replace_all(trimmed, |caps: &Captures| caps[0].to_lowercase())
        .into_owned()
}

/// Wraps a `Feedback` and rewrites everything spoken through it.
#[derive(Debug, Clone, Default)]
pub struct SpeechFeedback<F> {
    inner: F,
}

impl<F: Feedback> SpeechFeedback<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Feedback> Feedback for SpeechFeedback<F> {
    fn cancel_speech(&mut self) {
        self.inner.cancel_speech();
    }

    fn speak(&mut self, text: &str) {
        let spoken = spoken_form(text);
        if !spoken.is_empty() {
            self.inner.speak(&spoken);
        }
    }

    fn highlight(&mut self, target: Highlight) {
        self.inner.highlight(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchscan_core::RecordingFeedback;

    #[test]
    fn short_caps_words_are_lowercased() {
        assert_eq!(spoken_form("IT IS"), "it is");
        assert_eq!(spoken_form("HELP, YES, HELLO"), "help, yes, HELLO");
    }

    #[test]
    fn single_letters_stay_as_letters() {
        assert_eq!(spoken_form("A"), "A");
        assert_eq!(spoken_form("I WANT"), "I want");
    }

    #[test]
    fn control_captions_are_expanded() {
        assert_eq!(spoken_form("Del Letter"), "delete letter");
        assert_eq!(spoken_form("DEL WORD"), "delete word");
        assert_eq!(spoken_form("Space"), "Space");
    }

    #[test]
    fn wrapper_rewrites_speech_only() {
        let mut fb = SpeechFeedback::new(RecordingFeedback::new());
        fb.cancel_speech();
        fb.speak("OK GO");
        fb.highlight(Highlight::Item { index: 2 });
        let inner = fb.into_inner();
        assert_eq!(inner.spoken, vec!["ok go"]);
        assert_eq!(inner.cancels, 1);
        assert_eq!(inner.last_highlight(), Some(&Highlight::Item { index: 2 }));
    }
}
