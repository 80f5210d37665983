//! Highlight and speech collaborator.
//!
//! The scan engine never renders or synthesizes anything itself. It tells a
//! `Feedback` implementation which slot is highlighted and what to say.

/// What is currently highlighted on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    /// Nothing highlighted (idle).
    None,
    /// The synthetic header/back slot.
    Header,
    /// A whole item or composite row.
    Item { index: usize },
    /// One item inside a composite row.
    Child { index: usize, child: usize },
}

/// Rendering/speech surface the engine drives.
pub trait Feedback {
    /// Stop any in-flight utterance.
    fn cancel_speech(&mut self);

    /// Start speaking `text`. Implementations lowercase short all-caps tokens
    /// so they are not read letter by letter.
    fn speak(&mut self, text: &str);

    /// Move the visual highlight.
    fn highlight(&mut self, target: Highlight);
}

/// Strip symbols that speech engines read aloud badly (arrows, bars, dashes)
/// and collapse whitespace.
pub fn clean_for_speech(text: &str) -> String {
    let kept: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '\'' | ',' | '.' | '?' | '!' | '&') {
                c
            } else {
                ' '
            }
        })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cancel whatever is being said and speak the cleaned `text`.
pub fn announce(feedback: &mut dyn Feedback, text: &str) {
    feedback.cancel_speech();
    let cleaned = clean_for_speech(text);
    if !cleaned.is_empty() {
        feedback.speak(&cleaned);
    }
}

/// Feedback sink that records every call; handy for hosts without a screen
/// and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingFeedback {
    pub spoken: Vec<String>,
    pub highlights: Vec<Highlight>,
    pub cancels: usize,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_spoken(&self) -> Option<&str> {
        self.spoken.last().map(String::as_str)
    }

    pub fn last_highlight(&self) -> Option<&Highlight> {
        self.highlights.last()
    }

    pub fn clear(&mut self) {
        self.spoken.clear();
        self.highlights.clear();
        self.cancels = 0;
    }
}

impl Feedback for RecordingFeedback {
    fn cancel_speech(&mut self) {
        self.cancels += 1;
    }

    fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
    }

    fn highlight(&mut self, target: Highlight) {
        self.highlights.push(target);
    }
}
