//! The message being composed.

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+\s*$").unwrap());

/// Editable text with the keyboard's editing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

/// What a finished word looked like when Space was pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedWord {
    /// Words before `word`, space separated. Empty for the first word.
    pub context: String,
    pub word: String,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.push(ch);
    }

    /// Append a space. Returns the word it finished, if any.
    pub fn space(&mut self) -> Option<CompletedWord> {
        let completed = self.last_word();
        self.text.push(' ');
        completed
    }

    pub fn delete_letter(&mut self) {
        self.text.pop();
    }

    /// Remove the last word together with any trailing whitespace.
    pub fn delete_word(&mut self) {
        let trimmed = self.text.trim_end();
        self.text = TRAILING_WORD.replace(trimmed, "").into_owned();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// The word being typed, or "" right after a space.
    pub fn partial_word(&self) -> &str {
        if self.text.ends_with(char::is_whitespace) {
            return "";
        }
        self.text.split_whitespace().last().unwrap_or("")
    }

    /// Put a chosen prediction in place of the partial word (or after the
    /// last finished word), followed by a space. Returns the words that came
    /// before it.
    pub fn apply_prediction(&mut self, word: &str) -> String {
        let partial_len = self.partial_word().len();
        self.text.truncate(self.text.len() - partial_len);
        let context = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !self.text.is_empty() && !self.text.ends_with(char::is_whitespace) {
            self.text.push(' ');
        }
        self.text.push_str(word);
        self.text.push(' ');
        context
    }

    fn last_word(&self) -> Option<CompletedWord> {
        let words: Vec<&str> = self.text.split_whitespace().collect();
        let (word, context) = words.split_last()?;
        if self.text.ends_with(char::is_whitespace) {
            return None;
        }
        Some(CompletedWord {
            context: context.join(" "),
            word: word.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        let mut b = TextBuffer::new();
        b.set(text);
        b
    }

    #[test]
    fn typed_keys_are_appended_verbatim() {
        let mut b = TextBuffer::new();
        b.insert_char('I');
        b.space();
        b.insert_char('H');
        b.insert_char('I');
        assert_eq!(b.as_str(), "I HI");
    }

    #[test]
    fn space_reports_finished_word_with_context() {
        let mut b = buffer("I WANT TEA");
        let done = b.space().unwrap();
        assert_eq!(done.word, "TEA");
        assert_eq!(done.context, "I WANT");
        assert_eq!(b.as_str(), "I WANT TEA ");
        // A second space finishes nothing.
        assert_eq!(b.space(), None);
    }

    #[test]
    fn delete_word_drops_trailing_space_too() {
        let mut b = buffer("HELLO THERE  ");
        b.delete_word();
        assert_eq!(b.as_str(), "HELLO ");
        b.delete_word();
        assert_eq!(b.as_str(), "");
        b.delete_word();
        assert_eq!(b.as_str(), "");
    }

    #[test]
    fn delete_letter_and_clear() {
        let mut b = buffer("AB");
        b.delete_letter();
        assert_eq!(b.as_str(), "A");
        b.clear();
        assert!(b.is_empty());
        b.delete_letter();
        assert_eq!(b.as_str(), "");
    }

    #[test]
    fn partial_word() {
        assert_eq!(buffer("I WA").partial_word(), "WA");
        assert_eq!(buffer("I WANT ").partial_word(), "");
        assert_eq!(buffer("").partial_word(), "");
    }

    #[test]
    fn prediction_replaces_partial() {
        let mut b = buffer("I WA");
        assert_eq!(b.apply_prediction("WANT"), "I");
        assert_eq!(b.as_str(), "I WANT ");
    }

    #[test]
    fn prediction_appends_after_space() {
        let mut b = buffer("I WANT ");
        assert_eq!(b.apply_prediction("TEA"), "I WANT");
        assert_eq!(b.as_str(), "I WANT TEA ");

        let mut empty = TextBuffer::new();
        assert_eq!(empty.apply_prediction("YES"), "");
        assert_eq!(empty.as_str(), "YES ");
    }
}
