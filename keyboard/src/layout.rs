//! Keyboard layout and the `NavigableSet` built from it.
//!
//! Rows, top to bottom:
//!
//! | index | row | kind |
//! |---|---|---|
//! | 0 | text bar | leaf, speaks the buffer |
//! | 1 | controls | Space, Del Letter, Del Word, Clear, Settings, Exit |
//! | 2..=7 | letters and digits | six keys each |
//! | 8 | predictions | six slots, long-press jump target |

use switchscan_core::{Item, NavigableSet, PREDICTION_SLOTS};

pub const TEXT_ROW: usize = 0;
pub const CONTROL_ROW: usize = 1;
pub const FIRST_KEY_ROW: usize = 2;
pub const PREDICTION_ROW: usize = FIRST_KEY_ROW + KEY_ROWS.len();

/// Character keys, A-Z then 0-9.
pub const KEY_ROWS: [[char; 6]; 6] = [
    ['A', 'B', 'C', 'D', 'E', 'F'],
    ['G', 'H', 'I', 'J', 'K', 'L'],
    ['M', 'N', 'O', 'P', 'Q', 'R'],
    ['S', 'T', 'U', 'V', 'W', 'X'],
    ['Y', 'Z', '0', '1', '2', '3'],
    ['4', '5', '6', '7', '8', '9'],
];

/// Spoken when the prediction row is highlighted but holds nothing.
pub const NO_PREDICTIONS: &str = "no predictions available";

/// Spoken for the text bar while the buffer is empty.
pub const EMPTY_TEXT: &str = "text empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Space,
    DelLetter,
    DelWord,
    Clear,
    Settings,
    Exit,
}

impl ControlKey {
    pub const ALL: [ControlKey; 6] = [
        ControlKey::Space,
        ControlKey::DelLetter,
        ControlKey::DelWord,
        ControlKey::Clear,
        ControlKey::Settings,
        ControlKey::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ControlKey::Space => "Space",
            ControlKey::DelLetter => "Del Letter",
            ControlKey::DelWord => "Del Word",
            ControlKey::Clear => "Clear",
            ControlKey::Settings => "Settings",
            ControlKey::Exit => "Exit",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Character on key `child` of set row `row`, if that is a character key.
pub fn key_at(row: usize, child: usize) -> Option<char> {
    let keys = KEY_ROWS.get(row.checked_sub(FIRST_KEY_ROW)?)?;
    keys.get(child).copied()
}

/// Spoken title of a character row: its keys, lowercased, space separated.
fn row_title(keys: &[char; 6]) -> String {
    keys.iter()
        .map(|k| k.to_ascii_lowercase().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label of the prediction row: the predictions read as a list.
pub fn predictions_label(predictions: &[String]) -> String {
    let words: Vec<&str> = predictions
        .iter()
        .map(String::as_str)
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        NO_PREDICTIONS.to_string()
    } else {
        words.join(", ")
    }
}

/// Build the scannable keyboard for the current buffer and predictions.
pub fn keyboard_set(buffer: &str, predictions: &[String; PREDICTION_SLOTS]) -> NavigableSet {
    let text = buffer.trim();
    let text_bar = Item::new("text", if text.is_empty() { EMPTY_TEXT } else { text });

    let controls = Item::row(
        "controls",
        "controls",
        ControlKey::ALL
            .iter()
            .map(|k| Item::new(k.label(), k.label()))
            .collect(),
    );

    let mut items = vec![text_bar, controls];
    for (i, keys) in KEY_ROWS.iter().enumerate() {
        items.push(Item::row(
            format!("keys{i}"),
            row_title(keys),
            keys.iter()
                .map(|k| Item::new(k.to_string(), k.to_string()))
                .collect(),
        ));
    }

    let slots = predictions
        .iter()
        .enumerate()
        .map(|(i, w)| Item::new(format!("prediction{i}"), w.as_str()).with_visible(!w.is_empty()))
        .collect();
    items.push(Item::row("predictions", predictions_label(predictions), slots));

    NavigableSet::new(items).with_jump_target(PREDICTION_ROW)
}
