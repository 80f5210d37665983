//! switchscan-core
//!
//! Switch-scanning navigation and word prediction shared by the keyboard and
//! browser front ends.
//!
//! Public API:
//! - `TimingController` - turns raw Advance/Select switch signals into scan actions
//! - `ScanEngine` - scan position and highlight over a `NavigableSet`
//! - `AutoScanDriver` - optional periodic `ScanForward`
//! - `ScanSession` - wires the three together over a stack of screens
//! - `PredictionEngine` - six next-word predictions from base and user corpora
//! - `Store` - JSON key/value persistence (`MemoryStore`, `RedbStore`)
//! - `Config` - timing, auto-scan and prediction settings
use serde::{Deserialize, Serialize};

pub mod timer;
pub use timer::Timer;

pub mod timing;
pub use timing::{PressState, ScanAction, Signal, TimingConfig, TimingController};

pub mod navigable;
pub use navigable::{BackwardEntry, Item, ItemRef, NavigableSet};

pub mod feedback;
pub use feedback::{announce, clean_for_speech, Feedback, Highlight, RecordingFeedback};

pub mod screen;
pub use screen::{Activation, ScreenKind, ScreenProvider};

pub mod scan;
pub use scan::{ScanEngine, ScanMode, ScanState, SetUpdate};

pub mod autoscan;
pub use autoscan::{AutoScanDriver, SuspendReason};

pub mod session;
pub use session::ScanSession;

pub mod candidate;
pub use candidate::{Candidate, CandidateSource};

pub mod corpus;
pub use corpus::{Corpus, CorpusEntry, CorpusError, MergedCorpus};

pub mod predict;
pub use predict::{CorpusState, PredictionEngine, PREDICTION_SLOTS};

pub mod store;
pub use store::{MemoryStore, RedbStore, Store, StoreError};

/// Words offered when there is nothing to predict from.
pub const DEFAULT_WORDS: [&str; 6] = ["YES", "NO", "HELP", "THE", "I", "YOU"];

/// Selectable auto-scan periods, slowest last.
pub const SCAN_INTERVAL_STEPS_MS: [u64; 4] = [1000, 2000, 3000, 4000];

/// Visual style of the scan highlight. Rendering is up to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightStyle {
    #[default]
    Outline,
    Fill,
    Underline,
}

impl HighlightStyle {
    pub fn next(self) -> Self {
        match self {
            HighlightStyle::Outline => HighlightStyle::Fill,
            HighlightStyle::Fill => HighlightStyle::Underline,
            HighlightStyle::Underline => HighlightStyle::Outline,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HighlightStyle::Outline => "Outline",
            HighlightStyle::Fill => "Fill",
            HighlightStyle::Underline => "Underline",
        }
    }
}

/// A settings change requested by a screen. Applied by the session without
/// resetting scan position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    /// Set the scan (and backward repeat) interval.
    ScanInterval(u64),
    /// Step to the next entry of `SCAN_INTERVAL_STEPS_MS`, wrapping.
    CycleScanSpeed,
    AutoScan(bool),
    ToggleAutoScan,
    HighlightStyle(HighlightStyle),
    CycleHighlightStyle,
    LongPressThreshold(u64),
}

/// Configuration for scanning and prediction.
///
/// Every field has a default, so a TOML file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    // Switch timing
    /// Hold time before a press counts as long (Advance → backward, Select → jump).
    pub long_press_threshold_ms: u64,
    /// Period of repeated backward steps while Advance stays held.
    pub repeat_interval_ms: u64,
    /// Shortest Select hold that counts; shorter releases are treated as bounce.
    pub min_select_duration_ms: u64,

    // Auto-scan
    pub scan_interval_ms: u64,
    pub auto_scan: bool,
    pub highlight_style: HighlightStyle,

    // Predictions
    /// Offered for an empty buffer and used to pad short prediction lists.
    pub default_vocabulary: Vec<String>,
    /// Weight of one user use against one base occurrence when merging.
    pub user_count_weight: u64,
    /// Score boost for entries the user contributed to.
    pub user_score_multiplier: f64,
    /// User words older than this many days...
    pub prune_age_days: i64,
    /// ...and used fewer times than this are dropped on save.
    pub prune_min_count: u64,
    /// How many top merged words are considered after a completed word.
    pub most_frequent_pool: usize,
    /// Maximum number of buffers whose predictions are cached.
    pub max_cache_size: usize,
    /// Persist the user corpus after every recorded word.
    pub autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            long_press_threshold_ms: 3000,
            repeat_interval_ms: 2000,
            min_select_duration_ms: 100,
            scan_interval_ms: 2000,
            auto_scan: false,
            highlight_style: HighlightStyle::Outline,
            default_vocabulary: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            user_count_weight: corpus::USER_COUNT_WEIGHT,
            user_score_multiplier: corpus::USER_SCORE_MULTIPLIER,
            prune_age_days: 90,
            prune_min_count: 3,
            most_frequent_pool: 20,
            max_cache_size: 256,
            autosave: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // ========== Scan Speed ==========

    /// Set the scan interval, snapped to the nearest selectable step. The
    /// backward repeat follows the scan interval.
    pub fn set_scan_interval(&mut self, ms: u64) {
        let snapped = SCAN_INTERVAL_STEPS_MS
            .iter()
            .copied()
            .min_by_key(|step| step.abs_diff(ms))
            .unwrap_or(2000);
        self.scan_interval_ms = snapped;
        self.repeat_interval_ms = snapped;
    }

    /// Step to the next scan interval, wrapping from slowest to fastest.
    pub fn cycle_scan_speed(&mut self) {
        let next = SCAN_INTERVAL_STEPS_MS
            .iter()
            .position(|s| *s == self.scan_interval_ms)
            .map(|i| SCAN_INTERVAL_STEPS_MS[(i + 1) % SCAN_INTERVAL_STEPS_MS.len()])
            .unwrap_or(SCAN_INTERVAL_STEPS_MS[0]);
        self.set_scan_interval(next);
    }

    /// Scan interval as whole seconds, for labels.
    pub fn scan_interval_secs(&self) -> u64 {
        self.scan_interval_ms / 1000
    }

    // ========== Auto-scan ==========

    pub fn toggle_auto_scan(&mut self) {
        self.auto_scan = !self.auto_scan;
    }

    pub fn cycle_highlight_style(&mut self) {
        self.highlight_style = self.highlight_style.next();
    }

    // ========== Long Press ==========

    /// Set the long-press threshold, clamped to 500 ms..=10 s.
    pub fn set_long_press_threshold(&mut self, ms: u64) {
        self.long_press_threshold_ms = ms.clamp(500, 10_000);
    }

    /// Apply a change requested by a screen.
    pub fn apply(&mut self, change: ConfigChange) {
        match change {
            ConfigChange::ScanInterval(ms) => self.set_scan_interval(ms),
            ConfigChange::CycleScanSpeed => self.cycle_scan_speed(),
            ConfigChange::AutoScan(on) => self.auto_scan = on,
            ConfigChange::ToggleAutoScan => self.toggle_auto_scan(),
            ConfigChange::HighlightStyle(style) => self.highlight_style = style,
            ConfigChange::CycleHighlightStyle => self.cycle_highlight_style(),
            ConfigChange::LongPressThreshold(ms) => self.set_long_press_threshold(ms),
        }
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Normalize a word for storage and matching: NFC, trailing sentence
    /// punctuation (`.,?!`) removed, uppercased. Returns `None` if nothing
    /// is left.
    pub fn clean_word(s: &str) -> Option<String> {
        let word: String = normalize(s)
            .chars()
            .filter(|c| !matches!(c, '.' | ',' | '?' | '!'))
            .collect::<String>()
            .to_uppercase();
        let word = word.trim().to_string();
        (!word.is_empty()).then_some(word)
    }
}
