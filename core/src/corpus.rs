//! Word, bigram and trigram frequency/recency statistics.
//!
//! Two `Corpus` values feed predictions: the shared base vocabulary and the
//! per-user vocabulary. `MergedCorpus` is derived from both and carries an
//! `fst` index over its word keys for prefix completion.
//!
//! N-gram keys are space-joined uppercase words: `"GOOD MORNING"` for a
//! bigram, `"I WANT TO"` for a trigram (context words first, next word last).

use chrono::{DateTime, Duration, Utc};
use fst::automaton::{Automaton, Str};
use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use crate::utils::clean_word;
use thiserror::Error;
use tracing::warn;

/// Multiplier applied to entries the user has produced themself, so personal
/// vocabulary outranks shared vocabulary of equal raw frequency.
pub const USER_SCORE_MULTIPLIER: f64 = 100.0;

/// Weight of one user use relative to one base occurrence when merging.
pub const USER_COUNT_WEIGHT: u64 = 3;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corpus snapshot: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("corpus io: {0}")]
    Io(#[from] std::io::Error),
}

/// Frequency and recency of one word or n-gram.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusEntry {
    #[serde(default)]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_used: Option<DateTime<Utc>>,
    /// Raw user count, present only on merged entries the user contributed to.
    #[serde(default)]
    pub user_count: Option<u64>,
}

impl CorpusEntry {
    pub fn new(count: u64, last_used: Option<DateTime<Utc>>) -> Self {
        Self {
            count,
            last_used,
            user_count: None,
        }
    }

    /// Age relative to `now`. Entries that were never stamped count as
    /// ancient; timestamps in the future count as fresh.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_used
            .map(|t| now.signed_duration_since(t).max(Duration::zero()))
    }
}

// Unparseable timestamps (hand-edited files, older formats) become `None`
// instead of failing the whole corpus.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }))
}

/// Recency boost by age tier.
pub fn recency_multiplier(age: Option<Duration>) -> f64 {
    let Some(age) = age else {
        return 0.1;
    };
    if age <= Duration::days(1) {
        1000.0
    } else if age <= Duration::days(7) {
        100.0
    } else if age <= Duration::days(30) {
        10.0
    } else if age <= Duration::days(90) {
        1.0
    } else {
        0.1
    }
}

/// `count * recency`, boosted by `user_multiplier` for user-contributed
/// entries.
pub fn score_with(entry: &CorpusEntry, now: DateTime<Utc>, user_multiplier: f64) -> f64 {
    let base = entry.count as f64 * recency_multiplier(entry.age(now));
    if entry.user_count.is_some() {
        base * user_multiplier
    } else {
        base
    }
}

pub fn score(entry: &CorpusEntry, now: DateTime<Utc>) -> f64 {
    score_with(entry, now, USER_SCORE_MULTIPLIER)
}

pub type Table = BTreeMap<String, CorpusEntry>;

/// Word, bigram and trigram tables. Serialized with the field names the
/// prediction data files use (`frequent_words`, `bigrams`, `trigrams`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(rename = "frequent_words", alias = "words", default)]
    pub words: Table,
    #[serde(default)]
    pub bigrams: Table,
    #[serde(default)]
    pub trigrams: Table,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.bigrams.is_empty() && self.trigrams.is_empty()
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            words: self.words.len(),
            bigrams: self.bigrams.len(),
            trigrams: self.trigrams.len(),
        }
    }

    pub fn bump_word(&mut self, word: &str, now: DateTime<Utc>) {
        bump(&mut self.words, word, now);
    }

    pub fn bump_bigram(&mut self, first: &str, next: &str, now: DateTime<Utc>) {
        bump(&mut self.bigrams, &format!("{first} {next}"), now);
    }

    pub fn bump_trigram(&mut self, first: &str, second: &str, next: &str, now: DateTime<Utc>) {
        bump(&mut self.trigrams, &format!("{first} {second} {next}"), now);
    }

    /// Add `delta` uses of `word` without touching its timestamp.
    pub fn add_word_count(&mut self, word: &str, delta: u64) {
        let entry = self.words.entry(word.to_string()).or_default();
        entry.count = entry.count.saturating_add(delta);
    }

    /// Rewrite every key the way recorded words are stored: each word
    /// cleaned and uppercased. Keys that collide are combined (counts summed,
    /// later `last_used` kept) and keys with a word that cleans to nothing are
    /// dropped.
    pub fn normalized(self) -> Self {
        Self {
            words: normalize_table(self.words),
            bigrams: normalize_table(self.bigrams),
            trigrams: normalize_table(self.trigrams),
        }
    }

    /// Drop words older than `max_age` whose count is below `min_count`.
    /// Words that were never stamped are kept. Returns how many were dropped.
    pub fn prune_words(&mut self, now: DateTime<Utc>, max_age: Duration, min_count: u64) -> usize {
        let before = self.words.len();
        self.words.retain(|_, entry| {
            let stale = entry.age(now).is_some_and(|age| age > max_age);
            !(stale && entry.count < min_count)
        });
        before - self.words.len()
    }

    pub fn from_json_str(s: &str) -> Result<Self, CorpusError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CorpusError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value, CorpusError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Load a bincode snapshot produced by `to_bincode`.
    pub fn from_bincode(bytes: &[u8]) -> Result<Self, CorpusError> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn to_bincode(&self) -> Result<Vec<u8>, CorpusError> {
        Ok(bincode::serialize(self)?)
    }

    /// Load a corpus file; `.bin`/`.bincode` snapshots and JSON are accepted.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("bincode") => Self::from_bincode(&bytes),
            _ => Ok(serde_json::from_slice(&bytes)?),
        }
    }
}

fn normalize_key(key: &str) -> Option<String> {
    let words: Option<Vec<String>> = key.split_whitespace().map(clean_word).collect();
    let words = words?;
    (!words.is_empty()).then(|| words.join(" "))
}

fn normalize_table(table: Table) -> Table {
    let mut out = Table::new();
    for (key, entry) in table {
        let Some(key) = normalize_key(&key) else {
            continue;
        };
        let merged = out.entry(key).or_default();
        merged.count = merged.count.saturating_add(entry.count);
        merged.last_used = merged.last_used.max(entry.last_used);
        merged.user_count = match (merged.user_count, entry.user_count) {
            (Some(a), Some(b)) => Some(a.saturating_add(b)),
            (a, b) => a.or(b),
        };
    }
    out
}

fn bump(table: &mut Table, key: &str, now: DateTime<Utc>) {
    let entry = table.entry(key.to_string()).or_default();
    entry.count = entry.count.saturating_add(1);
    entry.last_used = Some(now);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorpusStats {
    pub words: usize,
    pub bigrams: usize,
    pub trigrams: usize,
}

impl fmt::Display for CorpusStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} words, {} bigrams, {} trigrams",
            self.words, self.bigrams, self.trigrams
        )
    }
}

/// `base ⊕ user` for one table.
///
/// Every key of either side appears once: `count = base + user * weight`,
/// `user_count = user` when the user side has the key, `last_used` is the
/// later of the two. The result depends only on the two inputs, so merging
/// again without new data yields an identical table.
pub fn merge_tables(base: &Table, user: &Table, user_weight: u64) -> Table {
    let mut out: Table = base
        .iter()
        .map(|(key, entry)| (key.clone(), CorpusEntry::new(entry.count, entry.last_used)))
        .collect();
    for (key, user_entry) in user {
        let merged = out.entry(key.clone()).or_default();
        merged.count = merged
            .count
            .saturating_add(user_entry.count.saturating_mul(user_weight));
        merged.user_count = Some(user_entry.count);
        merged.last_used = merged.last_used.max(user_entry.last_used);
    }
    out
}

/// Derived view of base + user statistics. Never persisted.
#[derive(Clone)]
pub struct MergedCorpus {
    corpus: Corpus,
    index: Map<Vec<u8>>,
}

impl MergedCorpus {
    pub fn build(base: &Corpus, user: &Corpus, user_weight: u64) -> Self {
        let corpus = Corpus {
            words: merge_tables(&base.words, &user.words, user_weight),
            bigrams: merge_tables(&base.bigrams, &user.bigrams, user_weight),
            trigrams: merge_tables(&base.trigrams, &user.trigrams, user_weight),
        };
        let index = build_index(&corpus.words);
        Self { corpus, index }
    }

    pub fn empty() -> Self {
        Self::build(&Corpus::default(), &Corpus::default(), USER_COUNT_WEIGHT)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Words starting with `prefix`, in key order.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<(&str, &CorpusEntry)> {
        let mut out = Vec::new();
        let matcher = Str::new(prefix).starts_with();
        let mut stream = self.index.search(matcher).into_stream();
        while let Some((key, _)) = stream.next() {
            let Ok(word) = std::str::from_utf8(key) else {
                continue;
            };
            if let Some((word, entry)) = self.corpus.words.get_key_value(word) {
                out.push((word.as_str(), entry));
            }
        }
        out
    }

    /// Next words following `context` in `table` (bigrams or trigrams).
    pub fn continuations<'a>(
        table: &'a Table,
        context: &str,
    ) -> impl Iterator<Item = (&'a str, &'a CorpusEntry)> + 'a {
        let prefix = format!("{context} ");
        let context_words = context.split(' ').count();
        table
            .range(prefix.clone()..)
            .take_while(move |(key, _)| key.starts_with(&prefix))
            .filter_map(move |(key, entry)| {
                let parts: Vec<&str> = key.split(' ').collect();
                (parts.len() == context_words + 1).then(|| (parts[context_words], entry))
            })
    }
}

impl PartialEq for MergedCorpus {
    fn eq(&self, other: &Self) -> bool {
        self.corpus == other.corpus
            && self.index.as_fst().as_bytes() == other.index.as_fst().as_bytes()
    }
}

impl fmt::Debug for MergedCorpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedCorpus")
            .field("stats", &self.corpus.stats())
            .field("index_len", &self.index.len())
            .finish()
    }
}

fn build_index(words: &Table) -> Map<Vec<u8>> {
    let mut builder = MapBuilder::memory();
    for (ordinal, key) in words.keys().enumerate() {
        if let Err(e) = builder.insert(key, ordinal as u64) {
            warn!("word index build failed at {key:?}: {e}");
            return Map::default();
        }
    }
    builder.into_map()
}
