//! Next-word prediction over base + user corpora.
//!
//! `PredictionEngine` owns the user corpus (grown by `record_*`, pruned and
//! persisted on save), holds the externally supplied base corpus, and keeps
//! the derived `MergedCorpus` current. `get_predictions` fills six slots from
//! a fixed priority of sources:
//!
//! 1. user-corpus completions of the partial word
//! 2. trigram continuations, then bigram continuations
//! 3. merged-corpus completions of the partial word
//! 4. most frequent merged words (only after a finished word)
//! 5. the default vocabulary, filtered by the partial word
//!
//! After a trailing space, words already in the buffer are not offered again.
//! A completion is never the partial word itself.

use crate::candidate::{rank, Candidate, CandidateSource};
use crate::corpus::{score_with, Corpus, CorpusError, MergedCorpus};
use crate::store::{Store, StoreError, USER_CORPUS_KEY};
use crate::utils::clean_word;
use crate::Config;
use ahash::AHashSet;
use chrono::{DateTime, Duration, Utc};
use std::cell::{Cell, RefCell};
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// Number of prediction slots.
pub const PREDICTION_SLOTS: usize = 6;

/// Added to user completion scores so they sort ahead of everything else.
pub const USER_COMPLETION_OFFSET: f64 = 999_999_999.0;

/// Times each word of a spoken message is counted.
pub const SPOKEN_WORD_BOOST: usize = 5;
/// Times each n-gram of a spoken message is counted.
pub const SPOKEN_NGRAM_BOOST: usize = 3;

/// Readiness of the base corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusState {
    Unloaded,
    Loading,
    Ready,
}

#[derive(Debug, Clone)]
struct Settings {
    default_vocabulary: Vec<String>,
    user_count_weight: u64,
    user_score_multiplier: f64,
    prune_age: Duration,
    prune_min_count: u64,
    most_frequent_pool: usize,
    autosave: bool,
}

impl Settings {
    fn from_config(config: &Config) -> Self {
        Self {
            default_vocabulary: config
                .default_vocabulary
                .iter()
                .filter_map(|w| clean_word(w))
                .collect(),
            user_count_weight: config.user_count_weight,
            user_score_multiplier: config.user_score_multiplier,
            prune_age: Duration::days(config.prune_age_days.max(0)),
            prune_min_count: config.prune_min_count,
            most_frequent_pool: config.most_frequent_pool,
            autosave: config.autosave,
        }
    }
}

/// A buffer split into what predictions care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BufferContext {
    trailing_space: bool,
    partial: String,
    context: Vec<String>,
    present: AHashSet<String>,
}

impl BufferContext {
    fn parse(buffer: &str) -> Self {
        // The keyboard renders its cursor as a bar; it is not text.
        let text: String = buffer.chars().filter(|c| *c != '|').collect();
        let trailing_space = text.ends_with(char::is_whitespace);
        let mut words: Vec<String> = text.split_whitespace().filter_map(clean_word).collect();
        let present = words.iter().cloned().collect();
        let partial = if trailing_space {
            String::new()
        } else {
            words.pop().unwrap_or_default()
        };
        Self {
            trailing_space,
            partial,
            context: words,
            present,
        }
    }

    fn is_blank(&self) -> bool {
        self.partial.is_empty() && self.context.is_empty()
    }

    fn excludes(&self, word: &str) -> bool {
        self.trailing_space && self.present.contains(word)
    }

    fn completes(&self, word: &str) -> bool {
        word.starts_with(self.partial.as_str())
    }
}

/// Ordered, deduplicated slot filler.
struct Picks<'a> {
    ctx: &'a BufferContext,
    words: Vec<String>,
    seen: AHashSet<String>,
}

impl<'a> Picks<'a> {
    fn new(ctx: &'a BufferContext) -> Self {
        Self {
            ctx,
            words: Vec::with_capacity(PREDICTION_SLOTS),
            seen: AHashSet::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.words.len() >= PREDICTION_SLOTS
    }

    fn push(&mut self, word: &str) {
        if self.is_full() || word.is_empty() || self.ctx.excludes(word) {
            return;
        }
        if self.seen.insert(word.to_string()) {
            self.words.push(word.to_string());
        }
    }

    fn extend(&mut self, mut candidates: Vec<Candidate>) {
        rank(&mut candidates);
        for c in candidates {
            if self.is_full() {
                break;
            }
            self.push(&c.text);
        }
    }

    fn finish(self) -> [String; PREDICTION_SLOTS] {
        let mut out: [String; PREDICTION_SLOTS] = Default::default();
        for (slot, word) in out.iter_mut().zip(self.words) {
            *slot = word;
        }
        out
    }
}

pub struct PredictionEngine {
    base: Corpus,
    user: Corpus,
    merged: MergedCorpus,
    state: CorpusState,
    settings: Settings,
    store: Option<Box<dyn Store>>,
    cache: RefCell<lru::LruCache<String, [String; PREDICTION_SLOTS]>>,
    // Recency tiers shift with wall time; cached results are only reused
    // within the hour they were computed.
    cache_hour: Cell<i64>,
    cache_hits: Cell<usize>,
    cache_misses: Cell<usize>,
}

impl PredictionEngine {
    /// An engine with no persistence.
    pub fn new(config: &Config) -> Self {
        let capacity = NonZeroUsize::new(config.max_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            base: Corpus::default(),
            user: Corpus::default(),
            merged: MergedCorpus::empty(),
            state: CorpusState::Unloaded,
            settings: Settings::from_config(config),
            store: None,
            cache: RefCell::new(lru::LruCache::new(capacity)),
            cache_hour: Cell::new(i64::MIN),
            cache_hits: Cell::new(0),
            cache_misses: Cell::new(0),
        }
    }

    /// An engine whose user corpus is loaded from, and saved to, `store`.
    /// A missing or unreadable user corpus starts empty.
    pub fn with_store(config: &Config, store: Box<dyn Store>) -> Self {
        let mut engine = Self::new(config);
        engine.user = match store.get(USER_CORPUS_KEY) {
            Ok(Some(value)) => Corpus::from_json_value(value)
                .map(Corpus::normalized)
                .unwrap_or_else(|e| {
                    warn!("stored user corpus unreadable, starting empty: {e}");
                    Corpus::default()
                }),
            Ok(None) => Corpus::default(),
            Err(e) => {
                warn!("failed to read user corpus: {e}");
                Corpus::default()
            }
        };
        info!(stats = %engine.user.stats(), "user corpus loaded");
        engine.store = Some(store);
        engine.merge();
        engine
    }

    pub fn state(&self) -> CorpusState {
        self.state
    }

    pub fn base(&self) -> &Corpus {
        &self.base
    }

    pub fn user(&self) -> &Corpus {
        &self.user
    }

    pub fn merged(&self) -> &MergedCorpus {
        &self.merged
    }

    /// (hits, misses) of the prediction cache.
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.cache_hits.get(), self.cache_misses.get())
    }

    /// Pick up changed prediction settings. Cached results are dropped.
    pub fn set_config(&mut self, config: &Config) {
        self.settings = Settings::from_config(config);
        if let Some(capacity) = NonZeroUsize::new(config.max_cache_size) {
            self.cache.borrow_mut().resize(capacity);
        }
        self.merge();
    }

    // ========== Base corpus loading ==========

    /// Mark the base corpus as in flight. Predictions keep working from the
    /// user corpus meanwhile.
    pub fn begin_base_load(&mut self) {
        self.state = CorpusState::Loading;
        debug!("base corpus loading");
    }

    /// Install the result of a base corpus load. A failed load counts as an
    /// empty base corpus.
    pub fn finish_base_load(&mut self, result: Result<Corpus, CorpusError>) {
        self.base = match result {
            Ok(corpus) => corpus.normalized(),
            Err(e) => {
                warn!("base corpus unusable, continuing with user corpus only: {e}");
                Corpus::default()
            }
        };
        self.state = CorpusState::Ready;
        info!(stats = %self.base.stats(), "base corpus ready");
        self.merge();
    }

    pub fn set_base(&mut self, corpus: Corpus) {
        self.finish_base_load(Ok(corpus));
    }

    pub fn load_base_json(&mut self, json: &str) {
        self.finish_base_load(Corpus::from_json_str(json));
    }

    // ========== Recording ==========

    /// Count one use of `word` now.
    pub fn record_word(&mut self, word: &str) {
        self.record_word_at(word, Utc::now());
    }

    pub fn record_word_at(&mut self, word: &str, now: DateTime<Utc>) {
        let Some(word) = clean_word(word) else {
            return;
        };
        self.user.bump_word(&word, now);
        debug!(word = %word, "recorded word");
        self.user_changed(now);
    }

    /// Count `next_word` following `context` as a bigram (last context word)
    /// and a trigram (last two context words).
    pub fn record_ngram(&mut self, context: &str, next_word: &str) {
        self.record_ngram_at(context, next_word, Utc::now());
    }

    pub fn record_ngram_at(&mut self, context: &str, next_word: &str, now: DateTime<Utc>) {
        if self.bump_ngrams(context, next_word, now) {
            self.user_changed(now);
        }
    }

    /// Record a message the user had spoken aloud. Each word counts
    /// `SPOKEN_WORD_BOOST` times and each n-gram `SPOKEN_NGRAM_BOOST` times.
    pub fn record_text(&mut self, text: &str) {
        self.record_text_at(text, Utc::now());
    }

    pub fn record_text_at(&mut self, text: &str, now: DateTime<Utc>) {
        let words: Vec<String> = text.split_whitespace().filter_map(clean_word).collect();
        if words.is_empty() {
            return;
        }
        for (i, word) in words.iter().enumerate() {
            for _ in 0..SPOKEN_WORD_BOOST {
                self.user.bump_word(word, now);
            }
            if i > 0 {
                let context = words[..i].join(" ");
                for _ in 0..SPOKEN_NGRAM_BOOST {
                    self.bump_ngrams(&context, word, now);
                }
            }
        }
        debug!(words = words.len(), "recorded text");
        self.user_changed(now);
    }

    fn bump_ngrams(&mut self, context: &str, next_word: &str, now: DateTime<Utc>) -> bool {
        let Some(next) = clean_word(next_word) else {
            return false;
        };
        let mut context: Vec<String> = context.split_whitespace().filter_map(clean_word).collect();
        // Callers sometimes append the word to the buffer before recording it.
        if context.last() == Some(&next) {
            context.pop();
        }
        let Some(last) = context.last() else {
            return false;
        };
        self.user.bump_bigram(last, &next, now);
        if context.len() >= 2 {
            let first = &context[context.len() - 2];
            self.user.bump_trigram(first, last, &next, now);
        }
        true
    }

    fn user_changed(&mut self, now: DateTime<Utc>) {
        if self.settings.autosave {
            if let Err(e) = self.save_user_data_at(now) {
                warn!("failed to save user corpus: {e}");
            }
        }
        self.merge();
    }

    // ========== Merge and persistence ==========

    /// Recompute the merged corpus from base and user. Safe to call any
    /// number of times, in any order relative to base loading.
    pub fn merge(&mut self) {
        self.merged = MergedCorpus::build(&self.base, &self.user, self.settings.user_count_weight);
        self.cache.borrow_mut().clear();
        debug!(stats = %self.merged.corpus().stats(), "corpora merged");
    }

    /// Prune stale rare user words, then persist the user corpus. Returns the
    /// number of pruned words.
    pub fn save_user_data(&mut self) -> Result<usize, StoreError> {
        self.save_user_data_at(Utc::now())
    }

    pub fn save_user_data_at(&mut self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let pruned = self.user.prune_words(
            now,
            self.settings.prune_age,
            self.settings.prune_min_count,
        );
        if pruned > 0 {
            debug!(pruned, "pruned stale user words");
            self.merge();
        }
        if let Some(store) = self.store.as_mut() {
            let value = self.user.to_json_value()?;
            store.set(USER_CORPUS_KEY, &value)?;
        }
        Ok(pruned)
    }

    /// Forget everything the user has taught the engine.
    pub fn clear_user_data(&mut self) {
        self.user = Corpus::default();
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.remove(USER_CORPUS_KEY) {
                warn!("failed to clear stored user corpus: {e}");
            }
        }
        info!("user corpus cleared");
        self.merge();
    }

    // ========== Predictions ==========

    /// Six predictions for `buffer`, padded with empty strings.
    pub fn get_predictions(&self, buffer: &str) -> [String; PREDICTION_SLOTS] {
        self.get_predictions_at(buffer, Utc::now())
    }

    pub fn get_predictions_at(&self, buffer: &str, now: DateTime<Utc>) -> [String; PREDICTION_SLOTS] {
        let hour = now.timestamp().div_euclid(3600);
        if self.cache_hour.get() != hour {
            self.cache.borrow_mut().clear();
            self.cache_hour.set(hour);
        }
        if let Some(hit) = self.cache.borrow_mut().get(buffer) {
            self.cache_hits.set(self.cache_hits.get() + 1);
            return hit.clone();
        }
        self.cache_misses.set(self.cache_misses.get() + 1);

        let result = self.compute(buffer, now);
        self.cache.borrow_mut().put(buffer.to_string(), result.clone());
        result
    }

    fn compute(&self, buffer: &str, now: DateTime<Utc>) -> [String; PREDICTION_SLOTS] {
        let ctx = BufferContext::parse(buffer);
        let mut picks = Picks::new(&ctx);

        if ctx.is_blank() {
            for word in &self.settings.default_vocabulary {
                picks.push(word);
            }
            return picks.finish();
        }

        if !ctx.partial.is_empty() {
            picks.extend(self.user_completions(&ctx));
        }
        if !picks.is_full() && !ctx.context.is_empty() {
            picks.extend(self.continuations(&ctx, 2, CandidateSource::Trigram, now));
            picks.extend(self.continuations(&ctx, 1, CandidateSource::Bigram, now));
        }
        if !picks.is_full() && !ctx.partial.is_empty() {
            picks.extend(self.merged_completions(&ctx, now));
        }
        if !picks.is_full() && ctx.trailing_space && ctx.partial.is_empty() {
            picks.extend(self.most_frequent(now));
        }
        for word in &self.settings.default_vocabulary {
            if ctx.completes(word) {
                picks.push(word);
            }
        }
        picks.finish()
    }

    fn user_completions(&self, ctx: &BufferContext) -> Vec<Candidate> {
        let partial = ctx.partial.as_str();
        self.user
            .words
            .range(partial.to_string()..)
            .take_while(|(word, _)| word.starts_with(partial))
            .filter(|(word, _)| word.as_str() != partial)
            .map(|(word, entry)| {
                Candidate::new(
                    word.as_str(),
                    USER_COMPLETION_OFFSET + entry.count as f64,
                    CandidateSource::UserCompletion,
                )
            })
            .collect()
    }

    fn continuations(
        &self,
        ctx: &BufferContext,
        context_words: usize,
        source: CandidateSource,
        now: DateTime<Utc>,
    ) -> Vec<Candidate> {
        if ctx.context.len() < context_words {
            return Vec::new();
        }
        let key = ctx.context[ctx.context.len() - context_words..].join(" ");
        let corpus = self.merged.corpus();
        let table = if context_words >= 2 {
            &corpus.trigrams
        } else {
            &corpus.bigrams
        };
        MergedCorpus::continuations(table, &key)
            .filter(|(next, _)| ctx.completes(next))
            .map(|(next, entry)| {
                Candidate::new(
                    next,
                    score_with(entry, now, self.settings.user_score_multiplier),
                    source,
                )
            })
            .collect()
    }

    fn merged_completions(&self, ctx: &BufferContext, now: DateTime<Utc>) -> Vec<Candidate> {
        self.merged
            .words_with_prefix(&ctx.partial)
            .into_iter()
            .filter(|(word, _)| *word != ctx.partial)
            .map(|(word, entry)| {
                Candidate::new(
                    word,
                    score_with(entry, now, self.settings.user_score_multiplier),
                    CandidateSource::Completion,
                )
            })
            .collect()
    }

    fn most_frequent(&self, now: DateTime<Utc>) -> Vec<Candidate> {
        let mut all: Vec<Candidate> = self
            .merged
            .corpus()
            .words
            .iter()
            .map(|(word, entry)| {
                Candidate::new(
                    word.as_str(),
                    score_with(entry, now, self.settings.user_score_multiplier),
                    CandidateSource::Frequent,
                )
            })
            .collect();
        rank(&mut all);
        all.truncate(self.settings.most_frequent_pool);
        all
    }
}

impl std::fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("state", &self.state)
            .field("base", &self.base.stats())
            .field("user", &self.user.stats())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_parsing() {
        let ctx = BufferContext::parse("good morn");
        assert_eq!(ctx.partial, "MORN");
        assert_eq!(ctx.context, vec!["GOOD"]);
        assert!(!ctx.trailing_space);

        let ctx = BufferContext::parse("GOOD MORNING |");
        assert!(ctx.trailing_space);
        assert_eq!(ctx.partial, "");
        assert_eq!(ctx.context, vec!["GOOD", "MORNING"]);
        assert!(ctx.excludes("MORNING"));

        assert!(BufferContext::parse("   ").is_blank());
    }

    #[test]
    fn partial_word_is_not_excluded() {
        let ctx = BufferContext::parse("HELLO HEL");
        assert!(!ctx.excludes("HELLO"));
    }

    #[test]
    fn cache_hits_on_repeat_query() {
        let engine = PredictionEngine::new(&Config::default());
        let now = Utc::now();
        engine.get_predictions_at("TH", now);
        engine.get_predictions_at("TH", now);
        assert_eq!(engine.cache_stats(), (1, 1));
    }

    #[test]
    fn merge_clears_cache() {
        let mut engine = PredictionEngine::new(&Config::default());
        let now = Utc::now();
        assert_eq!(engine.get_predictions_at("TH", now)[0], "THE");
        engine.record_word_at("THIS", now);
        assert_eq!(engine.get_predictions_at("TH", now)[0], "THIS");
    }
}
