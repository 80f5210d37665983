//! Prediction ranking, recording, merging and pruning.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use switchscan_core::corpus::{Corpus, CorpusEntry};
use switchscan_core::store::USER_CORPUS_KEY;
use switchscan_core::{Config, CorpusError, CorpusState, MemoryStore, PredictionEngine, Store};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn engine() -> PredictionEngine {
    PredictionEngine::new(&Config::default())
}

fn words(pairs: &[(&str, u64)]) -> Corpus {
    let mut c = Corpus::new();
    for (w, n) in pairs {
        c.words
            .insert(w.to_string(), CorpusEntry::new(*n, Some(now() - Duration::days(3))));
    }
    c
}

fn visible(p: &[String; 6]) -> Vec<&str> {
    p.iter().map(String::as_str).filter(|w| !w.is_empty()).collect()
}

#[test]
fn empty_buffer_returns_default_vocabulary() {
    let e = engine();
    assert_eq!(
        e.get_predictions_at("", now()),
        ["YES", "NO", "HELP", "THE", "I", "YOU"].map(String::from)
    );
}

#[test]
fn empty_buffer_ignores_corpus_contents() {
    let mut e = engine();
    e.set_base(words(&[("HELLO", 500)]));
    e.record_word_at("WORLD", now());
    assert_eq!(e.get_predictions_at("", now())[0], "YES");
}

#[test]
fn user_completion_beats_bigger_base_word() {
    let mut e = engine();
    e.set_base(words(&[("THEY", 100)]));
    let mut user = words(&[("THE", 5)]);
    user.words.get_mut("THE").unwrap().last_used = Some(now() - Duration::days(200));
    // Seed the user corpus through the JSON path the store uses.
    let store = MemoryStore::new().with_value(USER_CORPUS_KEY, user.to_json_value().unwrap());
    let mut e2 = PredictionEngine::with_store(&Config::default(), Box::new(store));
    e2.set_base(words(&[("THEY", 100)]));

    let p = e2.get_predictions_at("TH", now());
    let the = p.iter().position(|w| w == "THE").unwrap();
    let they = p.iter().position(|w| w == "THEY").unwrap();
    assert!(the < they, "{p:?}");

    // Without the user entry the base word wins.
    assert_eq!(e.get_predictions_at("TH", now())[0], "THEY");
}

#[test]
fn merge_is_idempotent() {
    let mut e = engine();
    e.set_base(words(&[("HELLO", 10), ("HELP", 4)]));
    e.record_word_at("HELLO", now());
    e.record_ngram_at("SAY", "HELLO", now());
    e.merge();
    let first = e.merged().clone();
    e.merge();
    assert_eq!(&first, e.merged());
    assert_eq!(
        first.corpus().to_bincode().unwrap(),
        e.merged().corpus().to_bincode().unwrap()
    );
}

#[test]
fn words_recorded_before_base_load_survive() {
    let mut e = engine();
    assert_eq!(e.state(), CorpusState::Unloaded);
    e.begin_base_load();
    assert_eq!(e.state(), CorpusState::Loading);
    e.record_word_at("ZEBRA", now());
    assert_eq!(e.get_predictions_at("ZE", now())[0], "ZEBRA");

    e.finish_base_load(Ok(words(&[("ZERO", 50)])));
    assert_eq!(e.state(), CorpusState::Ready);
    let p = e.get_predictions_at("ZE", now());
    assert_eq!(visible(&p), vec!["ZEBRA", "ZERO"]);
    assert_eq!(e.merged().corpus().words["ZEBRA"].user_count, Some(1));
}

#[test]
fn corrupt_base_corpus_counts_as_empty() {
    let mut e = engine();
    e.record_word_at("PIZZA", now());
    e.load_base_json("{ this is not json");
    assert_eq!(e.state(), CorpusState::Ready);
    assert!(e.base().is_empty());
    assert_eq!(e.get_predictions_at("PI", now())[0], "PIZZA");

    let err = Corpus::from_bincode(&[1, 2, 3]);
    assert!(matches!(err, Err(CorpusError::Bincode(_))));
}

#[test]
fn already_typed_word_is_not_offered_after_space() {
    let mut e = engine();
    e.record_word_at("MORNING", now());
    e.record_word_at("GOOD", now());
    let p = e.get_predictions_at("GOOD MORNING ", now());
    assert!(!p.iter().any(|w| w == "MORNING"), "{p:?}");
    assert!(!p.iter().any(|w| w == "GOOD"), "{p:?}");
}

#[test]
fn exclusion_is_case_insensitive() {
    let mut e = engine();
    e.record_word_at("morning", now());
    let p = e.get_predictions_at("good Morning ", now());
    assert!(!p.iter().any(|w| w.eq_ignore_ascii_case("morning")));
}

#[test]
fn trigram_continuations_precede_bigram_continuations() {
    let mut e = engine();
    let mut base = Corpus::new();
    let seen = Some(now());
    base.bigrams
        .insert("WANT COFFEE".into(), CorpusEntry::new(1000, seen));
    base.trigrams.insert("I WANT TO".into(), CorpusEntry::new(1, seen));
    e.set_base(base);

    let p = e.get_predictions_at("I WANT ", now());
    assert_eq!(p[0], "TO");
    assert_eq!(p[1], "COFFEE");
}

#[test]
fn ngram_continuations_respect_partial_word() {
    let mut e = engine();
    e.record_text_at("I WANT TO GO", now());
    e.record_text_at("I WANT TEA", now());
    e.record_text_at("I WANT COFFEE", now());
    let p = e.get_predictions_at("I WANT T", now());
    let v = visible(&p);
    assert!(v.contains(&"TO") && v.contains(&"TEA"), "{v:?}");
    assert!(!v.contains(&"COFFEE"));
}

#[test]
fn most_frequent_words_fill_after_space() {
    let mut e = engine();
    e.set_base(words(&[("APPLE", 90), ("BANANA", 80), ("CHERRY", 70)]));
    let p = e.get_predictions_at("APPLE ", now());
    assert_eq!(&p[..2], &["BANANA".to_string(), "CHERRY".to_string()]);
}

#[test]
fn most_frequent_words_not_used_for_partial_word() {
    let mut e = engine();
    e.set_base(words(&[("APPLE", 90), ("BANANA", 80)]));
    let p = e.get_predictions_at("APPLE Q", now());
    assert!(visible(&p).is_empty(), "{p:?}");
}

#[test]
fn defaults_filtered_by_partial() {
    let e = engine();
    let p = e.get_predictions_at("HE", now());
    assert_eq!(visible(&p), vec!["HELP"]);
    assert_eq!(p.len(), 6);
}

#[test]
fn completions_skip_the_partial_itself() {
    let mut e = engine();
    e.set_base(words(&[("CAT", 10), ("CATS", 5)]));
    let p = e.get_predictions_at("CAT", now());
    assert_eq!(visible(&p), vec!["CATS"]);
}

#[test]
fn results_are_deduplicated() {
    let mut e = engine();
    e.set_base(words(&[("YESTERDAY", 5), ("YES", 500)]));
    e.record_word_at("YES", now());
    let p = e.get_predictions_at("Y", now());
    let yes = p.iter().filter(|w| *w == "YES").count();
    assert_eq!(yes, 1, "{p:?}");
}

#[test]
fn record_ngram_strips_duplicated_next_word() {
    let mut e = engine();
    e.record_ngram_at("I want to", "to", now());
    let user = e.user();
    assert_eq!(user.bigrams["WANT TO"].count, 1);
    assert_eq!(user.trigrams["I WANT TO"].count, 1);
    assert!(!user.bigrams.contains_key("TO TO"));
}

#[test]
fn record_word_normalizes() {
    let mut e = engine();
    e.record_word_at("hello,", now());
    e.record_word_at("Hello!", now());
    e.record_word_at("  ", now());
    assert_eq!(e.user().words["HELLO"].count, 2);
    assert_eq!(e.user().words.len(), 1);
    assert_eq!(e.user().words["HELLO"].last_used, Some(now()));
}

#[test]
fn save_prunes_old_rare_user_words() {
    let old = now() - Duration::days(120);
    let mut user = Corpus::new();
    user.words.insert("RARE".into(), CorpusEntry::new(2, Some(old)));
    user.words.insert("LOVED".into(), CorpusEntry::new(9, Some(old)));
    let store = MemoryStore::new().with_value(USER_CORPUS_KEY, user.to_json_value().unwrap());

    let mut e = PredictionEngine::with_store(&Config::default(), Box::new(store));
    assert_eq!(e.save_user_data_at(now()).unwrap(), 1);
    assert!(!e.user().words.contains_key("RARE"));
    assert!(e.user().words.contains_key("LOVED"));
    assert!(!e.merged().corpus().words.contains_key("RARE"));
}

#[test]
fn autosave_writes_user_corpus_json() {
    struct Shared(std::rc::Rc<std::cell::RefCell<MemoryStore>>);
    impl Store for Shared {
        fn get(&self, key: &str) -> Result<Option<serde_json::Value>, switchscan_core::StoreError> {
            self.0.borrow().get(key)
        }
        fn set(&mut self, key: &str, value: &serde_json::Value) -> Result<(), switchscan_core::StoreError> {
            self.0.borrow_mut().set(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), switchscan_core::StoreError> {
            self.0.borrow_mut().remove(key)
        }
    }

    let inner = std::rc::Rc::new(std::cell::RefCell::new(MemoryStore::new()));
    let mut e = PredictionEngine::with_store(&Config::default(), Box::new(Shared(inner.clone())));
    e.record_word_at("KITE", now());

    let saved = inner.borrow().get(USER_CORPUS_KEY).unwrap().unwrap();
    assert_eq!(saved["frequent_words"]["KITE"]["count"], json!(1));

    e.clear_user_data();
    assert!(inner.borrow().get(USER_CORPUS_KEY).unwrap().is_none());
    assert!(e.user().is_empty());
}

#[test]
fn failing_store_keeps_engine_usable() {
    let mut e = PredictionEngine::with_store(&Config::default(), Box::new(MemoryStore::read_only()));
    e.record_word_at("ROBOT", now());
    assert_eq!(e.get_predictions_at("RO", now())[0], "ROBOT");
    assert!(e.save_user_data_at(now()).is_err());
}

#[test]
fn unreadable_stored_user_corpus_starts_empty() {
    let store = MemoryStore::new().with_value(USER_CORPUS_KEY, json!(["not", "a", "corpus"]));
    let e = PredictionEngine::with_store(&Config::default(), Box::new(store));
    assert!(e.user().is_empty());
    assert_eq!(e.get_predictions_at("", now())[0], "YES");
}

#[test]
fn user_completions_rank_by_count_not_recency() {
    let mut e = engine();
    e.record_word_at("SUNNY", now() - Duration::days(60));
    e.record_word_at("SUNDAY", now());
    e.record_word_at("SUNNY", now() - Duration::days(60));
    // User completions rank by count alone: SUNNY (2) before SUNDAY (1).
    let p = e.get_predictions_at("SUN", now());
    assert_eq!(visible(&p), vec!["SUNNY", "SUNDAY"]);
}

#[test]
fn custom_default_vocabulary() {
    let mut config = Config::default();
    config.default_vocabulary = vec!["hi".into(), "bye".into()];
    let e = PredictionEngine::new(&config);
    assert_eq!(visible(&e.get_predictions_at("", now())), vec!["HI", "BYE"]);
}

#[test]
fn spoken_text_weighs_more_than_typed_words() {
    let mut e = engine();
    e.record_text_at("good morning", now());
    let user = e.user();
    assert_eq!(user.words["GOOD"].count, 5);
    assert_eq!(user.words["MORNING"].count, 5);
    assert_eq!(user.bigrams["GOOD MORNING"].count, 3);
}

#[test]
fn base_corpus_words_are_matched_case_insensitively() {
    let mut e = engine();
    e.load_base_json(
        r#"{"frequent_words": {"morning": {"count": 50}, "Thursday": {"count": 40}},
            "bigrams": {"good morning": {"count": 7}}}"#,
    );
    assert!(e.base().words.contains_key("MORNING"));
    assert_eq!(e.base().bigrams["GOOD MORNING"].count, 7);

    let after = e.get_predictions_at("GOOD MORNING ", now());
    assert!(!after.iter().any(|w| w.eq_ignore_ascii_case("MORNING")), "{after:?}");
    assert!(after.contains(&"THURSDAY".to_string()), "{after:?}");

    assert_eq!(e.get_predictions_at("thu", now())[0], "THURSDAY");
}

#[test]
fn stored_user_corpus_keys_are_normalized() {
    let store = MemoryStore::new().with_value(
        USER_CORPUS_KEY,
        json!({"frequent_words": {"coffee": {"count": 2}, "COFFEE": {"count": 1}}}),
    );
    let e = PredictionEngine::with_store(&Config::default(), Box::new(store));
    assert_eq!(e.user().words.len(), 1);
    assert_eq!(e.user().words["COFFEE"].count, 3);
}
