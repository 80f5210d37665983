//! User corpus import/export against a real database file.

use switchscan_core::{Config, Corpus, PredictionEngine, RedbStore};
use switchscan_tools::{combine, load_user_corpus, parse_words, save_user_corpus, word_counts, Format};
use tempfile::TempDir;

#[test]
fn imported_words_reach_the_prediction_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user.redb");

    {
        let mut store = RedbStore::open(&path).unwrap();
        let mut corpus = load_user_corpus(&store).unwrap();
        for (word, count) in parse_words("zebra zebra zeal", Format::Txt).unwrap() {
            corpus.add_word_count(&word, count);
        }
        save_user_corpus(&mut store, &corpus).unwrap();
    }

    let store = RedbStore::open(&path).unwrap();
    let corpus = load_user_corpus(&store).unwrap();
    assert_eq!(
        word_counts(&corpus, true),
        vec![("ZEBRA".to_string(), 2), ("ZEAL".to_string(), 1)]
    );

    let config = Config::default();
    let mut engine = PredictionEngine::with_store(&config, Box::new(store));
    engine.begin_base_load();
    engine.finish_base_load(Ok(Corpus::new()));
    let predictions = engine.get_predictions("ZE");
    assert_eq!(predictions[0], "ZEBRA");
    assert_eq!(predictions[1], "ZEAL");
}

#[test]
fn snapshot_of_combined_sources_loads_back() {
    let dir = TempDir::new().unwrap();
    let mut a = Corpus::from_json_str(r#"{"frequent_words": {"HELLO": {"count": 4}}}"#).unwrap();
    let b = Corpus::from_json_str(
        r#"{"frequent_words": {"HELLO": {"count": 1}}, "bigrams": {"HELLO THERE": {"count": 2}}}"#,
    )
    .unwrap();
    combine(&mut a, b);

    let path = dir.path().join("base.bin");
    std::fs::write(&path, a.to_bincode().unwrap()).unwrap();
    let loaded = Corpus::load(&path).unwrap();
    assert_eq!(loaded.words["HELLO"].count, 5);
    assert_eq!(loaded.bigrams["HELLO THERE"].count, 2);
}
