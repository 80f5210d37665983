//! Shared helpers for the corpus maintenance binaries.
//!
//! Word lists come in three shapes:
//! - JSON: `[["WORD", count], ...]`
//! - CSV: `word,count` with an optional header row
//! - TXT: free text; every word occurrence counts once

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use switchscan_core::store::USER_CORPUS_KEY;
use switchscan_core::utils::clean_word;
use switchscan_core::{Corpus, CorpusEntry, Store};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+(?:'[A-Za-z]+)?").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    Txt,
}

impl Format {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            "txt" => Ok(Format::Txt),
            _ => bail!("Unsupported format: {}. Use 'json', 'csv', or 'txt'", name),
        }
    }
}

/// Parse a word list and fold it into cleaned, uppercased words with summed
/// counts. Entries that clean to nothing are dropped.
pub fn parse_words(content: &str, format: Format) -> Result<Vec<(String, u64)>> {
    let raw = match format {
        Format::Json => parse_json(content)?,
        Format::Csv => parse_csv(content)?,
        Format::Txt => parse_txt(content),
    };
    let mut words: BTreeMap<String, u64> = BTreeMap::new();
    for (word, count) in raw {
        if let Some(word) = clean_word(&word) {
            let total = words.entry(word).or_default();
            *total = total.saturating_add(count);
        }
    }
    Ok(words.into_iter().collect())
}

fn parse_json(content: &str) -> Result<Vec<(String, u64)>> {
    serde_json::from_str(content).map_err(|e| anyhow!("Failed to parse JSON: {}", e))
}

fn parse_csv(content: &str) -> Result<Vec<(String, u64)>> {
    let mut entries = Vec::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (word, count) = match line.rsplit_once(',') {
            Some((word, count)) => (word, count.trim()),
            None => (line, "1"),
        };
        let word = word.trim().trim_matches('"').replace("\"\"", "\"");
        let count = match count.parse::<u64>() {
            Ok(count) => count,
            // Header row
            Err(_) if n == 0 => continue,
            Err(_) => bail!("line {}: bad count {:?}", n + 1, count),
        };
        entries.push((word, count));
    }
    Ok(entries)
}

fn parse_txt(content: &str) -> Vec<(String, u64)> {
    WORD.find_iter(content)
        .map(|m| (m.as_str().to_string(), 1))
        .collect()
}

/// The stored user corpus, or an empty one if nothing was saved yet.
pub fn load_user_corpus(store: &dyn Store) -> Result<Corpus> {
    match store.get(USER_CORPUS_KEY)? {
        Some(value) => Corpus::from_json_value(value).context("Stored user corpus is unreadable"),
        None => Ok(Corpus::new()),
    }
}

pub fn save_user_corpus(store: &mut dyn Store, corpus: &Corpus) -> Result<()> {
    store.set(USER_CORPUS_KEY, &corpus.to_json_value()?)?;
    Ok(())
}

/// Words of `corpus` with their counts, alphabetical or by descending count.
pub fn word_counts(corpus: &Corpus, by_count: bool) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = corpus
        .words
        .iter()
        .map(|(word, entry)| (word.clone(), entry.count))
        .collect();
    if by_count {
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    }
    entries
}

pub fn export_json(entries: &[(String, u64)]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

pub fn export_csv(entries: &[(String, u64)]) -> String {
    let mut output = String::from("word,count\n");
    for (word, count) in entries {
        let escaped = word.replace('"', "\"\"");
        output.push_str(&format!("\"{}\",{}\n", escaped, count));
    }
    output
}

/// Add every table of `other` into `into`: counts are summed and the later
/// timestamp wins.
pub fn combine(into: &mut Corpus, other: Corpus) {
    let tables = [
        (&mut into.words, other.words),
        (&mut into.bigrams, other.bigrams),
        (&mut into.trigrams, other.trigrams),
    ];
    for (target, source) in tables {
        for (key, entry) in source {
            let merged: &mut CorpusEntry = target.entry(key).or_default();
            merged.count = merged.count.saturating_add(entry.count);
            merged.last_used = merged.last_used.max(entry.last_used);
        }
    }
}

/// Drop words, bigrams and trigrams seen fewer than `min_count` times.
/// Returns how many entries went.
pub fn drop_rare(corpus: &mut Corpus, min_count: u64) -> usize {
    let mut dropped = 0;
    for table in [&mut corpus.words, &mut corpus.bigrams, &mut corpus.trigrams] {
        let before = table.len();
        table.retain(|_, entry| entry.count >= min_count);
        dropped += before - table.len();
    }
    dropped
}
