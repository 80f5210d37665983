//! Build the base corpus snapshot loaded at startup
//!
//! Merges one or more JSON corpus files (`frequent_words`, `bigrams`,
//! `trigrams`), optionally drops rare entries, and writes a bincode snapshot.
//! With `--db` the result is also cached in a user data database.
//!
//! Usage:
//!   cargo run -p switchscan-tools --bin build_base_corpus -- -i data/base.json -o data/base.bin
//!   cargo run -p switchscan-tools --bin build_base_corpus -- -i a.json -i b.json -o base.bin --min-count 2

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use switchscan_core::store::BASE_CORPUS_KEY;
use switchscan_core::{Corpus, RedbStore, Store};
use switchscan_tools::{combine, drop_rare};

#[derive(Parser, Debug)]
#[command(name = "build_base_corpus")]
#[command(about = "Merge corpus JSON files into a bincode snapshot")]
struct Args {
    /// Input corpus JSON (repeatable)
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Output snapshot path
    #[arg(short, long)]
    output: PathBuf,

    /// Drop entries seen fewer times than this
    #[arg(long, default_value_t = 1)]
    min_count: u64,

    /// Also store the corpus in this database under the base corpus key
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut corpus = Corpus::new();
    for path in &args.input {
        let part = Corpus::load(path)
            .with_context(|| format!("Failed to load corpus {}", path.display()))?;
        println!("  {}: {}", path.display(), part.stats());
        combine(&mut corpus, part);
    }

    let dropped = drop_rare(&mut corpus, args.min_count);
    if dropped > 0 {
        println!("Dropped {} entries below count {}", dropped, args.min_count);
    }

    let bytes = corpus.to_bincode()?;
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "✓ Wrote {} ({} bytes): {}",
        args.output.display(),
        bytes.len(),
        corpus.stats()
    );

    if let Some(db) = &args.db {
        let mut store = RedbStore::open(db)
            .with_context(|| format!("Failed to open database {}", db.display()))?;
        store.set(BASE_CORPUS_KEY, &corpus.to_json_value()?)?;
        println!("✓ Cached in {}", db.display());
    }

    Ok(())
}
