//! Import words into the user corpus
//!
//! Supports multiple input formats:
//! - JSON: [["word", count], ...]
//! - CSV: word,count header with data rows
//! - TXT: free text, each word occurrence counts once
//!
//! Imported words get counts but no timestamp, so they rank as old until the
//! user actually types them.
//!
//! Usage:
//!   cargo run -p switchscan-tools --bin import_words -- --db ~/.switchscan/user.redb --input words.json
//!   cargo run -p switchscan-tools --bin import_words -- --db ~/.switchscan/user.redb --input notes.txt --format txt

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use switchscan_core::RedbStore;
use switchscan_tools::{load_user_corpus, parse_words, save_user_corpus, Format};

#[derive(Parser, Debug)]
#[command(name = "import_words")]
#[command(about = "Import words into the user corpus")]
struct Args {
    /// Path to the user data database
    #[arg(short, long)]
    db: PathBuf,

    /// Input file containing words
    #[arg(short, long)]
    input: PathBuf,

    /// Input format: json, csv, or txt
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Dry run (show what would be imported without actually importing)
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file {}", args.input.display()))?;
    let entries = parse_words(&content, Format::parse(&args.format)?)?;

    println!("Parsed {} words from {}", entries.len(), args.input.display());

    if args.dry_run {
        println!("\n[DRY RUN] Would import:");
        for (word, count) in entries.iter().take(10) {
            println!("  {} (count: {})", word, count);
        }
        if entries.len() > 10 {
            println!("  ... and {} more", entries.len() - 10);
        }
        return Ok(());
    }

    let mut store = RedbStore::open(&args.db)
        .with_context(|| format!("Failed to open user data at {}", args.db.display()))?;
    let mut corpus = load_user_corpus(&store)?;
    let before = corpus.stats();

    for (word, count) in &entries {
        corpus.add_word_count(word, *count);
    }
    save_user_corpus(&mut store, &corpus)?;

    println!("User corpus: {} -> {}", before, corpus.stats());
    println!("✓ Import complete!");
    Ok(())
}
