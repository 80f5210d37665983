//! Export the learned user vocabulary to JSON or CSV
//!
//! Usage:
//!   cargo run -p switchscan-tools --bin export_corpus -- --db ~/.switchscan/user.redb --format json
//!   cargo run -p switchscan-tools --bin export_corpus -- --db ~/.switchscan/user.redb --format csv --output words.csv

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use switchscan_core::RedbStore;
use switchscan_tools::{export_csv, export_json, load_user_corpus, word_counts};

#[derive(Parser, Debug)]
#[command(name = "export_corpus")]
#[command(about = "Export the user corpus words to JSON or CSV")]
struct Args {
    /// Path to the user data database
    #[arg(short, long)]
    db: PathBuf,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sort by count (descending)
    #[arg(long)]
    sort_by_count: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let store = RedbStore::open(&args.db)
        .with_context(|| format!("Failed to open user data at {}", args.db.display()))?;
    let corpus = load_user_corpus(&store)?;
    eprintln!("User corpus: {}", corpus.stats());

    let entries = word_counts(&corpus, args.sort_by_count);
    let output = match args.format.as_str() {
        "json" => export_json(&entries)?,
        "csv" => export_csv(&entries),
        _ => anyhow::bail!("Unsupported format: {}. Use 'json' or 'csv'", args.format),
    };

    if let Some(path) = args.output {
        std::fs::write(&path, output)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        print!("{}", output);
    }

    Ok(())
}
