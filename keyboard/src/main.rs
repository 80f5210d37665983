//! Terminal front end for the scanning keyboard.
//!
//! Reads switch events from stdin against a simulated clock, so a session can
//! be scripted or driven by hand. One or more commands per line:
//!
//! - `a` / `s`: tap Advance / Select
//! - `A<ms>` / `S<ms>`: hold Advance / Select for `<ms>` milliseconds
//! - `w<ms>`: let `<ms>` milliseconds pass (auto-scan runs)
//! - `blur`: the window lost focus
//! - `q`: quit
//!
//! Usage:
//!   switchscan-keyboard --config keyboard.toml --data ~/.switchscan/user.redb --base base.json

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use switchscan_core::{
    Config, Corpus, Feedback, Highlight, PredictionEngine, RedbStore, ScanSession, Signal,
};
use switchscan_keyboard::{KeyboardScreen, SpeechFeedback};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Clock resolution while simulating held switches and waits.
const TICK_MS: u64 = 50;

#[derive(Parser, Debug)]
#[command(name = "switchscan-keyboard")]
#[command(about = "Two-switch scanning keyboard with word prediction")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base corpus: JSON, or a bincode snapshot with a .bin extension
    #[arg(short, long)]
    base: Option<PathBuf>,

    /// User corpus database (redb). Learning is not persisted when omitted.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Duration of a tap in milliseconds
    #[arg(long, default_value_t = 200)]
    tap_ms: u64,

    /// Turn auto-scan on regardless of the configuration file
    #[arg(long)]
    auto_scan: bool,
}

/// Prints what a screen would show and say.
#[derive(Debug, Default)]
struct ConsoleFeedback;

impl Feedback for ConsoleFeedback {
    fn cancel_speech(&mut self) {}

    fn speak(&mut self, text: &str) {
        println!("  🔊 {text}");
    }

    fn highlight(&mut self, target: Highlight) {
        match target {
            Highlight::None => {}
            Highlight::Header => println!("  ▶ [header]"),
            Highlight::Item { index } => println!("  ▶ row {index}"),
            Highlight::Child { index, child } => println!("  ▶ row {index}, key {child}"),
        }
    }
}

type Session = ScanSession<SpeechFeedback<ConsoleFeedback>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Tap(Signal),
    Hold(Signal, u64),
    Wait(u64),
    Blur,
    Quit,
}

fn parse_command(token: &str) -> Result<Command> {
    let ms = |digits: &str| -> Result<u64> {
        digits
            .parse()
            .with_context(|| format!("bad duration in {token:?}"))
    };
    Ok(match token {
        "a" => Command::Tap(Signal::Advance),
        "s" => Command::Tap(Signal::Select),
        "blur" => Command::Blur,
        "q" | "quit" => Command::Quit,
        _ => match token.split_at(token.char_indices().nth(1).map_or(token.len(), |(i, _)| i)) {
            ("A", rest) => Command::Hold(Signal::Advance, ms(rest)?),
            ("S", rest) => Command::Hold(Signal::Select, ms(rest)?),
            ("w", rest) => Command::Wait(ms(rest)?),
            _ => bail!("unknown command {token:?}"),
        },
    })
}

/// Simulated monotonic clock feeding the session.
struct Driver {
    session: Session,
    now_ms: u64,
    tap_ms: u64,
}

impl Driver {
    fn advance(&mut self, duration: u64) {
        let end = self.now_ms + duration;
        while self.now_ms < end {
            self.now_ms = (self.now_ms + TICK_MS).min(end);
            self.session.tick(self.now_ms);
        }
    }

    fn run(&mut self, command: Command) {
        match command {
            Command::Tap(signal) => {
                let tap = self.tap_ms;
                self.run(Command::Hold(signal, tap));
            }
            Command::Hold(signal, duration) => {
                self.session.press(signal, self.now_ms);
                self.advance(duration);
                self.session.release(signal, self.now_ms);
            }
            Command::Wait(duration) => self.advance(duration),
            Command::Blur => self.session.focus_lost(self.now_ms),
            Command::Quit => {}
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_toml(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e))?,
        None => Config::default(),
    };
    if args.auto_scan {
        config.auto_scan = true;
    }
    Ok(config)
}

fn build_predictor(args: &Args, config: &Config) -> Result<PredictionEngine> {
    let mut predictor = match &args.data {
        Some(path) => {
            let store = RedbStore::open(path)
                .with_context(|| format!("Failed to open user data at {}", path.display()))?;
            PredictionEngine::with_store(config, Box::new(store))
        }
        None => PredictionEngine::new(config),
    };

    predictor.begin_base_load();
    match &args.base {
        Some(path) => {
            let result = Corpus::load(path);
            if let Err(e) = &result {
                warn!("base corpus {} unusable: {e}", path.display());
            }
            predictor.finish_base_load(result);
        }
        None => predictor.finish_base_load(Ok(Corpus::new())),
    }
    info!(stats = %predictor.merged().corpus().stats(), "predictor ready");
    Ok(predictor)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let predictor = build_predictor(&args, &config)?;
    let keyboard = KeyboardScreen::new(&config, predictor);

    println!("═══════════════════════════════════════════════════");
    println!("  switchscan keyboard");
    println!("═══════════════════════════════════════════════════");
    println!("Commands: a, s (tap)  A<ms>, S<ms> (hold)  w<ms> (wait)  blur  q");
    println!();

    let session = ScanSession::new(
        config,
        SpeechFeedback::new(ConsoleFeedback),
        Box::new(keyboard),
        0,
    );
    let mut driver = Driver {
        session,
        now_ms: 0,
        tap_ms: args.tap_ms,
    };

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        for token in line.split_whitespace() {
            let command = match parse_command(token) {
                Ok(command) => command,
                Err(e) => {
                    eprintln!("⚠ {e}");
                    continue;
                }
            };
            if command == Command::Quit {
                return Ok(());
            }
            driver.run(command);
            if driver.session.is_exited() {
                println!("Exited.");
                return Ok(());
            }
        }
        if driver.session.screen_name() != Some("keyboard") {
            continue;
        }
        if let Some(text) = driver
            .session
            .engine()
            .and_then(|engine| engine.set().slot_label(0))
        {
            println!("  ✎ {text}");
        }
    }
    Ok(())
}
