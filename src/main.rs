//! Pronunciation Drill CLI Application

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;

use drill_rs::config::OutputFormat;
use drill_rs::output::{format_countdown, format_prompt};
use drill_rs::speech::console::spawn_stdin_reader;
use drill_rs::speech::{
    ConsoleCapability, ConsolePlayback, ManualClock, ScriptedCapability,
};
use drill_rs::{
    classify, similarity, BeginOutcome, Config, ContentStore, DrillSequencer, FeedbackWriter,
    JsonContentStore, RecognitionResult, SortOrder, SpeechSession,
};

/// Pronunciation drill engine
#[derive(Parser)]
#[command(name = "drill-rs")]
#[command(about = "Listen-and-repeat pronunciation drills with similarity feedback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive drill; typed lines stand in for speech
    Drill {
        /// JSON content store
        #[arg(short, long)]
        store: PathBuf,

        /// Corpus to drill
        #[arg(short = 'C', long)]
        corpus: String,

        /// Hard listening window in seconds
        #[arg(short, long)]
        timeout: Option<f32>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Score a heard transcript against a target
    Score {
        heard: String,
        target: String,
    },

    /// Classify a similarity score into a feedback tier
    Classify {
        score: f64,
    },

    /// Print the navigation index of a corpus
    Index {
        /// JSON content store
        #[arg(short, long)]
        store: PathBuf,

        /// Corpus to list
        #[arg(short = 'C', long)]
        corpus: String,

        /// Sort alphabetically instead of by rank
        #[arg(long)]
        alpha: bool,
    },

    /// Replay a scripted attempt with simulated timing
    Replay {
        /// Target phrase
        #[arg(short, long)]
        target: String,

        /// Milliseconds between transcripts
        #[arg(long, default_value = "400")]
        step_ms: u64,

        /// Interim transcripts, in delivery order
        transcripts: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging - quiet by default, use -v for more
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    // Load configuration
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Drill {
            store,
            corpus,
            timeout,
            format,
        } => {
            // Apply CLI overrides
            if let Some(timeout) = timeout {
                config.session.hard_timeout_secs = timeout;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            config.validate()?;
            run_drill(config, store, &corpus)
        }
        Commands::Score { heard, target } => {
            let score = similarity(&heard, &target);
            let feedback = classify(score);
            println!(
                "{:.4} {} ({})",
                score,
                feedback.label,
                if feedback.is_success { "pass" } else { "retry" }
            );
            Ok(())
        }
        Commands::Classify { score } => {
            let feedback = classify(score);
            println!("{} (weight {}, {})", feedback.label, feedback.visual_weight, feedback.color);
            Ok(())
        }
        Commands::Index {
            store,
            corpus,
            alpha,
        } => print_index(store, &corpus, alpha),
        Commands::Replay {
            target,
            step_ms,
            transcripts,
        } => replay(config, &target, Duration::from_millis(step_ms), &transcripts),
    }
}

/// Statistics for a drill run
struct DrillStats {
    attempts: u32,
    passed: u32,
    similarity_sum: f64,
}

impl DrillStats {
    fn new() -> Self {
        Self {
            attempts: 0,
            passed: 0,
            similarity_sum: 0.0,
        }
    }

    fn record(&mut self, result: &RecognitionResult) {
        self.attempts += 1;
        self.similarity_sum += result.similarity;
        if result.feedback.is_success {
            self.passed += 1;
        }
    }

    fn log_summary(&self) {
        let average = if self.attempts == 0 {
            0.0
        } else {
            self.similarity_sum / self.attempts as f64
        };
        info!(
            "Drill complete: {} attempts, {} passed, average similarity {:.0}%",
            self.attempts,
            self.passed,
            average * 100.0
        );
        println!(
            "{} attempts, {} passed, average {:.0}%",
            self.attempts,
            self.passed,
            average * 100.0
        );
    }
}

const HELP: &str = "[l]isten  [p]lay  [n]ext  [f]avorite  [j N] jump  [i]ndex  [s]ort  [q]uit";

/// Wait for the next command line, checking the shutdown flag
fn next_line(lines: &Receiver<String>, running: &AtomicBool) -> Option<String> {
    while running.load(Ordering::SeqCst) {
        match lines.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => return Some(line),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
    None
}

/// Run an interactive terminal drill
fn run_drill(config: Config, store_path: PathBuf, corpus: &str) -> Result<()> {
    // Setup signal handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut store = JsonContentStore::open(&store_path)
        .with_context(|| format!("Failed to open content store {}", store_path.display()))?;
    let set = store
        .load_drill_set(corpus)
        .with_context(|| format!("Failed to load corpus {}", corpus))?;
    let mut sequencer = DrillSequencer::new(set).context("Corpus is not drillable")?;

    let lines = spawn_stdin_reader();
    let capability = ConsoleCapability::new(lines.clone());
    let mut session = SpeechSession::new(&config, capability, ConsolePlayback::default());
    let mut writer = FeedbackWriter::new(config.output.clone());
    let mut stats = DrillStats::new();

    println!("{} - {} words", sequencer.corpus_name(), sequencer.len());

    'drill: loop {
        let (word, phrase) = sequencer.current();
        let target = phrase.text.clone();
        let phrase_id = phrase.id;
        println!();
        println!(
            "{}",
            format_prompt(word, phrase, sequencer.position(), sequencer.len())
        );
        println!("{}", HELP);

        let Some(line) = next_line(&lines, &running) else {
            break 'drill;
        };
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");

        match command {
            "l" | "listen" => {
                match session.begin_attempt(&target) {
                    Ok(BeginOutcome::Started(_)) => {}
                    Ok(BeginOutcome::Finalized(result)) => {
                        stats.record(&result);
                        writer.write(&result)?;
                        continue;
                    }
                    Err(e) => {
                        println!("  {}", e);
                        continue;
                    }
                }
                if config.output.show_countdown {
                    if let Some(remaining) = session.remaining() {
                        println!(
                            "  Listening ({}) - say it (type it), empty line to stop",
                            format_countdown(remaining)
                        );
                    }
                }
                match session.wait() {
                    Ok(Some(result)) => {
                        stats.record(&result);
                        writer.write(&result)?;
                    }
                    Ok(None) => debug!("Attempt ended without a result"),
                    Err(e) => println!("  {}", e),
                }
            }
            "p" | "play" => {
                if let Err(e) = session.speak(&target) {
                    println!("  {}", e);
                }
            }
            "n" | "next" => {
                session.cancel_playback();
                session.reset();
                sequencer.advance();
            }
            "f" | "fav" => match sequencer.commit_favorite(&mut store, phrase_id) {
                Ok(true) => println!("  Added to favorites"),
                Ok(false) => println!("  Removed from favorites"),
                Err(e) => {
                    warn!("Favorite update failed: {}", e);
                    println!("  {}", e);
                }
            },
            "j" | "jump" => {
                let index = parts.next().and_then(|n| n.parse::<usize>().ok());
                match index {
                    Some(n) if n >= 1 => match sequencer.jump_to(n - 1) {
                        Ok(()) => session.reset(),
                        Err(e) => println!("  {}", e),
                    },
                    _ => println!("  Usage: j <word number>"),
                }
            }
            "i" | "index" => {
                for entry in sequencer.index() {
                    if let Some(initial) = entry.section {
                        println!("  -- {} --", initial);
                    }
                    println!(
                        "  {} {:>3}. {} ({})",
                        if entry.is_current { ">" } else { " " },
                        entry.position + 1,
                        entry.word.text,
                        entry.word.gloss
                    );
                }
            }
            "s" | "sort" => {
                let next = match sequencer.sort_order() {
                    SortOrder::Rank => SortOrder::Alphabetical,
                    SortOrder::Alphabetical => SortOrder::Rank,
                };
                sequencer.set_sort_order(next);
                println!("  Index sorted by {:?}", next);
            }
            "q" | "quit" => break 'drill,
            "" => {}
            other => println!("  Unknown command: {}", other),
        }
    }

    session.reset();
    stats.log_summary();
    Ok(())
}

/// Print the navigation index of a corpus
fn print_index(store_path: PathBuf, corpus: &str, alpha: bool) -> Result<()> {
    let store = JsonContentStore::open(&store_path)
        .with_context(|| format!("Failed to open content store {}", store_path.display()))?;
    let mut sequencer = DrillSequencer::new(store.load_drill_set(corpus)?)?;
    if alpha {
        sequencer.set_sort_order(SortOrder::Alphabetical);
        let initials: String = sequencer.section_initials().into_iter().collect();
        println!("Sections: {}", initials);
    }

    println!("{}", sequencer.corpus_name());
    for entry in sequencer.index() {
        if let Some(initial) = entry.section {
            println!("-- {} --", initial);
        }
        println!(
            "{:>4}. {} ({}) - {} phrases",
            entry.position + 1,
            entry.word.text,
            entry.word.gloss,
            entry.word.phrases.len()
        );
    }
    Ok(())
}

/// Replay scripted transcripts through a session on a simulated clock
fn replay(config: Config, target: &str, step: Duration, transcripts: &[String]) -> Result<()> {
    let capability = ScriptedCapability::new();
    let clock = ManualClock::new();
    let mut session = SpeechSession::with_clock(
        &config,
        capability.clone(),
        ConsolePlayback::default(),
        clock.clone(),
    );
    let mut writer = FeedbackWriter::new(config.output.clone());

    session.begin_attempt(target)?;

    let mut finished = None;
    for text in transcripts {
        clock.advance(step);
        if let Some(result) = session.pump()? {
            finished = Some(result);
            break;
        }
        capability.say(text);
        if let Some(result) = session.pump()? {
            finished = Some(result);
            break;
        }
        println!(
            "  heard {:?} ({:.0}%)",
            text,
            similarity(text, target) * 100.0
        );
    }

    if finished.is_none() {
        // Let a pending auto-stop fire, otherwise stop by hand
        clock.advance(config.session.grace_delay());
        finished = session.pump()?;
    }
    let result = match finished.or_else(|| session.end_attempt()) {
        Some(result) => result,
        None => anyhow::bail!("Replay produced no result"),
    };

    writer.write(&result)?;
    Ok(())
}
