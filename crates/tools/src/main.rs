use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use game_core::{
    AlwaysAttack, Game, GameConfig, InputJournal, JournalWriter, LogEvent, autopilot_command,
    load_journal_from_file, replay_journal, step_recorded,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Headless runner for the depths simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Let the stairs-seeking autopilot play a run and print a summary
    Simulate {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value_t = 1000)]
        turns: u32,
        /// TOML file overriding generation and combat constants
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write every input to this JSONL journal
        #[arg(short, long)]
        journal: Option<PathBuf>,
        /// Print the last messages of the run
        #[arg(long, default_value_t = 0)]
        tail: usize,
    },
    /// Replay a JSONL journal and print the final snapshot hash
    Replay {
        #[arg(short, long)]
        journal: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Simulate { seed, turns, config, journal, tail } => {
            simulate(seed, turns, &load_config(config.as_deref())?, journal.as_deref(), tail)
        }
        Commands::Replay { journal, config } => replay(&journal, &load_config(config.as_deref())?),
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config TOML: {}", path.display()))
}

fn simulate(
    seed: u64,
    turns: u32,
    config: &GameConfig,
    journal_path: Option<&Path>,
    tail: usize,
) -> Result<()> {
    let mut game = Game::with_config(seed, config.clone()).context("Failed to start the run")?;
    let mut journal = InputJournal::new(seed, config);
    let mut writer = journal_path
        .map(|path| {
            JournalWriter::create(path, &journal)
                .with_context(|| format!("Failed to create journal: {}", path.display()))
        })
        .transpose()?;
    info!(seed, turns, "simulation started");

    let mut defeated = 0usize;
    while game.current_turn() < u64::from(turns) && !game.is_over() {
        let before = journal.inputs.len();
        let command = autopilot_command(&game);
        let report = step_recorded(&mut game, &mut journal, command, &mut AlwaysAttack)
            .with_context(|| format!("Turn {} failed", game.current_turn()))?;
        defeated += report.events.iter().filter(|e| matches!(e, LogEvent::EnemyDefeated { .. })).count();
        if let Some(writer) = writer.as_mut() {
            for record in &journal.inputs[before..] {
                writer.append(report.turn, &record.payload).context("Failed to append to journal")?;
            }
        }
    }

    println!("Simulation complete.");
    println!("Seed: {seed}");
    println!("Final Turn: {}", game.current_turn());
    println!("Deepest Floor: {}", game.floor());
    println!("Enemies Defeated: {defeated}");
    println!("Outcome: {:?}", game.outcome());
    println!("Snapshot Hash: {}", game.snapshot_hash());
    if tail > 0 {
        let lines: Vec<String> = game.log().map(ToString::to_string).collect();
        for line in &lines[lines.len().saturating_sub(tail)..] {
            println!("  {line}");
        }
    }
    Ok(())
}

fn replay(path: &Path, config: &GameConfig) -> Result<()> {
    let loaded = load_journal_from_file(path)
        .with_context(|| format!("Failed to load journal file: {}", path.display()))?;
    let result = replay_journal(&loaded.journal, config).context("Replay failed during execution")?;

    println!("Replay complete.");
    println!("Inputs: {}", loaded.journal.inputs.len());
    println!("Final Turn: {}", result.final_turn);
    println!("Outcome: {:?}", result.final_outcome);
    println!("Snapshot Hash: {}", result.final_snapshot_hash);
    Ok(())
}
