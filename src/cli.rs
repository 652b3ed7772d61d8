//! Command-line interface for strictly_arena.

use crate::config::Overrides;
use crate::provider::ProviderKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_grid::{BoardSize, Difficulty, GameMode};

/// Strictly Arena - N×N tic-tac-toe against a race-safe automated opponent
#[derive(Parser, Debug)]
#[command(name = "strictly_arena")]
#[command(about = "Play 3x3, 4x4 or 5x5 tic-tac-toe in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Path to the arena config file
        #[arg(short, long, default_value = "arena.toml")]
        config: PathBuf,

        /// Board side length (3, 4 or 5)
        #[arg(short, long)]
        size: Option<BoardSize>,

        /// Opponent mode (auto or human)
        #[arg(short, long)]
        mode: Option<GameMode>,

        /// Opponent difficulty (easy, medium or hard)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Move provider (heuristic or llm)
        #[arg(short, long)]
        provider: Option<ProviderKind>,

        /// Seed for reproducible opponent choices
        #[arg(long)]
        seed: Option<u64>,

        /// Log file path
        #[arg(long, default_value = "strictly_arena.log")]
        log_file: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Path to the arena config file
        #[arg(short, long, default_value = "arena.toml")]
        config: PathBuf,
    },
}

/// Collects the command-line overrides of a `play` invocation.
pub fn overrides(
    size: Option<BoardSize>,
    mode: Option<GameMode>,
    difficulty: Option<Difficulty>,
    provider: Option<ProviderKind>,
    seed: Option<u64>,
) -> Overrides {
    Overrides {
        board_size: size,
        mode,
        difficulty,
        provider,
        seed,
    }
}
