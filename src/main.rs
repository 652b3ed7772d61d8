//! Strictly Arena - Unified CLI
//!
//! Terminal tic-tac-toe on 3x3, 4x4 and 5x5 boards.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use strictly_arena::cli::{self, Cli, Command};
use strictly_arena::{ArenaConfig, Controller, terminal};
use strictly_grid::Session;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            size,
            mode,
            difficulty,
            provider,
            seed,
            log_file,
        } => {
            init_logging(&log_file)?;
            let mut arena = ArenaConfig::load_or_default(Some(config.as_path()))?;
            arena.apply(&cli::overrides(size, mode, difficulty, provider, seed));
            run_play(arena).await
        }
        Command::Config { config } => print_config(config),
    }
}

/// Sends tracing output to a file so it does not interleave with the board.
fn init_logging(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_arena=debug,strictly_grid=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// Runs the terminal game loop.
#[instrument(skip_all, fields(size = %arena.board_size(), mode = %arena.mode()))]
async fn run_play(arena: ArenaConfig) -> Result<()> {
    info!("Starting Strictly Arena");

    let orchestrator = arena.build_orchestrator()?;
    let session = Session::new(*arena.board_size(), *arena.mode(), *arena.difficulty());
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    let controller = Controller::new(session, orchestrator, event_tx);

    terminal::run(controller, arena, event_rx)
        .await
        .context("Terminal loop failed")?;
    Ok(())
}

/// Prints the effective configuration.
fn print_config(path: PathBuf) -> Result<()> {
    let arena = ArenaConfig::load_or_default(Some(path.as_path()))?;
    print!("{}", arena.to_toml()?);
    Ok(())
}
