//! Strictly Arena library - N×N tic-tac-toe host
//!
//! Wires the pure [`strictly_grid`] session to an asynchronous automated
//! opponent and a terminal front end.
//!
//! # Architecture
//!
//! - **Provider**: move sources (local heuristic, Gemini LLM)
//! - **Orchestrator**: pacing, timeout, validation and fallback per request
//! - **Controller**: serialized intent dispatch and opponent task lifecycle
//! - **Config**: TOML configuration with command-line overrides
//! - **Terminal**: line-based play loop
//!
//! # Example
//!
//! ```no_run
//! use strictly_arena::{ArenaConfig, Controller};
//! use strictly_grid::Session;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ArenaConfig::default();
//! let session = Session::new(*config.board_size(), *config.mode(), *config.difficulty());
//! let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let controller = Controller::new(session, config.build_orchestrator()?, tx);
//! controller.select_cell(4)?;
//! controller.settle().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod orchestrator;
pub mod provider;
pub mod terminal;

// Crate-level exports - Configuration
pub use config::{ArenaConfig, ConfigError, LlmSettings, OpponentConfig, Overrides};

// Crate-level exports - Opponent
pub use orchestrator::{CONFUSED_REASONING, FUZZY_REASONING, Orchestrator};
pub use provider::{
    HeuristicProvider, LlmConfig, LlmProvider, MoveProvider, MoveRequest, MoveResponse,
    ProviderError, ProviderKind,
};

// Crate-level exports - Dispatch
pub use controller::Controller;
