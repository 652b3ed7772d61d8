//! Strictly Grid - N×N tic-tac-toe session logic
//!
//! Pure, synchronous game core: no I/O, no clocks beyond move timestamps,
//! no async. Hosts drive a [`Session`] with player intents and feed opponent
//! replies back through [`Session::complete_request`].
//!
//! # Architecture
//!
//! - **Types**: board, marks, sizes, modes and outcomes
//! - **Rules**: generalized line enumeration and board evaluation
//! - **History**: board snapshots plus the move log, with asymmetric undo
//! - **Session**: the turn state machine with generation-stamped requests
//! - **Invariants / Contracts**: properties checked after every human ply
//!
//! # Example
//!
//! ```
//! use strictly_grid::{Applied, BoardSize, Difficulty, GameMode, Session};
//!
//! let mut session = Session::new(BoardSize::Four, GameMode::VsHuman, Difficulty::Hard);
//! assert_eq!(session.apply_move(5), Ok(Applied::Continue));
//! assert_eq!(session.move_log().len(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod history;
mod session;
mod types;

pub mod contracts;
pub mod invariants;
pub mod rules;

// Crate-level exports - Domain types
pub use types::{
    AUTOMATED_MARK, Board, BoardShapeError, BoardSize, Difficulty, FIRST_MARK, GameMode,
    GameStatus, InvalidBoardSize, Outcome, Player, Square,
};

// Crate-level exports - Moves and rejections
pub use action::{Move, MoveError, StaleResponse};

// Crate-level exports - History
pub use history::{History, steps_to_undo};

// Crate-level exports - Rules
pub use rules::{Evaluation, Line, evaluate};

// Crate-level exports - Session state machine
pub use session::{
    Applied, Generation, MoveSource, RequestToken, ResolvedMove, Session, SessionEvent,
    SessionSnapshot,
};
