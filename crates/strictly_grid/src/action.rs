//! First-class action types.
//!
//! Moves are domain events, not side effects. They record who played where,
//! when, and (for the automated side) why.

use super::{Board, BoardSize, Player};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A ply: a player placing their mark on a cell.
///
/// Moves are immutable once created. They are appended to the move log and
/// only ever leave it through undo truncation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// Row-major cell index.
    pub cell: usize,
    /// When the move was applied.
    pub timestamp: DateTime<Utc>,
    /// Explanation supplied by the automated opponent.
    pub reasoning: Option<String>,
}

impl Move {
    /// Creates a new move stamped with the current time.
    #[instrument(skip(reasoning))]
    pub fn new(player: Player, cell: usize, reasoning: Option<String>) -> Self {
        Self {
            player,
            cell,
            timestamp: Utc::now(),
            reasoning,
        }
    }

    /// Returns the player making this move.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Returns the cell of this move.
    pub fn cell(&self) -> usize {
        self.cell
    }

    /// Move-log label such as `X -> R2:C3`.
    pub fn label(&self, size: BoardSize) -> String {
        let (row, col) = Board::coordinates(size, self.cell);
        format!("{} -> R{}:C{}", self.player, row, col)
    }
}

/// Why a cell selection was rejected.
///
/// Rejections leave the session untouched; callers can simply ignore them.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The square at the cell is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(usize),

    /// The cell is outside the board.
    #[display("Cell {} is outside the board", _0)]
    OutOfBounds(usize),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// The automated opponent is choosing its move.
    #[display("Opponent is thinking")]
    OpponentThinking,

    /// It's the automated side's turn; a human cannot move for it.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(Player),

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}

/// Why an opponent response was discarded during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum StaleResponse {
    /// The session was reset, resized or switched mode after the request.
    #[display("Session generation changed")]
    GenerationChanged,

    /// The session is no longer waiting on this request.
    #[display("Session is not waiting for the opponent")]
    NotThinking,

    /// The chosen cell has been filled since the request.
    #[display("Cell {} is no longer empty", _0)]
    CellTaken(usize),
}

impl std::error::Error for StaleResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_uses_coordinates() {
        let mv = Move::new(Player::O, 5, Some("Blocking".to_string()));
        assert_eq!(mv.label(BoardSize::Three), "O -> R2:C3");
        assert_eq!(mv.label(BoardSize::Four), "O -> R2:C2");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(MoveError::SquareOccupied(4).to_string(), "Square 4 is already occupied");
        assert_eq!(MoveError::NotYourTurn(Player::O).to_string(), "It's not O's turn");
        assert_eq!(StaleResponse::CellTaken(2).to_string(), "Cell 2 is no longer empty");
    }
}
