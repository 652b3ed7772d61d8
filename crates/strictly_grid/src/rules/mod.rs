//! Game rules for N×N tic-tac-toe.
//!
//! This module contains pure functions for evaluating a board. Rules are
//! separated from board storage so the session and the contracts can both
//! consume them.

pub mod draw;
pub mod lines;
pub mod win;

pub use draw::is_full;
pub use lines::{Line, lines};
pub use win::check_winner;

use super::{Board, Outcome};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Result of evaluating a board after a ply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Winner or draw, `None` while the game can continue.
    pub outcome: Option<Outcome>,
    /// The completed line, only present for a win.
    pub line: Option<Line>,
}

/// Evaluates the board: first completed line wins, a full board draws.
///
/// Lines are scanned rows, then columns, then the two diagonals, so the
/// reported line is deterministic.
#[instrument(skip(board), fields(size = %board.size()))]
pub fn evaluate(board: &Board) -> Evaluation {
    if let Some((player, line)) = check_winner(board) {
        return Evaluation {
            outcome: Some(Outcome::Winner(player)),
            line: Some(line),
        };
    }

    if is_full(board) {
        return Evaluation {
            outcome: Some(Outcome::Draw),
            line: None,
        };
    }

    Evaluation::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardSize, Player, Square};

    fn board_from(size: BoardSize, marks: &[(usize, Player)]) -> Board {
        let mut board = Board::new(size);
        for (cell, player) in marks {
            board.set(*cell, Square::Occupied(*player)).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_has_no_result() {
        for size in [BoardSize::Three, BoardSize::Four, BoardSize::Five] {
            assert_eq!(evaluate(&Board::new(size)), Evaluation::default());
        }
    }

    #[test]
    fn test_win_reports_line() {
        let board = board_from(
            BoardSize::Three,
            &[(0, Player::X), (4, Player::O), (1, Player::X), (5, Player::O), (2, Player::X)],
        );
        let evaluation = evaluate(&board);
        assert_eq!(evaluation.outcome, Some(Outcome::Winner(Player::X)));
        assert_eq!(evaluation.line, Some(vec![0, 1, 2]));
    }

    #[test]
    fn test_last_cell_completing_diagonal_is_a_win() {
        let board = board_from(
            BoardSize::Three,
            &[
                (0, Player::X),
                (1, Player::O),
                (2, Player::X),
                (3, Player::O),
                (4, Player::X),
                (5, Player::O),
                (7, Player::X),
                (6, Player::O),
                (8, Player::X),
            ],
        );
        let evaluation = evaluate(&board);
        assert_eq!(evaluation.outcome, Some(Outcome::Winner(Player::X)));
        assert_eq!(evaluation.line, Some(vec![0, 4, 8]));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let drawn = board_from(
            BoardSize::Three,
            &[
                (0, Player::X),
                (1, Player::O),
                (2, Player::X),
                (3, Player::X),
                (4, Player::O),
                (5, Player::O),
                (6, Player::O),
                (7, Player::X),
                (8, Player::X),
            ],
        );
        let evaluation = evaluate(&drawn);
        assert_eq!(evaluation.outcome, Some(Outcome::Draw));
        assert_eq!(evaluation.line, None);
    }
}
