//! Draw detection logic.

use crate::Board;
use tracing::instrument;

/// Checks if the board is full (all squares occupied).
///
/// A full board with no winner indicates a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

#[cfg(test)]
mod tests {
    use super::super::win::check_winner;
    use super::*;
    use crate::{BoardSize, Player, Square};

    fn is_draw(board: &Board) -> bool {
        is_full(board) && check_winner(board).is_none()
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new(BoardSize::Three)));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new(BoardSize::Four);
        board.set(5, Square::Occupied(Player::X)).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_draw_detection_four_by_four() {
        // Pattern by row: XXOO / OOXX / XXOO / OOXX, no line for either side.
        let rows = ["XXOO", "OOXX", "XXOO", "OOXX"];
        let mut board = Board::new(BoardSize::Four);
        for (row, marks) in rows.iter().enumerate() {
            for (col, mark) in marks.chars().enumerate() {
                let player = if mark == 'X' { Player::X } else { Player::O };
                board.set(row * 4 + col, Square::Occupied(player)).unwrap();
            }
        }
        assert!(is_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let mut board = Board::new(BoardSize::Three);
        for cell in [0, 1, 2] {
            board.set(cell, Square::Occupied(Player::X)).unwrap();
        }
        for cell in [3, 4, 5, 6, 7, 8] {
            board.set(cell, Square::Occupied(Player::O)).unwrap();
        }
        assert!(is_full(&board));
        assert!(!is_draw(&board));
    }
}
