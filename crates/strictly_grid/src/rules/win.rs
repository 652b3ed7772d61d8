//! Win detection logic.

use super::lines::{Line, lines};
use crate::{Board, Player, Square};
use tracing::instrument;

/// Checks if there is a winner on the board.
///
/// Returns the player and the first fully marked line in scan order,
/// `None` otherwise.
#[instrument(skip(board), fields(size = %board.size()))]
pub fn check_winner(board: &Board) -> Option<(Player, Line)> {
    lines(board.size()).into_iter().find_map(|line| {
        let first = board.get(line[0])?;
        match first {
            Square::Occupied(player) if line.iter().all(|&cell| board.get(cell) == Some(first)) => {
                Some((player, line))
            }
            _ => None,
        }
    })
}
