//! A winning line belongs to the winner and spans the board.

use super::Invariant;
use crate::{Outcome, Session, Square};

/// Invariant: a winning line implies a winner, has length N and is
/// uniformly marked by that winner.
pub struct WinningLineInvariant;

impl Invariant<Session> for WinningLineInvariant {
    fn holds(session: &Session) -> bool {
        let Some(line) = session.winning_line() else {
            return true;
        };

        let Some(Outcome::Winner(player)) = session.outcome() else {
            return false;
        };

        line.len() == session.board_size().side()
            && line
                .iter()
                .all(|&cell| session.board().get(cell) == Some(Square::Occupied(player)))
    }

    fn description() -> &'static str {
        "Winning line has N cells all held by the winner"
    }
}
