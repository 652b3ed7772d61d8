//! The recorded outcome agrees with what the board shows.

use super::Invariant;
use crate::Session;
use crate::rules::evaluate;

/// Invariant: exactly one of full-board draw, a winner, or an open board
/// with no result, and it matches a fresh evaluation of the board.
pub struct BoardOutcomeInvariant;

impl Invariant<Session> for BoardOutcomeInvariant {
    fn holds(session: &Session) -> bool {
        evaluate(session.board()).outcome == session.outcome()
    }

    fn description() -> &'static str {
        "Recorded outcome matches the board evaluation"
    }
}
