//! Only the automated side ever thinks.

use super::Invariant;
use crate::{AUTOMATED_MARK, GameMode, GameStatus, Session};

/// Invariant: `status == Thinking ⇒ mode == VsAuto ∧ turn == O`, with an
/// outstanding request token.
pub struct ThinkingSideInvariant;

impl Invariant<Session> for ThinkingSideInvariant {
    fn holds(session: &Session) -> bool {
        if session.status() != GameStatus::Thinking {
            return session.pending_request().is_none();
        }

        session.mode() == GameMode::VsAuto
            && session.turn() == AUTOMATED_MARK
            && session.pending_request().is_some()
    }

    fn description() -> &'static str {
        "Thinking only happens on the automated side's turn against the opponent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardSize, Difficulty};

    #[test]
    fn test_holds_while_thinking() {
        let mut session = Session::new(BoardSize::Three, GameMode::VsAuto, Difficulty::Hard);
        session.apply_move(0).unwrap();
        assert_eq!(session.status(), GameStatus::Thinking);
        assert!(ThinkingSideInvariant::holds(&session));
    }

    #[test]
    fn test_thinking_between_humans_violates() {
        let mut session = Session::new(BoardSize::Three, GameMode::VsHuman, Difficulty::Hard);
        session.apply_move(0).unwrap();
        session.status = GameStatus::Thinking;
        assert!(!ThinkingSideInvariant::holds(&session));
    }
}
