//! Alternating turn invariant: players alternate X, O, X, O, ...

use super::Invariant;
use crate::{AUTOMATED_MARK, FIRST_MARK, GameMode, GameStatus, Player, Session};

/// Invariant: the move log alternates starting with X, and `turn` follows.
///
/// While playing, `turn` is X after an even number of plies and O after an
/// odd number. A finished game freezes `turn` on the last mover, except that
/// the automated opponent's final ply still hands the turn back. The one
/// tolerated exception is a game in which the turn was handed back to the
/// human after the opponent could not produce any move.
pub struct AlternatingTurnInvariant;

impl Invariant<Session> for AlternatingTurnInvariant {
    fn holds(session: &Session) -> bool {
        let log = session.move_log();

        if let Some(first) = log.first()
            && first.player != FIRST_MARK
        {
            return false;
        }

        if session.status() == GameStatus::Finished {
            let Some(last) = log.last().map(|mv| mv.player) else {
                return false;
            };
            let expected = if session.mode() == GameMode::VsAuto && last == AUTOMATED_MARK {
                last.opponent()
            } else {
                last
            };
            return session.turn() == expected;
        }

        // Once the opponent skipped a turn, strict alternation no longer applies.
        if session.turn_handed_back {
            return true;
        }

        if log.windows(2).any(|pair| pair[0].player == pair[1].player) {
            return false;
        }

        let expected_next = if log.len() % 2 == 0 { Player::X } else { Player::O };
        session.turn() == expected_next
    }

    fn description() -> &'static str {
        "Players alternate turns (X, O, X, O, ...)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardSize, Difficulty, MoveSource, ResolvedMove};

    #[test]
    fn test_empty_session_holds() {
        let session = Session::new(BoardSize::Three, GameMode::VsHuman, Difficulty::Hard);
        assert!(AlternatingTurnInvariant::holds(&session));
    }

    #[test]
    fn test_alternating_sequence_holds() {
        let mut session = Session::new(BoardSize::Four, GameMode::VsHuman, Difficulty::Hard);
        for cell in [0, 5, 10, 15, 3] {
            session.apply_move(cell).unwrap();
            assert!(AlternatingTurnInvariant::holds(&session));
        }
        assert_eq!(session.turn(), Player::O);
    }

    #[test]
    fn test_opponent_win_hands_turn_back() {
        let mut session = Session::new(BoardSize::Three, GameMode::VsAuto, Difficulty::Hard);
        for (human, reply) in [(0, 3), (1, 4), (8, 5)] {
            session.apply_move(human).unwrap();
            let token = session.pending_request().cloned().unwrap();
            session
                .complete_request(&token, ResolvedMove::new(reply, "", MoveSource::Provider))
                .unwrap();
        }
        assert_eq!(session.status(), GameStatus::Finished);
        assert_eq!(session.turn(), Player::X);
        assert!(AlternatingTurnInvariant::holds(&session));

        session.turn = Player::O;
        assert!(!AlternatingTurnInvariant::holds(&session));
    }

    #[test]
    fn test_wrong_turn_violates() {
        let mut session = Session::new(BoardSize::Three, GameMode::VsHuman, Difficulty::Hard);
        session.apply_move(4).unwrap();
        session.turn = Player::X;
        assert!(!AlternatingTurnInvariant::holds(&session));
    }
}
