//! First-class invariants for a game session.
//!
//! Invariants are logical properties that must hold between transitions.
//! They are testable independently and checked as postconditions in debug
//! builds.

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples of up to six invariants.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($inv:ident),+) => {
        impl<S, $($inv),+> InvariantSet<S> for ($($inv,)+)
        where
            $($inv: Invariant<S>),+
        {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();

                $(
                    if !$inv::holds(state) {
                        violations.push(InvariantViolation::new($inv::description()));
                    }
                )+

                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(I1, I2);
impl_invariant_set!(I1, I2, I3);
impl_invariant_set!(I1, I2, I3, I4);
impl_invariant_set!(I1, I2, I3, I4, I5);
impl_invariant_set!(I1, I2, I3, I4, I5, I6);

pub mod alternating_turn;
pub mod board_outcome;
pub mod history_consistent;
pub mod outcome_status;
pub mod thinking_side;
pub mod winning_line;

pub use alternating_turn::AlternatingTurnInvariant;
pub use board_outcome::BoardOutcomeInvariant;
pub use history_consistent::HistoryConsistentInvariant;
pub use outcome_status::OutcomeStatusInvariant;
pub use thinking_side::ThinkingSideInvariant;
pub use winning_line::WinningLineInvariant;

/// All session invariants as a composable set.
pub type SessionInvariants = (
    OutcomeStatusInvariant,
    WinningLineInvariant,
    BoardOutcomeInvariant,
    AlternatingTurnInvariant,
    ThinkingSideInvariant,
    HistoryConsistentInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardSize, Difficulty, GameMode, Player, Session, Square};

    fn human_session() -> Session {
        Session::new(BoardSize::Three, GameMode::VsHuman, Difficulty::Hard)
    }

    #[test]
    fn test_invariant_set_holds_for_new_session() {
        assert!(SessionInvariants::check_all(&human_session()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_moves() {
        let mut session = human_session();
        for cell in [0, 4, 2] {
            session.apply_move(cell).unwrap();
        }
        assert!(SessionInvariants::check_all(&session).is_ok());
    }

    #[test]
    fn test_invariant_set_detects_violations() {
        let mut session = human_session();
        session.apply_move(4).unwrap();

        // Corrupt the board behind the history's back.
        session.board.set(0, Square::Occupied(Player::O)).unwrap();

        let violations = SessionInvariants::check_all(&session).unwrap_err();
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (OutcomeStatusInvariant, WinningLineInvariant);
        assert!(TwoInvariants::check_all(&human_session()).is_ok());
    }
}
