//! Contract-based validation for cell selections.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} action {Q}

use super::action::MoveError;
use super::invariants::{InvariantSet, SessionInvariants};
use super::{AUTOMATED_MARK, GameMode, GameStatus, Session};
use tracing::instrument;

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game has not finished.
pub struct GameNotOver;

impl GameNotOver {
    /// Rejects selections on a finished game.
    pub fn check(session: &Session) -> Result<(), MoveError> {
        if session.status() == GameStatus::Finished {
            Err(MoveError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the opponent is not mid-request.
pub struct OpponentIdle;

impl OpponentIdle {
    /// Rejects selections while the session is thinking.
    pub fn check(session: &Session) -> Result<(), MoveError> {
        if session.status() == GameStatus::Thinking {
            Err(MoveError::OpponentThinking)
        } else {
            Ok(())
        }
    }
}

/// Precondition: a human is to move.
///
/// Against the automated opponent, a human can never place the O mark.
pub struct HumansTurn;

impl HumansTurn {
    /// Rejects selections on the automated side's turn.
    pub fn check(session: &Session) -> Result<(), MoveError> {
        if session.mode() == GameMode::VsAuto && session.turn() == AUTOMATED_MARK {
            Err(MoveError::NotYourTurn(AUTOMATED_MARK))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the square at the cell must exist and be empty.
pub struct SquareIsEmpty;

impl SquareIsEmpty {
    /// Rejects out-of-bounds and occupied cells.
    pub fn check(cell: usize, session: &Session) -> Result<(), MoveError> {
        if !session.board_size().contains(cell) {
            Err(MoveError::OutOfBounds(cell))
        } else if !session.board().is_empty(cell) {
            Err(MoveError::SquareOccupied(cell))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition for a human cell selection.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(session))]
    pub fn check(cell: usize, session: &Session) -> Result<(), MoveError> {
        GameNotOver::check(session)?;
        OpponentIdle::check(session)?;
        HumansTurn::check(session)?;
        SquareIsEmpty::check(cell, session)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for human cell selections.
///
/// Preconditions:
/// - Game not finished, opponent not thinking
/// - A human is to move
/// - Square exists and is empty
///
/// Postconditions:
/// - Every session invariant holds
pub struct MoveContract;

impl Contract<Session, usize> for MoveContract {
    fn pre(session: &Session, cell: &usize) -> Result<(), MoveError> {
        LegalMove::check(*cell, session)
    }

    fn post(_before: &Session, after: &Session) -> Result<(), MoveError> {
        check_invariants(after)
    }
}

/// Verifies the full invariant set, folding violations into one error.
pub fn check_invariants(session: &Session) -> Result<(), MoveError> {
    SessionInvariants::check_all(session).map_err(|violations| {
        let descriptions = violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
    })
}
