//! A result exists exactly when the game is finished.

use super::Invariant;
use crate::{GameStatus, Session};

/// Invariant: `outcome != None ⇔ status == Finished`.
pub struct OutcomeStatusInvariant;

impl Invariant<Session> for OutcomeStatusInvariant {
    fn holds(session: &Session) -> bool {
        session.outcome().is_some() == (session.status() == GameStatus::Finished)
    }

    fn description() -> &'static str {
        "Outcome is set if and only if the game is finished"
    }
}
