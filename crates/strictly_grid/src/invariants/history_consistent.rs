//! History consistency invariant: snapshots, log and board agree.

use super::Invariant;
use crate::Session;

/// Invariant: one snapshot per logged ply, and one occupied square per ply.
///
/// Every move in the log corresponds to exactly one occupied square. No
/// moves are missing, no squares are filled without a move.
pub struct HistoryConsistentInvariant;

impl Invariant<Session> for HistoryConsistentInvariant {
    fn holds(session: &Session) -> bool {
        let history = session.history();

        history.snapshots().len() == history.log().len()
            && history.log().len() == session.board().occupied_count()
    }

    fn description() -> &'static str {
        "History length matches the move log and the number of occupied squares"
    }
}
