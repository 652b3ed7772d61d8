//! Undo history: board snapshots plus the parallel move log.

use super::action::Move;
use super::{AUTOMATED_MARK, Board, GameMode, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Stack of prior boards and the structured log of the plies that left them.
///
/// `snapshots[i]` is the board as it was right before `log[i]` was applied,
/// so both always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    snapshots: Vec<Board>,
    log: Vec<Move>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the board as it was before `entry` was applied.
    #[instrument(skip(self, board), fields(player = %entry.player, cell = entry.cell))]
    pub fn record(&mut self, board: Board, entry: Move) {
        self.snapshots.push(board);
        self.log.push(entry);
        debug!(len = self.log.len(), "Recorded ply");
    }

    /// Pops up to `steps` plies and returns the board before the oldest one popped.
    ///
    /// The request is clamped to the available history; `None` means nothing
    /// was popped.
    #[instrument(skip(self), fields(len = self.snapshots.len()))]
    pub fn undo(&mut self, steps: usize) -> Option<Board> {
        let steps = steps.min(self.snapshots.len());
        if steps == 0 {
            debug!("Nothing to undo");
            return None;
        }

        let keep = self.snapshots.len() - steps;
        let restored = self.snapshots.drain(keep..).next();
        self.log.truncate(keep);

        if self.snapshots.len() != self.log.len() {
            warn!(
                snapshots = self.snapshots.len(),
                log = self.log.len(),
                "History and move log diverged"
            );
        }

        restored
    }

    /// Number of recorded plies.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// True when no ply has been recorded.
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// The move log, oldest first.
    pub fn log(&self) -> &[Move] {
        &self.log
    }

    /// The board snapshots, oldest first.
    pub fn snapshots(&self) -> &[Board] {
        &self.snapshots
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.log.clear();
    }
}

/// How many plies one undo request reverts.
///
/// Against the automated opponent one visible turn is up to two plies: when
/// the human is to move, the opponent replied last and both plies go; when
/// the opponent is to move, only the human's ply goes. Between humans every
/// undo is a single ply.
#[instrument]
pub fn steps_to_undo(mode: GameMode, turn: Player) -> usize {
    match mode {
        GameMode::VsHuman => 1,
        GameMode::VsAuto if turn == AUTOMATED_MARK => 1,
        GameMode::VsAuto => 2,
    }
}
