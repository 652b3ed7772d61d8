//! Session state machine.
//!
//! A [`Session`] is the single mutable aggregate for one game instance. Every
//! intent (cell selection, opponent reply, undo, reset, size or mode change)
//! goes through exactly one transition method here, and each transition runs
//! to completion before the next one starts.
//!
//! ```text
//!            apply_move              apply_move (VsAuto, O to move)
//!   Idle ───────────────▶ Playing ─────────────────────────────▶ Thinking
//!     ▲                     │  ▲                                   │
//!     │ reset/undo          │  └──────── complete_request ─────────┤
//!     │                     ▼                                      ▼
//!     └──────────────── Finished ◀──────── complete_request ───────┘
//! ```
//!
//! Opponent requests are stamped with the session [`Generation`]. Reset, size
//! and mode changes bump it, so a reply that arrives after the game moved on
//! is discarded instead of landing on the new board.

use super::action::{Move, MoveError, StaleResponse};
use super::contracts::{Contract, MoveContract};
use super::history::{History, steps_to_undo};
use super::rules::{Line, evaluate};
use super::{
    AUTOMATED_MARK, Board, BoardSize, Difficulty, FIRST_MARK, GameMode, GameStatus, Outcome,
    Player, Square,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Monotonic counter identifying one game instance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct Generation(u64);

impl Generation {
    /// The generation that follows this one.
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    /// Raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Snapshot of what the opponent was asked, captured when thinking began.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
    board: Board,
    generation: Generation,
    mark: Player,
    difficulty: Difficulty,
}

impl RequestToken {
    /// Board as it was when the request was issued.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Board size of the request.
    pub fn board_size(&self) -> BoardSize {
        self.board.size()
    }

    /// Session generation the request belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Mark the opponent plays.
    pub fn mark(&self) -> Player {
        self.mark
    }

    /// Difficulty in force when the request was issued.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

/// Where an opponent move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MoveSource {
    /// Chosen by the move provider and validated.
    Provider,
    /// Substituted after a provider failure or an invalid choice.
    Fallback,
}

/// A validated opponent move, ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMove {
    /// Cell to play.
    pub cell: usize,
    /// Explanation shown to the player.
    pub reasoning: String,
    /// Provider choice or fallback.
    pub source: MoveSource,
}

impl ResolvedMove {
    /// Creates a resolved move.
    pub fn new(cell: usize, reasoning: impl Into<String>, source: MoveSource) -> Self {
        Self {
            cell,
            reasoning: reasoning.into(),
            source,
        }
    }
}

/// What happened after a ply was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Next player may move.
    Continue,
    /// The automated side must now be asked for a move.
    AwaitingOpponent(RequestToken),
    /// The ply ended the game.
    Finished(Outcome),
}

/// Outbound notifications for presentation collaborators.
///
/// Transitions queue these; the host drains them with
/// [`Session::drain_events`] and delivers them without blocking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A mark was placed.
    MoveApplied {
        /// Who played.
        player: Player,
        /// Where.
        cell: usize,
    },
    /// The game was won or drawn.
    GameFinished {
        /// Winner or draw.
        outcome: Outcome,
        /// Completed line for a win.
        line: Option<Line>,
    },
    /// The opponent request started.
    ThinkingStarted,
    /// The opponent request ended (reply applied, abandoned, or session reset).
    ThinkingEnded,
    /// The opponent explained its move.
    ReasoningAvailable(String),
    /// A fresh game instance started.
    SessionReset {
        /// The new generation.
        generation: Generation,
    },
    /// Plies were reverted.
    UndoApplied {
        /// Number of plies removed.
        plies: usize,
    },
}

/// Serializable read model of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current board.
    pub board: Board,
    /// Lifecycle state.
    pub status: GameStatus,
    /// Player to move (frozen on the human once finished against the opponent).
    pub turn: Player,
    /// Winner or draw.
    pub outcome: Option<Outcome>,
    /// Completed line for a win.
    pub winning_line: Option<Line>,
    /// Side length.
    pub board_size: BoardSize,
    /// Opponent kind.
    pub mode: GameMode,
    /// Requested opponent strength.
    pub difficulty: Difficulty,
    /// Move log, oldest first.
    pub moves: Vec<Move>,
    /// Latest opponent explanation.
    pub reasoning: Option<String>,
    /// Game instance counter.
    pub generation: Generation,
    /// Whether undo would do anything.
    pub can_undo: bool,
}

/// One game instance and all of its mutable state.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) board: Board,
    pub(crate) status: GameStatus,
    pub(crate) turn: Player,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) winning_line: Option<Line>,
    pub(crate) mode: GameMode,
    pub(crate) difficulty: Difficulty,
    pub(crate) history: History,
    pub(crate) generation: Generation,
    pub(crate) pending: Option<RequestToken>,
    pub(crate) reasoning: Option<String>,
    pub(crate) turn_handed_back: bool,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Creates a new idle session; X moves first.
    #[instrument]
    pub fn new(size: BoardSize, mode: GameMode, difficulty: Difficulty) -> Self {
        info!("Creating new game session");
        Self {
            board: Board::new(size),
            status: GameStatus::Idle,
            turn: FIRST_MARK,
            outcome: None,
            winning_line: None,
            mode,
            difficulty,
            history: History::new(),
            generation: Generation::default(),
            pending: None,
            reasoning: None,
            turn_handed_back: false,
            events: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────
    //  Accessors
    // ─────────────────────────────────────────────────────────

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side length of the board.
    pub fn board_size(&self) -> BoardSize {
        self.board.size()
    }

    /// Lifecycle state.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Player to move.
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Winner or draw, once finished.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Completed line for a win.
    pub fn winning_line(&self) -> Option<&Line> {
        self.winning_line.as_ref()
    }

    /// Opponent kind.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Requested opponent strength.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Undo history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Move log, oldest first.
    pub fn move_log(&self) -> &[Move] {
        self.history.log()
    }

    /// Game instance counter.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Outstanding opponent request, if thinking.
    pub fn pending_request(&self) -> Option<&RequestToken> {
        self.pending.as_ref()
    }

    /// Latest opponent explanation.
    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref()
    }

    /// True when undo would revert something.
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty() && self.status != GameStatus::Thinking
    }

    /// Takes every queued notification.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read model for presentation.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board.clone(),
            status: self.status,
            turn: self.turn,
            outcome: self.outcome,
            winning_line: self.winning_line.clone(),
            board_size: self.board.size(),
            mode: self.mode,
            difficulty: self.difficulty,
            moves: self.history.log().to_vec(),
            reasoning: self.reasoning.clone(),
            generation: self.generation,
            can_undo: self.can_undo(),
        }
    }

    // ─────────────────────────────────────────────────────────
    //  Transitions
    // ─────────────────────────────────────────────────────────

    /// Applies a human cell selection.
    ///
    /// Rejected selections leave the session untouched. On acceptance the
    /// ply is recorded, the board re-evaluated, and either the game finishes,
    /// the turn passes, or (against the automated opponent) thinking begins
    /// and the returned token must be handed to the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveError`] describing why the selection was rejected.
    #[instrument(skip(self), fields(generation = %self.generation, turn = %self.turn))]
    pub fn apply_move(&mut self, cell: usize) -> Result<Applied, MoveError> {
        if let Err(error) = MoveContract::pre(self, &cell) {
            debug!(%error, "Rejected cell selection");
            return Err(error);
        }

        #[cfg(debug_assertions)]
        let before = self.clone();

        let applied = self.place(cell, None)?;

        #[cfg(debug_assertions)]
        if let Err(error) = MoveContract::post(&before, self) {
            warn!(%error, "Postcondition failed after move");
        }

        Ok(applied)
    }

    /// Reconciles an opponent reply against the current session and applies it.
    ///
    /// The reply is discarded when the session has moved on: a different
    /// generation, no longer thinking on this token, or the cell got filled.
    ///
    /// # Errors
    ///
    /// Returns the [`StaleResponse`] reason when the reply was discarded.
    #[instrument(
        skip(self, token, resolved),
        fields(
            generation = %self.generation,
            token_generation = %token.generation,
            cell = resolved.cell,
            source = %resolved.source,
        )
    )]
    pub fn complete_request(
        &mut self,
        token: &RequestToken,
        resolved: ResolvedMove,
    ) -> Result<Applied, StaleResponse> {
        if token.generation != self.generation {
            debug!("Discarding reply from an earlier game");
            return Err(StaleResponse::GenerationChanged);
        }

        if self.status != GameStatus::Thinking || self.pending.as_ref() != Some(token) {
            warn!(status = %self.status, "Discarding reply with no matching request");
            return Err(StaleResponse::NotThinking);
        }

        if !self.board.is_empty(resolved.cell) {
            warn!("Discarding reply for a filled cell, handing the turn back");
            self.hand_turn_back();
            return Err(StaleResponse::CellTaken(resolved.cell));
        }

        self.pending = None;
        self.events.push(SessionEvent::ThinkingEnded);

        let applied = self
            .place(resolved.cell, Some(resolved.reasoning))
            .map_err(|_| StaleResponse::CellTaken(resolved.cell))?;

        #[cfg(debug_assertions)]
        if let Err(error) = super::contracts::check_invariants(self) {
            warn!(%error, "Invariant check failed after opponent move");
        }

        Ok(applied)
    }

    /// Ends thinking without a move and hands the turn back to the human.
    ///
    /// Used only when no move at all could be produced for the token. Returns
    /// false if the token is stale.
    #[instrument(skip(self, token), fields(generation = %self.generation))]
    pub fn abandon_request(&mut self, token: &RequestToken) -> bool {
        if token.generation != self.generation || self.pending.as_ref() != Some(token) {
            debug!("Ignoring abandon for a stale request");
            return false;
        }

        warn!("Opponent produced no move, handing the turn back");
        self.hand_turn_back();
        true
    }

    /// Reverts one visible turn.
    ///
    /// Against the automated opponent this may be two plies (see
    /// [`steps_to_undo`]). Disallowed while thinking. Returns the number of
    /// plies reverted; zero means nothing changed.
    #[instrument(skip(self), fields(generation = %self.generation, turn = %self.turn, mode = %self.mode))]
    pub fn undo(&mut self) -> usize {
        if self.status == GameStatus::Thinking {
            debug!("Undo ignored while opponent is thinking");
            return 0;
        }

        let before = self.history.len();
        let steps = steps_to_undo(self.mode, self.turn);
        let Some(restored) = self.history.undo(steps) else {
            return 0;
        };
        let plies = before - self.history.len();

        self.board = restored;
        self.turn = if self.board.occupied_count() % 2 == 0 {
            Player::X
        } else {
            Player::O
        };
        self.outcome = None;
        self.winning_line = None;
        self.reasoning = None;
        if self.history.is_empty() {
            self.turn_handed_back = false;
        }
        self.status = if self.board.is_blank() {
            GameStatus::Idle
        } else {
            GameStatus::Playing
        };

        info!(plies, remaining = self.history.len(), "Undo applied");
        self.events.push(SessionEvent::UndoApplied { plies });
        plies
    }

    /// Starts a fresh game with the same size and mode.
    ///
    /// Safe while thinking: the outstanding request becomes stale.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub fn reset(&mut self) {
        self.reinitialize(self.board.size(), self.mode);
    }

    /// Starts a fresh game on a board of a different size.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub fn change_board_size(&mut self, size: BoardSize) {
        self.reinitialize(size, self.mode);
    }

    /// Starts a fresh game in a different mode.
    #[instrument(skip(self), fields(generation = %self.generation))]
    pub fn change_mode(&mut self, mode: GameMode) {
        self.reinitialize(self.board.size(), mode);
    }

    /// Changes opponent strength for future requests; the game continues.
    #[instrument(skip(self))]
    pub fn change_difficulty(&mut self, difficulty: Difficulty) {
        debug!(from = %self.difficulty, to = %difficulty, "Difficulty changed");
        self.difficulty = difficulty;
    }

    // ─────────────────────────────────────────────────────────
    //  Internals
    // ─────────────────────────────────────────────────────────

    /// Shared placement path for human and opponent plies.
    fn place(&mut self, cell: usize, reasoning: Option<String>) -> Result<Applied, MoveError> {
        let player = self.turn;
        let snapshot = self.board.clone();
        self.board
            .set(cell, Square::Occupied(player))
            .map_err(|_| MoveError::OutOfBounds(cell))?;
        self.history
            .record(snapshot, Move::new(player, cell, reasoning.clone()));

        debug!(%player, cell, "Ply applied");
        self.events.push(SessionEvent::MoveApplied { player, cell });
        self.reasoning = reasoning;
        if let Some(text) = &self.reasoning {
            self.events.push(SessionEvent::ReasoningAvailable(text.clone()));
        }

        let evaluation = evaluate(&self.board);
        if let Some(outcome) = evaluation.outcome {
            info!(%outcome, line = ?evaluation.line, "Game finished");
            self.status = GameStatus::Finished;
            // An opponent ply always hands the turn back, even when it ends the game.
            if self.mode == GameMode::VsAuto && player == AUTOMATED_MARK {
                self.turn = player.opponent();
            }
            self.outcome = Some(outcome);
            self.winning_line = evaluation.line.clone();
            self.events.push(SessionEvent::GameFinished {
                outcome,
                line: evaluation.line,
            });
            return Ok(Applied::Finished(outcome));
        }

        self.turn = player.opponent();
        if self.mode == GameMode::VsAuto && self.turn == AUTOMATED_MARK {
            return Ok(Applied::AwaitingOpponent(self.begin_thinking()));
        }

        self.status = GameStatus::Playing;
        Ok(Applied::Continue)
    }

    fn hand_turn_back(&mut self) {
        self.pending = None;
        self.turn = AUTOMATED_MARK.opponent();
        self.turn_handed_back = true;
        self.status = if self.board.is_blank() {
            GameStatus::Idle
        } else {
            GameStatus::Playing
        };
        self.events.push(SessionEvent::ThinkingEnded);
    }

    fn begin_thinking(&mut self) -> RequestToken {
        let token = RequestToken {
            board: self.board.clone(),
            generation: self.generation,
            mark: AUTOMATED_MARK,
            difficulty: self.difficulty,
        };
        debug!(generation = %token.generation, "Opponent request issued");
        self.status = GameStatus::Thinking;
        self.pending = Some(token.clone());
        self.events.push(SessionEvent::ThinkingStarted);
        token
    }

    fn reinitialize(&mut self, size: BoardSize, mode: GameMode) {
        let was_thinking = self.status == GameStatus::Thinking;

        self.generation = self.generation.next();
        self.board = Board::new(size);
        self.status = GameStatus::Idle;
        self.turn = FIRST_MARK;
        self.outcome = None;
        self.winning_line = None;
        self.mode = mode;
        self.history.clear();
        self.pending = None;
        self.reasoning = None;
        self.turn_handed_back = false;

        info!(generation = %self.generation, %size, %mode, "Session reset");
        if was_thinking {
            self.events.push(SessionEvent::ThinkingEnded);
        }
        self.events.push(SessionEvent::SessionReset {
            generation: self.generation,
        });
    }
}
