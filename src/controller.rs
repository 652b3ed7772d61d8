//! Single dispatch point for player intents.
//!
//! The controller owns the [`Session`] behind a mutex, so intents arriving
//! from several places (keyboard, a finished opponent task) are applied one
//! at a time. Each thinking cycle runs as its own tokio task that resolves a
//! move through the [`Orchestrator`] and reconciles it under the same lock.

use crate::orchestrator::Orchestrator;
use parking_lot::Mutex;
use std::sync::Arc;
use strictly_grid::{
    Applied, BoardSize, Difficulty, GameMode, MoveError, RequestToken, Session, SessionEvent,
    SessionSnapshot,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

struct Shared {
    session: Mutex<Session>,
    orchestrator: Orchestrator,
    events: mpsc::UnboundedSender<SessionEvent>,
    opponent_task: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    /// Forwards queued events; a closed receiver is not an error.
    fn forward(&self, events: Vec<SessionEvent>) {
        for event in events {
            if self.events.send(event).is_err() {
                debug!("Event receiver dropped");
                return;
            }
        }
    }

    /// Applies `f` to the session under the lock, then forwards its events.
    fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let (result, events) = {
            let mut session = self.session.lock();
            let result = f(&mut session);
            (result, session.drain_events())
        };
        self.forward(events);
        result
    }

    async fn run_opponent(self: Arc<Self>, token: RequestToken) {
        let resolving = {
            let shared = Arc::clone(&self);
            let token = token.clone();
            tokio::spawn(async move { shared.orchestrator.resolve(&token).await })
        };
        let resolved = match resolving.await {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(%error, "Opponent resolution aborted, falling back");
                self.orchestrator.fallback_for(&token)
            }
        };

        self.with_session(|session| match resolved {
            Some(resolved) => match session.complete_request(&token, resolved) {
                Ok(Applied::Finished(outcome)) => info!(%outcome, "Opponent finished the game"),
                Ok(_) => debug!("Opponent move applied"),
                Err(stale) => debug!(%stale, "Opponent move discarded"),
            },
            None => {
                session.abandon_request(&token);
            }
        });
    }
}

/// Serializes intents against one session and runs the opponent.
#[derive(Clone)]
pub struct Controller {
    shared: Arc<Shared>,
}

impl Controller {
    /// Creates a controller; events are forwarded to `events`.
    #[instrument(skip_all, fields(provider = %orchestrator.provider_name()))]
    pub fn new(
        session: Session,
        orchestrator: Orchestrator,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        info!("Creating controller");
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                orchestrator,
                events,
                opponent_task: Mutex::new(None),
            }),
        }
    }

    /// Applies a human cell selection, spawning the opponent if it is now its turn.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self))]
    pub fn select_cell(&self, cell: usize) -> Result<Applied, MoveError> {
        let applied = self.shared.with_session(|session| session.apply_move(cell))?;
        if let Applied::AwaitingOpponent(token) = &applied {
            self.spawn_opponent(token.clone());
        }
        Ok(applied)
    }

    fn spawn_opponent(&self, token: RequestToken) {
        debug!(generation = %token.generation(), "Spawning opponent task");
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(shared.run_opponent(token));
        if let Some(previous) = self.shared.opponent_task.lock().replace(handle)
            && !previous.is_finished()
        {
            debug!("Previous opponent task still running with a stale generation");
        }
    }

    /// Reverts one visible turn. Returns the number of plies reverted.
    #[instrument(skip(self))]
    pub fn undo(&self) -> usize {
        let plies = self.shared.with_session(Session::undo);
        if plies == 0 {
            warn!("Nothing to undo");
        }
        plies
    }

    /// Starts a fresh game.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        self.shared.with_session(Session::reset);
    }

    /// Starts a fresh game on a board of `size`.
    #[instrument(skip(self))]
    pub fn change_board_size(&self, size: BoardSize) {
        self.shared
            .with_session(|session| session.change_board_size(size));
    }

    /// Starts a fresh game in `mode`.
    #[instrument(skip(self))]
    pub fn change_mode(&self, mode: GameMode) {
        self.shared.with_session(|session| session.change_mode(mode));
    }

    /// Changes opponent strength for future requests.
    #[instrument(skip(self))]
    pub fn change_difficulty(&self, difficulty: Difficulty) {
        self.shared
            .with_session(|session| session.change_difficulty(difficulty));
    }

    /// Current read model.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.session.lock().snapshot()
    }

    /// Waits for the in-flight opponent task, if any.
    pub async fn settle(&self) {
        let handle = self.shared.opponent_task.lock().take();
        if let Some(handle) = handle
            && let Err(error) = handle.await
        {
            warn!(%error, "Opponent task did not complete");
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("orchestrator", &self.shared.orchestrator)
            .finish_non_exhaustive()
    }
}
