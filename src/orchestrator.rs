//! Opponent orchestration: one provider call per request token.
//!
//! The orchestrator turns a [`RequestToken`] into a [`ResolvedMove`] that is
//! guaranteed to name a cell that was empty on the token's board. Provider
//! failures, timeouts and nonsense answers are absorbed here and replaced by
//! a uniformly random free cell, so a thinking session always gets a move.

use crate::provider::{MoveProvider, MoveRequest};
use derive_setters::Setters;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::time::Duration;
use strictly_grid::{MoveSource, RequestToken, ResolvedMove};
use tracing::{debug, info, instrument, warn};

/// Reasoning shown when the provider named an unusable cell.
pub const CONFUSED_REASONING: &str = "I got a bit confused, so I just picked a spot!";

/// Reasoning shown when the provider failed or timed out.
pub const FUZZY_REASONING: &str = "My connection is fuzzy, so I'm playing blindly!";

/// Default cosmetic delay before the provider is asked.
pub const DEFAULT_PACING: Duration = Duration::from_millis(600);

/// Default upper bound on one provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Drives the provider for one thinking cycle at a time.
#[derive(Setters)]
#[setters(prefix = "with_")]
pub struct Orchestrator {
    #[setters(skip)]
    provider: Arc<dyn MoveProvider>,
    /// Delay before the provider is called.
    pacing: Duration,
    /// Upper bound on the provider call.
    timeout: Duration,
    #[setters(skip)]
    rng: Mutex<StdRng>,
}

impl Orchestrator {
    /// Creates an orchestrator with default pacing and timeout.
    pub fn new(provider: Arc<dyn MoveProvider>) -> Self {
        Self {
            provider,
            pacing: DEFAULT_PACING,
            timeout: DEFAULT_TIMEOUT,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Makes fallback choices reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Obtains a validated move for `token`.
    ///
    /// Never fails: an unusable answer becomes a random free cell. Returns
    /// `None` only when the token board has no free cell at all.
    #[instrument(
        skip(self, token),
        fields(
            provider = %self.provider.name(),
            generation = %token.generation(),
            difficulty = %token.difficulty(),
        )
    )]
    pub async fn resolve(&self, token: &RequestToken) -> Option<ResolvedMove> {
        let free = token.board().empty_cells();
        if free.is_empty() {
            warn!("Request token has no free cell");
            return None;
        }

        tokio::time::sleep(self.pacing).await;

        let request = MoveRequest::from(token);
        debug!("Requesting move from provider");
        let outcome = tokio::time::timeout(self.timeout, self.provider.request_move(&request)).await;

        match outcome {
            Ok(Ok(response)) => match response.cell_index().filter(|cell| free.contains(cell)) {
                Some(cell) => {
                    info!(cell, "Provider move accepted");
                    Some(ResolvedMove::new(cell, response.reasoning, MoveSource::Provider))
                }
                None => {
                    warn!(cell = response.cell, ?free, "Provider chose an unavailable cell");
                    self.fallback(&free, CONFUSED_REASONING)
                }
            },
            Ok(Err(error)) => {
                warn!(%error, "Provider failed");
                self.fallback(&free, FUZZY_REASONING)
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Provider timed out");
                self.fallback(&free, FUZZY_REASONING)
            }
        }
    }

    /// Random free cell on the token board, for when resolution itself failed.
    pub fn fallback_for(&self, token: &RequestToken) -> Option<ResolvedMove> {
        self.fallback(&token.board().empty_cells(), FUZZY_REASONING)
    }

    fn fallback(&self, free: &[usize], reasoning: &str) -> Option<ResolvedMove> {
        let cell = *free.choose(&mut *self.rng.lock())?;
        debug!(cell, "Fallback move chosen");
        Some(ResolvedMove::new(cell, reasoning, MoveSource::Fallback))
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("pacing", &self.pacing)
            .field("timeout", &self.timeout)
            .finish()
    }
}
