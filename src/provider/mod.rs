//! Move providers for the automated opponent.
//!
//! A provider answers one question: given this board, where does the
//! automated mark go? It knows nothing about sessions, generations or
//! fallbacks; the orchestrator wraps every call with those concerns.

mod heuristic;
mod llm;

pub use heuristic::HeuristicProvider;
pub use llm::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, LlmConfig, LlmProvider, build_body, build_prompt,
    parse_response, temperature,
};

use derive_getters::Getters;
use derive_more::Display;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strictly_grid::{Board, BoardSize, Difficulty, Player, RequestToken, Square};
use tracing::instrument;

/// What the opponent is asked to decide.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, new)]
pub struct MoveRequest {
    /// Board to play on.
    board: Board,
    /// Mark being placed.
    mark: Player,
    /// Requested strength.
    difficulty: Difficulty,
}

impl MoveRequest {
    /// Side length of the board.
    pub fn board_size(&self) -> BoardSize {
        self.board.size()
    }

    /// Cells as `"X"`, `"O"` or `null`, row-major.
    pub fn cells(&self) -> Vec<Option<String>> {
        self.board
            .squares()
            .iter()
            .map(|square| match square {
                Square::Empty => None,
                Square::Occupied(player) => Some(player.to_string()),
            })
            .collect()
    }
}

impl From<&RequestToken> for MoveRequest {
    fn from(token: &RequestToken) -> Self {
        Self::new(token.board().clone(), token.mark(), token.difficulty())
    }
}

/// A provider's answer: `{ "move": int, "reasoning": string }`.
///
/// The index is signed so a nonsensical answer still parses and is caught by
/// validation instead of counting as a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct MoveResponse {
    /// Chosen cell index.
    #[serde(rename = "move")]
    pub cell: i64,
    /// Short explanation.
    #[serde(default)]
    pub reasoning: String,
}

impl MoveResponse {
    /// The index as a cell, if it is non-negative.
    pub fn cell_index(&self) -> Option<usize> {
        usize::try_from(self.cell).ok()
    }
}

/// Why a provider could not answer.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProviderError {
    /// The request never completed.
    #[display("Request failed: {}", _0)]
    Transport(String),

    /// The remote service answered with an error status.
    #[display("Provider returned status {}: {}", status, body)]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The answer could not be understood.
    #[display("Malformed response: {}", _0)]
    Malformed(String),

    /// No credentials were available.
    #[display("Environment variable {} is not set", _0)]
    MissingApiKey(String),

    /// The board has nowhere left to play.
    #[display("No moves available")]
    NoMoves,
}

impl std::error::Error for ProviderError {}

/// Which provider backs the automated opponent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// Local rule-based play, no network.
    #[default]
    Heuristic,
    /// Remote language model.
    Llm,
}

/// Source of opponent moves.
#[async_trait::async_trait]
pub trait MoveProvider: Send + Sync {
    /// Chooses a cell for `request.mark()`.
    ///
    /// May suspend for an arbitrary duration and may fail.
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse, ProviderError>;

    /// Returns the provider's display name.
    fn name(&self) -> &str;
}

/// Cells that complete a line for `player` with a single placement.
#[instrument(skip(board), fields(size = %board.size()))]
pub fn finishing_cells(board: &Board, player: Player) -> Vec<usize> {
    let mut cells = Vec::new();
    for line in strictly_grid::rules::lines(board.size()) {
        let mut empty = None;
        let mut own = 0;
        for &cell in &line {
            match board.get(cell) {
                Some(Square::Occupied(p)) if p == player => own += 1,
                Some(Square::Empty) => empty = Some(cell),
                _ => {}
            }
        }
        if let Some(cell) = empty
            && own == line.len() - 1
            && !cells.contains(&cell)
        {
            cells.push(cell);
        }
    }
    cells
}
