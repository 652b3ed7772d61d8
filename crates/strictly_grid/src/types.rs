//! Core domain types for N×N tic-tac-toe.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// The mark played by the automated opponent in [`GameMode::VsAuto`].
pub const AUTOMATED_MARK: Player = Player::O;

/// The mark that always opens a game.
pub const FIRST_MARK: Player = Player::X;

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

/// Side length of the board.
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
    strum::EnumIter,
)]
#[serde(try_from = "usize", into = "usize")]
pub enum BoardSize {
    /// Classic 3×3.
    #[default]
    Three,
    /// 4×4, four in a row.
    Four,
    /// 5×5, five in a row.
    Five,
}

impl BoardSize {
    /// Number of cells along one side.
    pub fn side(self) -> usize {
        match self {
            BoardSize::Three => 3,
            BoardSize::Four => 4,
            BoardSize::Five => 5,
        }
    }

    /// Total number of cells (side²).
    pub fn cells(self) -> usize {
        self.side() * self.side()
    }

    /// Returns true if `cell` indexes into a board of this size.
    pub fn contains(self, cell: usize) -> bool {
        cell < self.cells()
    }
}

impl From<BoardSize> for usize {
    fn from(size: BoardSize) -> Self {
        size.side()
    }
}

/// A board side length outside {3, 4, 5}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Unsupported board size {} (expected 3, 4 or 5)", _0)]
pub struct InvalidBoardSize(pub usize);

impl std::error::Error for InvalidBoardSize {}

impl TryFrom<usize> for BoardSize {
    type Error = InvalidBoardSize;

    fn try_from(side: usize) -> Result<Self, Self::Error> {
        match side {
            3 => Ok(BoardSize::Three),
            4 => Ok(BoardSize::Four),
            5 => Ok(BoardSize::Five),
            other => Err(InvalidBoardSize(other)),
        }
    }
}

impl FromStr for BoardSize {
    type Err = InvalidBoardSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let side = s.trim().parse::<usize>().map_err(|_| InvalidBoardSize(0))?;
        BoardSize::try_from(side)
    }
}

impl std::fmt::Display for BoardSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{0}x{0}", self.side())
    }
}

/// N×N board in row-major order.
///
/// Always holds exactly `size.cells()` squares; deserialization rejects
/// anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardParts")]
pub struct Board {
    size: BoardSize,
    squares: Vec<Square>,
}

#[derive(Deserialize)]
struct BoardParts {
    size: BoardSize,
    squares: Vec<Square>,
}

/// A square count that does not match the board size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("A {} board needs {} squares, found {}", size, expected, found)]
pub struct BoardShapeError {
    /// Declared board size.
    pub size: BoardSize,
    /// Squares the size requires.
    pub expected: usize,
    /// Squares actually supplied.
    pub found: usize,
}

impl std::error::Error for BoardShapeError {}

impl TryFrom<BoardParts> for Board {
    type Error = BoardShapeError;

    fn try_from(parts: BoardParts) -> Result<Self, Self::Error> {
        let expected = parts.size.cells();
        if parts.squares.len() != expected {
            return Err(BoardShapeError {
                size: parts.size,
                expected,
                found: parts.squares.len(),
            });
        }
        Ok(Self {
            size: parts.size,
            squares: parts.squares,
        })
    }
}

impl Board {
    /// Creates a new empty board.
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            squares: vec![Square::Empty; size.cells()],
        }
    }

    /// Returns the board size.
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Gets the square at the given cell index.
    pub fn get(&self, cell: usize) -> Option<Square> {
        self.squares.get(cell).copied()
    }

    /// Sets the square at the given cell index.
    pub fn set(&mut self, cell: usize, square: Square) -> Result<(), &'static str> {
        let slot = self.squares.get_mut(cell).ok_or("Position out of bounds")?;
        *slot = square;
        Ok(())
    }

    /// Checks if a square is empty. Out-of-bounds cells are never empty.
    pub fn is_empty(&self, cell: usize) -> bool {
        matches!(self.get(cell), Some(Square::Empty))
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Indices of every empty cell, ascending.
    #[instrument(skip(self), fields(size = %self.size))]
    pub fn empty_cells(&self) -> Vec<usize> {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, square)| **square == Square::Empty)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Number of occupied squares.
    pub fn occupied_count(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// True when no square is occupied.
    pub fn is_blank(&self) -> bool {
        self.occupied_count() == 0
    }

    /// True when every square is occupied.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// One-based (row, column) of a cell, as shown in the move log.
    pub fn coordinates(size: BoardSize, cell: usize) -> (usize, usize) {
        (cell / size.side() + 1, cell % size.side() + 1)
    }

    /// Formats the board as a human-readable string.
    ///
    /// Free squares show their one-based cell number so a player can type it.
    pub fn display(&self) -> String {
        let side = self.size.side();
        let width = self.size.cells().to_string().len();
        let separator = vec!["-".repeat(width); side].join("+");

        let mut result = String::new();
        for row in 0..side {
            for col in 0..side {
                let cell = row * side + col;
                let symbol = match self.squares[cell] {
                    Square::Empty => (cell + 1).to_string(),
                    Square::Occupied(player) => player.to_string(),
                };
                result.push_str(&format!("{symbol:>width$}"));
                if col + 1 < side {
                    result.push('|');
                }
            }
            if row + 1 < side {
                result.push('\n');
                result.push_str(&separator);
                result.push('\n');
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardSize::default())
    }
}

/// Who controls the O side.
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
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum GameMode {
    /// A human plays X against the automated move provider.
    #[default]
    #[serde(alias = "auto")]
    #[strum(to_string = "vs_auto", serialize = "auto")]
    VsAuto,
    /// Two humans share the board.
    #[serde(alias = "human")]
    #[strum(to_string = "vs_human", serialize = "human")]
    VsHuman,
}

/// Strength requested from the automated opponent.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Difficulty {
    /// Close to random play.
    Easy,
    /// Takes obvious wins and blocks obvious losses.
    Medium,
    /// Plays to win or force a draw.
    #[default]
    Hard,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// No moves yet.
    Idle,
    /// At least one move, no result.
    Playing,
    /// Waiting on the automated opponent.
    Thinking,
    /// Won or drawn.
    Finished,
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Player won the game.
    Winner(Player),
    /// Game ended in a draw.
    Draw,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "Player {} wins", player),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}
