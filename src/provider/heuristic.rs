//! Local rule-based opponent.

use super::{MoveProvider, MoveRequest, MoveResponse, ProviderError, finishing_cells};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use strictly_grid::{Board, Difficulty};
use tracing::{debug, instrument};

/// Opponent that plays by a few fixed rules, scaled by difficulty.
///
/// - Easy: any free cell.
/// - Medium: win if possible, else block, else any free cell.
/// - Hard: win, block, centre on odd boards, a free corner, any free cell.
pub struct HeuristicProvider {
    name: String,
    rng: Mutex<StdRng>,
}

impl HeuristicProvider {
    /// Creates a provider; a seed makes its random choices reproducible.
    #[instrument]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            name: "Heuristic".to_string(),
            rng: Mutex::new(rng),
        }
    }

    fn random(&self, free: &[usize]) -> Option<usize> {
        free.choose(&mut *self.rng.lock()).copied()
    }

    fn pick(&self, request: &MoveRequest) -> Option<(usize, &'static str)> {
        let board = request.board();
        let mark = *request.mark();
        let free = board.empty_cells();
        let rules = *request.difficulty() != Difficulty::Easy;

        if rules {
            if let Some(&cell) = finishing_cells(board, mark).first() {
                return Some((cell, "That completes my line."));
            }
            if let Some(&cell) = finishing_cells(board, mark.opponent()).first() {
                return Some((cell, "Not so fast, I'm blocking that."));
            }
        }

        if *request.difficulty() == Difficulty::Hard {
            if let Some(cell) = centre(board) {
                return Some((cell, "The centre is the strongest square."));
            }
            let corners: Vec<usize> = corners(board)
                .into_iter()
                .filter(|&cell| board.is_empty(cell))
                .collect();
            if let Some(cell) = self.random(&corners) {
                return Some((cell, "Corners keep my options open."));
            }
        }

        let reasoning = match request.difficulty() {
            Difficulty::Easy => "This one just feels lucky.",
            _ => "Nothing urgent, so I'll build here.",
        };
        self.random(&free).map(|cell| (cell, reasoning))
    }
}

/// The free centre cell of an odd-sided board.
fn centre(board: &Board) -> Option<usize> {
    let side = board.size().side();
    if side % 2 == 0 {
        return None;
    }
    let cell = (side / 2) * side + side / 2;
    board.is_empty(cell).then_some(cell)
}

fn corners(board: &Board) -> [usize; 4] {
    let side = board.size().side();
    [0, side - 1, side * (side - 1), side * side - 1]
}

#[async_trait::async_trait]
impl MoveProvider for HeuristicProvider {
    #[instrument(skip(self, request), fields(mark = %request.mark(), difficulty = %request.difficulty()))]
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        let (cell, reasoning) = self.pick(request).ok_or(ProviderError::NoMoves)?;
        debug!(cell, "Heuristic chose cell");
        Ok(MoveResponse::new(cell as i64, reasoning.to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_grid::{BoardSize, Player, Square};

    fn board(size: BoardSize, xs: &[usize], os: &[usize]) -> Board {
        let mut board = Board::new(size);
        for &cell in xs {
            board.set(cell, Square::Occupied(Player::X)).unwrap();
        }
        for &cell in os {
            board.set(cell, Square::Occupied(Player::O)).unwrap();
        }
        board
    }

    async fn choose(board: Board, difficulty: Difficulty) -> i64 {
        let provider = HeuristicProvider::new(Some(7));
        let request = MoveRequest::new(board, Player::O, difficulty);
        provider.request_move(&request).await.unwrap().cell
    }

    #[tokio::test]
    async fn test_medium_takes_win_over_block() {
        let board = board(BoardSize::Three, &[0, 1, 8], &[3, 4]);
        assert_eq!(choose(board, Difficulty::Medium).await, 5);
    }

    #[tokio::test]
    async fn test_medium_blocks() {
        let board = board(BoardSize::Four, &[0, 5, 10], &[1, 2]);
        assert_eq!(choose(board, Difficulty::Medium).await, 15);
    }

    #[tokio::test]
    async fn test_hard_prefers_centre_on_odd_board() {
        let board = board(BoardSize::Five, &[0], &[]);
        assert_eq!(choose(board, Difficulty::Hard).await, 12);
    }

    #[tokio::test]
    async fn test_hard_takes_corner_on_even_board() {
        let board = board(BoardSize::Four, &[5], &[]);
        let cell = choose(board, Difficulty::Hard).await;
        assert!([0, 3, 12, 15].contains(&cell));
    }

    #[tokio::test]
    async fn test_easy_picks_free_cell() {
        let board = board(BoardSize::Three, &[0, 2, 4], &[1, 3]);
        let cell = choose(board.clone(), Difficulty::Easy).await;
        assert!(board.is_empty(cell as usize));
    }

    #[tokio::test]
    async fn test_full_board_has_no_move() {
        let board = board(BoardSize::Three, &[0, 2, 3, 7, 8], &[1, 4, 5, 6]);
        let provider = HeuristicProvider::new(None);
        let request = MoveRequest::new(board, Player::O, Difficulty::Hard);
        assert_eq!(
            provider.request_move(&request).await,
            Err(ProviderError::NoMoves)
        );
    }
}
