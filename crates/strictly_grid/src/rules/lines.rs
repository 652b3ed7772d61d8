//! Line generation for any supported board size.

use crate::BoardSize;
use tracing::instrument;

/// N cell indices that win when uniformly marked.
pub type Line = Vec<usize>;

/// Generates the 2N+2 winning lines in scan order.
///
/// Rows first (`r·N .. r·N+N-1`), then columns (`c, c+N, ...`), then the
/// main diagonal (`i·N+i`) and the anti-diagonal (`i·N+(N-1-i)`).
#[instrument]
pub fn lines(size: BoardSize) -> Vec<Line> {
    let n = size.side();
    let mut lines = Vec::with_capacity(2 * n + 2);

    for row in 0..n {
        lines.push((0..n).map(|col| row * n + col).collect());
    }
    for col in 0..n {
        lines.push((0..n).map(|row| col + row * n).collect());
    }
    lines.push((0..n).map(|i| i * n + i).collect());
    lines.push((0..n).map(|i| i * n + (n - 1 - i)).collect());

    lines
}
