//! Win detection.

use crate::{BOARD_SIZE, Board, Mover};
use tracing::instrument;

/// The eight `(x, y)` triples that win: three rows, three columns, two diagonals.
pub const LINES: [[(i32, i32); BOARD_SIZE]; 8] = [
    // Rows
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Columns
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(2, 0), (1, 1), (0, 2)],
];

/// Returns the side holding a complete line, if any.
///
/// A line counts only when all three cells are occupied by the same mover;
/// empty cells never match each other.
#[instrument(skip(board))]
pub fn winner(board: &Board<'_>) -> Option<Mover> {
    LINES.iter().find_map(|line| {
        let mut movers = line.iter().map(|&(x, y)| board.get(x, y).map(|mv| mv.mover));
        let first = movers.next()??;
        movers.all(|m| m == Some(first)).then_some(first)
    })
}
