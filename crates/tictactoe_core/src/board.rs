//! Board snapshots rebuilt from move history.

use tracing::{instrument, warn};

use crate::{BOARD_SIZE, Move, MoveError};

/// An N×N view of which move occupies each cell.
///
/// Cells are indexed `[y][x]`. The board borrows the moves it was built from;
/// it is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board<'a> {
    cells: [[Option<&'a Move>; BOARD_SIZE]; BOARD_SIZE],
}

impl<'a> Board<'a> {
    /// Creates a board with every cell empty.
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// True when both coordinates fall in `[0, BOARD_SIZE - 1]`.
    pub fn in_bounds(x: i32, y: i32) -> bool {
        let n = BOARD_SIZE as i32;
        (0..n).contains(&x) && (0..n).contains(&y)
    }

    /// Returns the move at `(x, y)`, or `None` for an empty or off-board cell.
    pub fn get(&self, x: i32, y: i32) -> Option<&'a Move> {
        if !Self::in_bounds(x, y) {
            return None;
        }
        self.cells[y as usize][x as usize]
    }

    /// Puts a move into its cell. Off-board moves and moves onto a taken
    /// cell are dropped; the earlier occupant stays.
    ///
    /// Returns `false` when the move could not be placed.
    pub fn place(&mut self, mv: &'a Move) -> bool {
        if !Self::in_bounds(mv.x, mv.y) {
            warn!(x = mv.x, y = mv.y, "Ignoring off-board move");
            return false;
        }
        let cell = &mut self.cells[mv.y as usize][mv.x as usize];
        if let Some(existing) = cell {
            warn!(
                x = mv.x,
                y = mv.y,
                occupant = %existing.mover,
                mover = %mv.mover,
                "Ignoring move onto occupied cell"
            );
            return false;
        }
        *cell = Some(mv);
        true
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> &[[Option<&'a Move>; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// True when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.occupied() == BOARD_SIZE * BOARD_SIZE
    }

    /// Formats the board as text, one row per line.
    pub fn render(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or('.', |mv| mv.mover.symbol()).to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Board<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Replays moves in order into a board snapshot.
#[instrument(skip(moves), fields(moves = moves.len()))]
pub fn board(moves: &[Move]) -> Board<'_> {
    let mut grid = Board::empty();
    for mv in moves {
        grid.place(mv);
    }
    grid
}

/// Checks that `(x, y)` is on the board and free.
///
/// Must be called on the board as it was before the candidate move.
///
/// # Errors
///
/// [`MoveError::OutOfBounds`] for an off-board coordinate,
/// [`MoveError::SquareOccupied`] for a taken cell.
#[instrument(skip(board))]
pub fn validate_move(board: &Board<'_>, x: i32, y: i32) -> Result<(), MoveError> {
    if !Board::in_bounds(x, y) {
        return Err(MoveError::OutOfBounds { x, y });
    }
    if board.get(x, y).is_some() {
        return Err(MoveError::SquareOccupied { x, y });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mover;

    #[test]
    fn test_board_places_moves_at_coordinates() {
        let moves = vec![Move::new(2, 0, Mover::First), Move::new(0, 1, Mover::Second)];
        let grid = board(&moves);
        assert_eq!(grid.get(2, 0), Some(&moves[0]));
        assert_eq!(grid.get(0, 1), Some(&moves[1]));
        assert_eq!(grid.rows()[1][0], Some(&moves[1]));
        assert_eq!(grid.occupied(), 2);
    }

    #[test]
    fn test_repeated_cell_keeps_first_move() {
        let moves = vec![Move::new(1, 1, Mover::First), Move::new(1, 1, Mover::Second)];
        let grid = board(&moves);
        assert_eq!(grid.get(1, 1), Some(&moves[0]));
        assert_eq!(grid.occupied(), 1);

        let mut grid = Board::empty();
        assert!(grid.place(&moves[0]));
        assert!(!grid.place(&moves[1]));
    }

    #[test]
    fn test_get_off_board_is_empty() {
        let grid = Board::empty();
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(0, 3), None);
    }

    #[test]
    fn test_render() {
        let moves = vec![Move::new(0, 0, Mover::First), Move::new(1, 1, Mover::Second)];
        assert_eq!(board(&moves).render(), "X . .\n. O .\n. . .");
    }

    #[test]
    fn test_validate_rejects_negative() {
        let grid = Board::empty();
        assert_eq!(
            validate_move(&grid, -1, 2),
            Err(MoveError::OutOfBounds { x: -1, y: 2 })
        );
    }
}
