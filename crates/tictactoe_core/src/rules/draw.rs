//! Draw detection.

use crate::Board;
use tracing::instrument;

/// Checks if every cell is occupied.
///
/// A full board with no winner is a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board<'_>) -> bool {
    board.is_full()
}

#[cfg(test)]
mod tests {
    use super::super::win::winner;
    use super::*;
    use crate::{Move, Mover, board};

    fn is_draw(board: &Board<'_>) -> bool {
        is_full(board) && winner(board).is_none()
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::empty()));
    }

    #[test]
    fn test_partial_board_not_full() {
        let moves = vec![Move::new(1, 1, Mover::First)];
        assert!(!is_full(&board(&moves)));
    }

    #[test]
    fn test_draw_detection() {
        // X O X / O X X / O X O
        let moves = vec![
            Move::new(0, 0, Mover::First),
            Move::new(1, 0, Mover::Second),
            Move::new(2, 0, Mover::First),
            Move::new(0, 1, Mover::Second),
            Move::new(1, 1, Mover::First),
            Move::new(0, 2, Mover::Second),
            Move::new(2, 1, Mover::First),
            Move::new(2, 2, Mover::Second),
            Move::new(1, 2, Mover::First),
        ];
        assert!(is_draw(&board(&moves)));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let mut moves: Vec<_> = (0..3).map(|x| Move::new(x, 0, Mover::First)).collect();
        moves.extend((0..3).map(|x| Move::new(x, 1, Mover::Second)));
        moves.extend([
            Move::new(0, 2, Mover::First),
            Move::new(1, 2, Mover::Second),
            Move::new(2, 2, Mover::First),
        ]);
        let grid = board(&moves);
        assert!(is_full(&grid));
        assert!(!is_draw(&grid));
    }
}
