//! Move rejection reasons.

use crate::GameStatus;

/// Why a candidate move was refused.
///
/// Every variant is a recoverable input error. Nothing is mutated when one is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// A coordinate lies outside the board.
    #[display("Coordinates ({x}, {y}) are off the board")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },

    /// The target cell already holds a move.
    #[display("Square ({x}, {y}) is already occupied")]
    SquareOccupied {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },

    /// The game has reached a terminal status.
    #[display("Game is already over ({_0})")]
    GameFinished(GameStatus),

    /// The acting player is not the one the status designates.
    #[display("It is not your turn")]
    NotYourTurn,

    /// The comment exceeds the length limit.
    #[display("Comment is {_0} characters long, the limit is {}", crate::MAX_COMMENT_LEN)]
    CommentTooLong(usize),
}

impl MoveError {
    /// Message shown next to the offending form field.
    pub fn user_message(&self) -> String {
        match self {
            MoveError::OutOfBounds { .. } => "Invalid coordinates".to_string(),
            MoveError::SquareOccupied { .. } => "Square is not empty".to_string(),
            MoveError::GameFinished(_) => "Cannot make move on finished game".to_string(),
            other => other.to_string(),
        }
    }

    /// Name of the input field the error belongs to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            MoveError::OutOfBounds { .. } | MoveError::SquareOccupied { .. } => {
                Some("coordinates")
            }
            MoveError::CommentTooLong(_) => Some("comment"),
            MoveError::GameFinished(_) | MoveError::NotYourTurn => None,
        }
    }
}

impl std::error::Error for MoveError {}
