//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::MoveError;

/// Side length of the board.
pub const BOARD_SIZE: usize = 3;

/// Longest comment (in characters) a move may carry.
pub const MAX_COMMENT_LEN: usize = 300;

/// Which side made a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Mover {
    /// The first player (plays X, moves first).
    #[display("first")]
    First,
    /// The second player (plays O).
    #[display("second")]
    Second,
}

impl Mover {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Mover::First => Mover::Second,
            Mover::Second => Mover::First,
        }
    }

    /// Maps the stored `by_first_player` flag to a mover.
    pub fn from_first_flag(by_first_player: bool) -> Self {
        if by_first_player {
            Mover::First
        } else {
            Mover::Second
        }
    }

    /// True for [`Mover::First`].
    pub fn is_first(self) -> bool {
        self == Mover::First
    }

    /// Board symbol: `X` for the first player, `O` for the second.
    pub fn symbol(self) -> char {
        match self {
            Mover::First => 'X',
            Mover::Second => 'O',
        }
    }

    /// The status in which this side is to move.
    pub fn to_move(self) -> GameStatus {
        match self {
            Mover::First => GameStatus::FirstToMove,
            Mover::Second => GameStatus::SecondToMove,
        }
    }

    /// The terminal status in which this side has won.
    pub fn wins(self) -> GameStatus {
        match self {
            Mover::First => GameStatus::FirstWins,
            Mover::Second => GameStatus::SecondWins,
        }
    }
}

/// Phase of a game.
///
/// The short codes (`F`, `S`, `W`, `L`, `D`) are the stored representation and
/// round-trip through [`GameStatus::code`] and [`std::str::FromStr`].
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
    derive_more::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Waiting on the first player.
    #[default]
    #[display("First Player To Move")]
    #[strum(serialize = "F")]
    FirstToMove,
    /// Waiting on the second player.
    #[display("Second Player To Move")]
    #[strum(serialize = "S")]
    SecondToMove,
    /// The first player completed a line.
    #[display("First Player Wins")]
    #[strum(serialize = "W")]
    FirstWins,
    /// The second player completed a line.
    #[display("Second Player Wins")]
    #[strum(serialize = "L")]
    SecondWins,
    /// The board filled up with no line completed.
    #[display("Draw")]
    #[strum(serialize = "D")]
    Draw,
}

impl GameStatus {
    /// Single-letter storage code.
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// True while a move can still be made.
    pub fn is_active(self) -> bool {
        matches!(self, GameStatus::FirstToMove | GameStatus::SecondToMove)
    }

    /// True for the win and draw states.
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// The side whose turn it is, if the game is still running.
    pub fn mover(self) -> Option<Mover> {
        match self {
            GameStatus::FirstToMove => Some(Mover::First),
            GameStatus::SecondToMove => Some(Mover::Second),
            _ => None,
        }
    }
}

/// A single placed mark.
///
/// Coordinates are signed so that out-of-range input survives long enough to
/// be rejected by [`crate::validate_move`] instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Column, 0-based from the left.
    pub x: i32,
    /// Row, 0-based from the top.
    pub y: i32,
    /// The side that made the move.
    pub mover: Mover,
    /// Free text attached by the player. May be empty.
    #[serde(default)]
    pub comment: String,
}

impl Move {
    /// Creates a move with no comment.
    pub fn new(x: i32, y: i32, mover: Mover) -> Self {
        Self {
            x,
            y,
            mover,
            comment: String::new(),
        }
    }

    /// Attaches a comment.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::CommentTooLong`] past [`MAX_COMMENT_LEN`] characters.
    #[instrument(skip(self, comment))]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Result<Self, MoveError> {
        let comment = comment.into();
        validate_comment(&comment)?;
        self.comment = comment;
        Ok(self)
    }
}

/// Checks a comment against [`MAX_COMMENT_LEN`].
///
/// # Errors
///
/// Returns [`MoveError::CommentTooLong`] with the comment's length in characters.
pub fn validate_comment(comment: &str) -> Result<(), MoveError> {
    let len = comment.chars().count();
    if len > MAX_COMMENT_LEN {
        return Err(MoveError::CommentTooLong(len));
    }
    Ok(())
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at ({}, {})", self.mover.symbol(), self.x, self.y)
    }
}
