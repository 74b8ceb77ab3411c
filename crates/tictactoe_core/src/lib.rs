//! Tic-tac-toe board and game state engine.
//!
//! Everything here is a pure function of its inputs. A game's board is never
//! stored; it is rebuilt from the ordered move list with [`board`], and the
//! status after each move is derived with [`Game::status_after_move`].
//!
//! # Example
//!
//! ```
//! use tictactoe_core::{Game, GameStatus};
//!
//! let game = Game::new("alice", "bob");
//! let (mv, status) = game.play(&[], 0, 0).unwrap();
//! assert_eq!(status, GameStatus::SecondToMove);
//! assert_eq!((mv.x, mv.y), (0, 0));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod game;
pub mod rules;
mod types;

pub use board::{Board, board, validate_move};
pub use error::MoveError;
pub use game::Game;
pub use types::{BOARD_SIZE, GameStatus, MAX_COMMENT_LEN, Move, Mover, validate_comment};
