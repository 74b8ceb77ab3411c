//! Turn order and status transitions.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::rules::winner;
use crate::{
    BOARD_SIZE, GameStatus, Move, MoveError, Mover, board, validate_comment, validate_move,
};

/// Two players and the phase their game is in.
///
/// `P` is whatever identifies a player to the caller (a user id, a name).
/// The status only ever changes by applying a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game<P> {
    first_player: P,
    second_player: P,
    status: GameStatus,
}

impl<P: PartialEq> Game<P> {
    /// Starts a game with the first player to move.
    pub fn new(first_player: P, second_player: P) -> Self {
        Self::with_status(first_player, second_player, GameStatus::FirstToMove)
    }

    /// Restores a game at a known status.
    pub fn with_status(first_player: P, second_player: P, status: GameStatus) -> Self {
        Self {
            first_player,
            second_player,
            status,
        }
    }

    /// The player who moves first.
    pub fn first_player(&self) -> &P {
        &self.first_player
    }

    /// The player who moves second.
    pub fn second_player(&self) -> &P {
        &self.second_player
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The player whose turn it is, if the game is still running.
    pub fn player_to_move(&self) -> Option<&P> {
        self.status.mover().map(|mover| self.player(mover))
    }

    /// The player on the given side.
    pub fn player(&self, mover: Mover) -> &P {
        match mover {
            Mover::First => &self.first_player,
            Mover::Second => &self.second_player,
        }
    }

    /// Which side `player` is on, if they are in this game.
    pub fn side_of(&self, player: &P) -> Option<Mover> {
        if *player == self.first_player {
            Some(Mover::First)
        } else if *player == self.second_player {
            Some(Mover::Second)
        } else {
            None
        }
    }

    /// True iff the status designates `player` as the one to move.
    ///
    /// Always false on a finished game or for a stranger.
    pub fn is_players_turn(&self, player: &P) -> bool {
        match self.status {
            GameStatus::FirstToMove => *player == self.first_player,
            GameStatus::SecondToMove => *player == self.second_player,
            _ => false,
        }
    }

    /// Prepares the next move at `(x, y)` for whoever is to move.
    ///
    /// Does not look at the board; run [`validate_move`] first.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameFinished`] unless the status is a to-move state.
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn new_move(&self, x: i32, y: i32) -> Result<Move, MoveError> {
        let mover = self
            .status
            .mover()
            .ok_or(MoveError::GameFinished(self.status))?;
        Ok(Move::new(x, y, mover))
    }

    /// Status once `mv` is added after `history`.
    ///
    /// A completed line wins for its owner. Otherwise the game is drawn when
    /// the move count reaches N², or passes to the other side.
    #[instrument(skip(self, history, mv), fields(moves = history.len(), mv = %mv))]
    pub fn status_after_move(&self, history: &[Move], mv: &Move) -> GameStatus {
        let mut grid = board(history);
        grid.place(mv);

        let status = if let Some(side) = winner(&grid) {
            side.wins()
        } else if history.len() + 1 >= BOARD_SIZE * BOARD_SIZE {
            GameStatus::Draw
        } else {
            match self.status {
                GameStatus::FirstToMove => GameStatus::SecondToMove,
                GameStatus::SecondToMove => GameStatus::FirstToMove,
                terminal => terminal,
            }
        };

        debug!(%status, "Computed status after move");
        status
    }

    /// Validates and builds a move, then derives the status it leads to.
    ///
    /// Validation runs against the board as it stood before the move. On
    /// error nothing has been computed that needs undoing.
    ///
    /// # Errors
    ///
    /// Any of [`MoveError::GameFinished`], [`MoveError::OutOfBounds`] or
    /// [`MoveError::SquareOccupied`].
    #[instrument(skip(self, history), fields(status = %self.status, moves = history.len()))]
    pub fn play(&self, history: &[Move], x: i32, y: i32) -> Result<(Move, GameStatus), MoveError> {
        if self.status.is_terminal() {
            return Err(MoveError::GameFinished(self.status));
        }
        validate_move(&board(history), x, y)?;
        let mv = self.new_move(x, y)?;
        let status = self.status_after_move(history, &mv);
        Ok((mv, status))
    }

    /// Like [`Game::play`], with a comment attached to the move.
    ///
    /// # Errors
    ///
    /// As [`Game::play`], plus [`MoveError::CommentTooLong`], which is checked
    /// first.
    pub fn play_with_comment(
        &self,
        history: &[Move],
        x: i32,
        y: i32,
        comment: &str,
    ) -> Result<(Move, GameStatus), MoveError> {
        validate_comment(comment)?;
        let (mv, status) = self.play(history, x, y)?;
        Ok((mv.with_comment(comment)?, status))
    }

    /// Plays `(x, y)` and moves this game to the resulting status.
    ///
    /// The caller appends the returned move to `history`. On error the
    /// status is unchanged.
    ///
    /// # Errors
    ///
    /// As [`Game::play`].
    pub fn apply_move(&mut self, history: &[Move], x: i32, y: i32) -> Result<Move, MoveError> {
        let (mv, status) = self.play(history, x, y)?;
        self.status = status;
        Ok(mv)
    }
}

impl<P: std::fmt::Display> std::fmt::Display for Game<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs {}", self.first_player, self.second_player)
    }
}
