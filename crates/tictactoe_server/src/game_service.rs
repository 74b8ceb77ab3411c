//! Game play business logic layer.

use tictactoe_core::{GameStatus, Move, MoveError, board, validate_comment};
use tracing::{debug, info, instrument, warn};

use crate::db::{GameRecord, GameStore, MoveRecord, UserId, to_moves};
use crate::error::ServiceError;

/// A game together with its moves in play order.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDetail {
    /// The stored game.
    pub game: GameRecord,
    /// Its moves, oldest first.
    pub moves: Vec<MoveRecord>,
}

impl GameDetail {
    /// Parsed status of the game.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] if the stored status is invalid.
    pub fn status(&self) -> Result<GameStatus, ServiceError> {
        Ok(self.game.parse_status()?)
    }

    /// Moves in engine form.
    pub fn history(&self) -> Vec<Move> {
        to_moves(&self.moves)
    }

    /// Text rendering of the current board.
    pub fn render(&self) -> String {
        let history = self.history();
        board(&history).render()
    }
}

/// Service layer for creating and playing games.
///
/// Wraps a [`GameStore`] and runs every move through the engine in the order
/// validate, build, recompute status, inside the store's move transaction.
#[derive(Debug, Clone)]
pub struct GameService<S> {
    store: S,
}

impl<S: GameStore> GameService<S> {
    /// Creates a new game service backed by the given store.
    #[instrument(skip(store))]
    pub fn new(store: S) -> Self {
        info!("Creating GameService");
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Starts a game between two users; the first one moves first.
    ///
    /// # Errors
    ///
    /// [`ServiceError::SamePlayer`] if both ids are equal, or a storage error.
    #[instrument(skip(self))]
    pub fn create_game(
        &self,
        first_player_id: UserId,
        second_player_id: UserId,
    ) -> Result<GameRecord, ServiceError> {
        if first_player_id == second_player_id {
            warn!("Rejected game against self");
            return Err(ServiceError::SamePlayer);
        }
        Ok(self.store.create_game(first_player_id, second_player_id)?)
    }

    /// Loads a game.
    ///
    /// # Errors
    ///
    /// [`ServiceError::GameNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn game(&self, game_id: i32) -> Result<GameRecord, ServiceError> {
        self.store
            .get_game(game_id)?
            .ok_or(ServiceError::GameNotFound(game_id))
    }

    /// Loads a game and its moves.
    ///
    /// # Errors
    ///
    /// [`ServiceError::GameNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn game_detail(&self, game_id: i32) -> Result<GameDetail, ServiceError> {
        let game = self.game(game_id)?;
        let moves = self.store.moves_for_game(game_id)?;
        debug!(moves = moves.len(), "Loaded game detail");
        Ok(GameDetail { game, moves })
    }

    /// Plays `(x, y)` for `player_id` and stores the resulting status.
    ///
    /// Checks run in this order: comment length, game exists, game not
    /// finished, player's turn, coordinates on the board, square free.
    /// A rejected move leaves storage untouched.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Move`] for any rule violation,
    /// [`ServiceError::GameNotFound`] for an unknown game.
    #[instrument(skip(self, comment))]
    pub fn play_move(
        &self,
        game_id: i32,
        player_id: UserId,
        x: i32,
        y: i32,
        comment: &str,
    ) -> Result<GameDetail, ServiceError> {
        validate_comment(comment)?;

        let appended = self.store.append_move::<ServiceError, _>(game_id, |record, moves| {
            let game = record.to_game()?;
            if game.status().is_terminal() {
                warn!(status = %game.status(), "Move on finished game");
                return Err(MoveError::GameFinished(game.status()).into());
            }
            if !game.is_players_turn(&player_id) {
                warn!(
                    expected = ?game.player_to_move(),
                    "Player tried to move out of turn"
                );
                return Err(MoveError::NotYourTurn.into());
            }

            let history = to_moves(moves);
            let (mv, status) = game.play_with_comment(&history, x, y, comment).map_err(|e| {
                warn!(error = %e, "Invalid move");
                ServiceError::from(e)
            })?;
            Ok((mv, status))
        })?;

        let (game, mv) = appended.ok_or(ServiceError::GameNotFound(game_id))?;
        info!(move_id = mv.id(), status = %game.status(), "Move completed successfully");
        self.game_detail(*game.id())
    }

    /// Replaces the comment on one of a game's moves.
    ///
    /// # Errors
    ///
    /// [`ServiceError::GameNotFound`], [`ServiceError::MoveNotFound`] when the
    /// move is not part of the game, or [`MoveError::CommentTooLong`].
    #[instrument(skip(self, comment))]
    pub fn update_comment(
        &self,
        game_id: i32,
        move_id: i32,
        comment: &str,
    ) -> Result<MoveRecord, ServiceError> {
        validate_comment(comment)?;
        let detail = self.game_detail(game_id)?;
        if !detail.moves.iter().any(|m| *m.id() == move_id) {
            warn!("Move is not part of this game");
            return Err(ServiceError::MoveNotFound(move_id));
        }
        self.store
            .update_move_comment(move_id, comment)?
            .ok_or(ServiceError::MoveNotFound(move_id))
    }

    /// Games involving a user, optionally only unfinished ones.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    #[instrument(skip(self))]
    pub fn games_for_user(
        &self,
        user_id: UserId,
        active_only: bool,
    ) -> Result<Vec<GameRecord>, ServiceError> {
        let games = self.store.games_for_user(user_id)?;
        if !active_only {
            return Ok(games);
        }
        let mut active = Vec::with_capacity(games.len());
        for game in games {
            if game.parse_status()?.is_active() {
                active.push(game);
            }
        }
        Ok(active)
    }

    /// All unfinished games.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    #[instrument(skip(self))]
    pub fn active_games(&self) -> Result<Vec<GameRecord>, ServiceError> {
        Ok(self.store.active_games()?)
    }

    /// Unfinished games in which it is this user's turn.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    #[instrument(skip(self))]
    pub fn games_awaiting(&self, user_id: UserId) -> Result<Vec<GameRecord>, ServiceError> {
        let mut waiting = Vec::new();
        for game in self.store.games_for_user(user_id)? {
            if game.to_game()?.is_players_turn(&user_id) {
                waiting.push(game);
            }
        }
        debug!(count = waiting.len(), "Games awaiting user");
        Ok(waiting)
    }
}
