//! Storage interface for games and their moves.

use tictactoe_core::{GameStatus, Move};

use crate::db::{DbError, GameRecord, MoveRecord, UserId};

/// The queries and writes the game service needs from storage.
///
/// Implementations must make [`GameStore::append_move`] atomic and
/// serialized per game: the `decide` callback sees the game and its moves as
/// they are at the moment the write is committed.
pub trait GameStore: Clone + Send + Sync + 'static {
    /// Creates a game with the first player to move.
    fn create_game(&self, first_player_id: UserId, second_player_id: UserId)
    -> Result<GameRecord, DbError>;

    /// Looks up a game by id.
    fn get_game(&self, game_id: i32) -> Result<Option<GameRecord>, DbError>;

    /// All moves of a game in play order.
    fn moves_for_game(&self, game_id: i32) -> Result<Vec<MoveRecord>, DbError>;

    /// Games in which the user is either player, most recently active first.
    fn games_for_user(&self, user_id: UserId) -> Result<Vec<GameRecord>, DbError>;

    /// Games still waiting on a move, most recently active first.
    fn active_games(&self) -> Result<Vec<GameRecord>, DbError>;

    /// Appends one move and stores the status it leads to, as a single unit.
    ///
    /// `decide` receives the current game and its ordered moves and returns
    /// the move to store plus the new status, or an error that aborts the
    /// write. Returns `Ok(None)` when the game does not exist.
    fn append_move<E, F>(&self, game_id: i32, decide: F) -> Result<Option<(GameRecord, MoveRecord)>, E>
    where
        E: From<DbError>,
        F: FnOnce(&GameRecord, &[MoveRecord]) -> Result<(Move, GameStatus), E>;

    /// Replaces the comment on a move. Returns `Ok(None)` for an unknown move.
    fn update_move_comment(&self, move_id: i32, comment: &str) -> Result<Option<MoveRecord>, DbError>;
}
