//! SQLite repository for users, games, moves and invitations.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tictactoe_core::{GameStatus, Move};
use tracing::{debug, info, instrument, warn};

use crate::db::{
    DbError, DbErrorKind, GameRecord, GameStore, Invitation, MoveRecord, NewGame, NewInvitation,
    NewMoveRecord, NewUser, User, UserId, schema,
};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for user and game operations.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

/// Failure inside a move transaction: either storage broke or the caller
/// rejected the move.
enum TxError<E> {
    Db(DbError),
    Rejected(E),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        TxError::Db(DbError::from(err))
    }
}

impl GameRepository {
    /// Creates a repository for the database file at the given path.
    ///
    /// The file is created on first connection if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::with_kind(
                DbErrorKind::Connection,
                "Database path is empty",
            ));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection with foreign keys enforced.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::with_kind(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })?;
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT_MS
        ))?;
        Ok(conn)
    }

    /// Applies any migrations not yet run. Returns how many were applied.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            DbError::with_kind(DbErrorKind::Migration, format!("Migration failed: {}", e))
        })?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the username is taken or a database error occurs.
    #[instrument(skip(self))]
    pub fn create_user(&self, username: String) -> Result<User, DbError> {
        debug!(username = %username, "Creating user");
        let mut conn = self.connection()?;

        let user = diesel::insert_into(schema::users::table)
            .values(&NewUser::new(username))
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), username = %user.username(), "User created");
        Ok(user)
    }

    /// Gets a user by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user(&self, user_id: UserId) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = schema::users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = user.is_some(), "User lookup by id");
        Ok(user)
    }

    /// Gets a user by username. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_name(&self, username: &str) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = schema::users::table
            .filter(schema::users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = user.is_some(), "User lookup by name");
        Ok(user)
    }

    /// Lists all users, ordered by creation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_users(&self) -> Result<Vec<User>, DbError> {
        let mut conn = self.connection()?;
        let users = schema::users::table
            .order((schema::users::created_at.asc(), schema::users::id.asc()))
            .select(User::as_select())
            .load(&mut conn)?;
        info!(count = users.len(), "Users loaded");
        Ok(users)
    }

    /// Stores a new invitation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if either user does not exist or a database error occurs.
    #[instrument(skip(self, invitation), fields(from = invitation.from_user_id(), to = invitation.to_user_id()))]
    pub fn create_invitation(&self, invitation: NewInvitation) -> Result<Invitation, DbError> {
        let mut conn = self.connection()?;
        let stored = diesel::insert_into(schema::invitations::table)
            .values(&invitation)
            .returning(Invitation::as_returning())
            .get_result(&mut conn)?;
        info!(invitation_id = stored.id(), "Invitation created");
        Ok(stored)
    }

    /// Gets an invitation by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_invitation(&self, invitation_id: i32) -> Result<Option<Invitation>, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::invitations::table
            .find(invitation_id)
            .select(Invitation::as_select())
            .first(&mut conn)
            .optional()?)
    }

    /// Invitations addressed to a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn invitations_for_user(&self, user_id: UserId) -> Result<Vec<Invitation>, DbError> {
        let mut conn = self.connection()?;
        let invitations = schema::invitations::table
            .filter(schema::invitations::to_user_id.eq(user_id))
            .order((
                schema::invitations::created_at.desc(),
                schema::invitations::id.desc(),
            ))
            .select(Invitation::as_select())
            .load(&mut conn)?;
        debug!(count = invitations.len(), "Invitations loaded");
        Ok(invitations)
    }

    /// Consumes an invitation and starts the game it proposed.
    ///
    /// The invitee moves first. Returns `None` if the invitation is gone.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; nothing is changed then.
    #[instrument(skip(self))]
    pub fn accept_invitation(&self, invitation_id: i32) -> Result<Option<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let game = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let Some(invitation) = schema::invitations::table
                .find(invitation_id)
                .select(Invitation::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            diesel::delete(schema::invitations::table.find(invitation_id)).execute(conn)?;

            let game = diesel::insert_into(schema::games::table)
                .values(&NewGame::start(
                    *invitation.to_user_id(),
                    *invitation.from_user_id(),
                ))
                .returning(GameRecord::as_returning())
                .get_result(conn)?;
            Ok(Some(game))
        })?;

        match &game {
            Some(g) => info!(game_id = g.id(), "Invitation accepted"),
            None => warn!("Invitation not found"),
        }
        Ok(game)
    }

    /// Deletes an invitation. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_invitation(&self, invitation_id: i32) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let removed =
            diesel::delete(schema::invitations::table.find(invitation_id)).execute(&mut conn)?;
        debug!(removed, "Invitation deleted");
        Ok(removed > 0)
    }
}

impl GameStore for GameRepository {
    #[instrument(skip(self))]
    fn create_game(
        &self,
        first_player_id: UserId,
        second_player_id: UserId,
    ) -> Result<GameRecord, DbError> {
        let mut conn = self.connection()?;
        let game = diesel::insert_into(schema::games::table)
            .values(&NewGame::start(first_player_id, second_player_id))
            .returning(GameRecord::as_returning())
            .get_result(&mut conn)?;
        info!(game_id = game.id(), "Game created");
        Ok(game)
    }

    #[instrument(skip(self))]
    fn get_game(&self, game_id: i32) -> Result<Option<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::games::table
            .find(game_id)
            .select(GameRecord::as_select())
            .first(&mut conn)
            .optional()?)
    }

    #[instrument(skip(self))]
    fn moves_for_game(&self, game_id: i32) -> Result<Vec<MoveRecord>, DbError> {
        let mut conn = self.connection()?;
        let moves = schema::moves::table
            .filter(schema::moves::game_id.eq(game_id))
            .order(schema::moves::id.asc())
            .select(MoveRecord::as_select())
            .load(&mut conn)?;
        debug!(count = moves.len(), "Moves loaded");
        Ok(moves)
    }

    #[instrument(skip(self))]
    fn games_for_user(&self, user_id: UserId) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(
                schema::games::first_player_id
                    .eq(user_id)
                    .or(schema::games::second_player_id.eq(user_id)),
            )
            .order((schema::games::last_active.desc(), schema::games::id.desc()))
            .select(GameRecord::as_select())
            .load(&mut conn)?;
        info!(count = games.len(), "Games for user loaded");
        Ok(games)
    }

    #[instrument(skip(self))]
    fn active_games(&self) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let active = vec![
            GameStatus::FirstToMove.code(),
            GameStatus::SecondToMove.code(),
        ];
        let games = schema::games::table
            .filter(schema::games::status.eq_any(active))
            .order((schema::games::last_active.desc(), schema::games::id.desc()))
            .select(GameRecord::as_select())
            .load(&mut conn)?;
        info!(count = games.len(), "Active games loaded");
        Ok(games)
    }

    /// Runs under `BEGIN IMMEDIATE`, so the write lock is held from the first
    /// read; a concurrent submission waits and then sees the updated status.
    #[instrument(skip(self, decide))]
    fn append_move<E, F>(
        &self,
        game_id: i32,
        decide: F,
    ) -> Result<Option<(GameRecord, MoveRecord)>, E>
    where
        E: From<DbError>,
        F: FnOnce(&GameRecord, &[MoveRecord]) -> Result<(Move, GameStatus), E>,
    {
        let mut conn = self.connection()?;

        let outcome = conn.immediate_transaction::<_, TxError<E>, _>(|conn| {
            let Some(game) = schema::games::table
                .find(game_id)
                .select(GameRecord::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let history = MoveRecord::belonging_to(&game)
                .order(schema::moves::id.asc())
                .select(MoveRecord::as_select())
                .load(conn)?;

            let (mv, status) = decide(&game, &history).map_err(TxError::Rejected)?;

            let stored = diesel::insert_into(schema::moves::table)
                .values(&NewMoveRecord::from_move(game_id, &mv))
                .returning(MoveRecord::as_returning())
                .get_result(conn)?;

            let updated = diesel::update(schema::games::table.find(game_id))
                .set((
                    schema::games::status.eq(status.code()),
                    schema::games::last_active.eq(chrono::Utc::now().naive_utc()),
                ))
                .returning(GameRecord::as_returning())
                .get_result(conn)?;

            Ok(Some((updated, stored)))
        });

        match outcome {
            Ok(Some((game, mv))) => {
                info!(
                    game_id,
                    move_id = mv.id(),
                    status = %game.status(),
                    "Move appended"
                );
                Ok(Some((game, mv)))
            }
            Ok(None) => {
                warn!(game_id, "Game not found");
                Ok(None)
            }
            Err(TxError::Db(e)) => Err(e.into()),
            Err(TxError::Rejected(e)) => {
                debug!(game_id, "Move rejected, transaction rolled back");
                Err(e)
            }
        }
    }

    #[instrument(skip(self, comment))]
    fn update_move_comment(
        &self,
        move_id: i32,
        comment: &str,
    ) -> Result<Option<MoveRecord>, DbError> {
        let mut conn = self.connection()?;
        let updated = diesel::update(schema::moves::table.find(move_id))
            .set(schema::moves::comment.eq(comment))
            .returning(MoveRecord::as_returning())
            .get_result(&mut conn)
            .optional()?;
        debug!(found = updated.is_some(), "Move comment updated");
        Ok(updated)
    }
}
