//! Database models and their mapping onto engine types.

use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;
use tictactoe_core::{Game, GameStatus, Move, Mover};
use tracing::instrument;

use crate::db::{DbError, DbErrorKind, schema};

/// Identifier of a row in `users`.
pub type UserId = i32;

/// User profile database model.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Getters, Serialize, new)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: UserId,
    username: String,
    created_at: NaiveDateTime,
}

/// Insertable user model for creating new users.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    username: String,
}

/// Game database model.
///
/// The status is kept as its single-letter code; use
/// [`GameRecord::parse_status`] or [`GameRecord::to_game`] to read it.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Getters, new)]
#[diesel(table_name = schema::games)]
pub struct GameRecord {
    id: i32,
    first_player_id: UserId,
    second_player_id: UserId,
    status: String,
    start_time: NaiveDateTime,
    last_active: NaiveDateTime,
}

impl GameRecord {
    /// Parses the stored status code.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the code is not one of `F`, `S`, `W`, `L`, `D`.
    #[instrument(skip(self), fields(game_id = self.id, status = %self.status))]
    pub fn parse_status(&self) -> Result<GameStatus, DbError> {
        GameStatus::from_str(&self.status).map_err(|_| {
            DbError::with_kind(
                DbErrorKind::Corrupt,
                format!("Invalid status '{}' for game {}", self.status, self.id),
            )
        })
    }

    /// Engine view of this game, keyed by user id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored status is invalid.
    pub fn to_game(&self) -> Result<Game<UserId>, DbError> {
        Ok(Game::with_status(
            self.first_player_id,
            self.second_player_id,
            self.parse_status()?,
        ))
    }

    /// True if `user_id` plays in this game.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.first_player_id == user_id || self.second_player_id == user_id
    }
}

/// Insertable game model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    first_player_id: UserId,
    second_player_id: UserId,
    status: String,
}

impl NewGame {
    /// A fresh game with the first player to move.
    pub fn start(first_player_id: UserId, second_player_id: UserId) -> Self {
        Self::new(
            first_player_id,
            second_player_id,
            GameStatus::FirstToMove.code().to_string(),
        )
    }
}

/// Move database model. Row id order is play order.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Selectable, Getters, new)]
#[diesel(table_name = schema::moves)]
#[diesel(belongs_to(GameRecord, foreign_key = game_id))]
pub struct MoveRecord {
    id: i32,
    game_id: i32,
    x: i32,
    y: i32,
    comment: String,
    by_first_player: bool,
    created_at: NaiveDateTime,
}

impl MoveRecord {
    /// The side that made this move.
    pub fn mover(&self) -> Mover {
        Mover::from_first_flag(self.by_first_player)
    }

    /// Engine view of this move.
    pub fn to_move(&self) -> Move {
        Move {
            x: self.x,
            y: self.y,
            mover: self.mover(),
            comment: self.comment.clone(),
        }
    }
}

/// Insertable move model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::moves)]
pub struct NewMoveRecord {
    game_id: i32,
    x: i32,
    y: i32,
    comment: String,
    by_first_player: bool,
}

impl NewMoveRecord {
    /// Builds the row for an engine move in `game_id`.
    pub fn from_move(game_id: i32, mv: &Move) -> Self {
        Self::new(game_id, mv.x, mv.y, mv.comment.clone(), mv.mover.is_first())
    }
}

/// Pending invitation database model.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Getters, Serialize, new)]
#[diesel(table_name = schema::invitations)]
pub struct Invitation {
    id: i32,
    from_user_id: UserId,
    to_user_id: UserId,
    message: String,
    created_at: NaiveDateTime,
}

/// Insertable invitation model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::invitations)]
pub struct NewInvitation {
    from_user_id: UserId,
    to_user_id: UserId,
    message: String,
}

/// Converts stored moves into engine moves, keeping order.
pub fn to_moves(records: &[MoveRecord]) -> Vec<Move> {
    records.iter().map(MoveRecord::to_move).collect()
}
