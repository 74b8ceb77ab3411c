//! Service-level errors.

use tictactoe_core::MoveError;

use crate::db::{DbError, UserId};

/// Why a service operation failed.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ServiceError {
    /// The engine refused the move.
    #[display("{_0}")]
    Move(MoveError),

    /// No game with this id.
    #[display("Game {_0} not found")]
    GameNotFound(i32),

    /// No move with this id in the game.
    #[display("Move {_0} not found")]
    MoveNotFound(i32),

    /// No user with this id.
    #[display("User {_0} not found")]
    UserNotFound(UserId),

    /// No invitation with this id.
    #[display("Invitation {_0} not found")]
    InvitationNotFound(i32),

    /// The acting user may not act on this invitation.
    #[display("Invitation {_0} is not addressed to you")]
    NotInvitee(i32),

    /// A game or invitation needs two different users.
    #[display("A player cannot play against themselves")]
    SamePlayer,

    /// The username is already registered.
    #[display("Username '{_0}' is already taken")]
    UsernameTaken(String),

    /// Input failed validation.
    #[display("{_0}")]
    InvalidInput(String),

    /// Storage failed.
    #[display("{_0}")]
    Db(DbError),
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Move(e) => Some(e),
            ServiceError::Db(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for ServiceError {
    fn from(err: MoveError) -> Self {
        ServiceError::Move(err)
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        ServiceError::Db(err)
    }
}
