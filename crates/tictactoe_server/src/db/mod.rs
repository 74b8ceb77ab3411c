//! Database persistence layer for users, games, moves and invitations.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use error::{DbError, DbErrorKind};
pub use models::{
    GameRecord, Invitation, MoveRecord, NewGame, NewInvitation, NewMoveRecord, NewUser, User,
    UserId, to_moves,
};
pub use repository::{GameRepository, MIGRATIONS};
pub use store::GameStore;
