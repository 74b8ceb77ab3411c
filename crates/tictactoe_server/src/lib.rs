//! Tic-tac-toe server library - persistence, services and the JSON API
//!
//! # Architecture
//!
//! - **db**: SQLite storage through diesel; [`GameStore`] is the interface the
//!   game service needs, [`GameRepository`] the SQLite implementation
//! - **Services**: [`GameService`] plays moves through the engine inside one
//!   transaction per move; [`LobbyService`] handles users and invitations
//! - **http**: axum router exposing both services as JSON
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_server::{AppState, GameRepository, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repository = GameRepository::new("tictactoe.db".to_string())?;
//! repository.run_migrations()?;
//!
//! let app = router(AppState::new(repository));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod error;
mod game_service;
mod http;
mod lobby_service;

// Crate-level exports - Configuration
pub use config::{ConfigError, DATABASE_ENV, ServerConfig};

// Crate-level exports - Database
pub use db::{
    DbError, DbErrorKind, GameRecord, GameRepository, GameStore, Invitation, MIGRATIONS,
    MoveRecord, NewGame, NewInvitation, NewMoveRecord, NewUser, User, UserId, to_moves,
};

// Crate-level exports - Services
pub use error::ServiceError;
pub use game_service::{GameDetail, GameService};
pub use lobby_service::{LobbyService, MAX_USERNAME_LEN};

// Crate-level exports - HTTP API
pub use http::{
    ApiError, AppState, CreateGameRequest, CreateInvitationRequest, CreateUserRequest, ErrorBody,
    GameSummary, GameView, GamesQuery, InvitationActionRequest, MoveView, PlayMoveRequest,
    UpdateCommentRequest, router,
};
