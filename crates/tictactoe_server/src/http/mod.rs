//! JSON API over the game and lobby services.

mod error;
mod extract;
mod games;
mod invitations;
mod users;
mod views;

use std::sync::Arc;

use axum::{Router, body::Body, http::Request};
use tower::ServiceBuilder;
use tracing::{debug, info, instrument};

use crate::db::GameRepository;
use crate::error::ServiceError;
use crate::game_service::GameService;
use crate::lobby_service::LobbyService;

pub use error::{ApiError, ErrorBody};
pub use extract::{AppJson, AppPath, AppQuery};
pub use views::{
    CreateGameRequest, CreateInvitationRequest, CreateUserRequest, GameSummary, GameView,
    GamesQuery, InvitationActionRequest, MoveView, PlayMoveRequest, UpdateCommentRequest,
};

/// Services shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Game creation and play.
    pub games: Arc<GameService<GameRepository>>,
    /// Users and invitations.
    pub lobby: Arc<LobbyService>,
}

impl AppState {
    /// Builds both services over one repository.
    #[instrument(skip(repository), fields(db_path = %repository.db_path()))]
    pub fn new(repository: GameRepository) -> Self {
        info!("Creating application state");
        Self {
            games: Arc::new(GameService::new(repository.clone())),
            lobby: Arc::new(LobbyService::new(repository)),
        }
    }
}

/// Builds the API router with request logging.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(users::routes())
        .merge(games::routes())
        .merge(invitations::routes())
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(
                method = %req.method(),
                uri = %req.uri(),
                "Incoming HTTP request"
            );
            req
        }))
        .with_state(state)
}

/// Runs a blocking service call off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?;
    if let Err(e) = &result {
        debug!(error = %e, "Service call rejected");
    }
    Ok(result?)
}
