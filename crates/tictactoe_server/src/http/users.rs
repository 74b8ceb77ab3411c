use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use tracing::{debug, instrument};

use super::{
    ApiError, AppJson, AppPath, AppQuery, AppState, CreateUserRequest, GameSummary, GamesQuery,
    run_blocking, views,
};
use crate::db::{Invitation, User, UserId};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/games", get(user_games))
        .route("/users/{id}/invitations", get(user_invitations))
}

#[instrument(skip(state))]
async fn create_user(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = run_blocking(move || state.lobby.register_user(&request.username)).await?;
    debug!(user_id = user.id(), "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    run_blocking(move || state.lobby.list_users()).await.map(Json)
}

async fn get_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<UserId>,
) -> Result<Json<User>, ApiError> {
    run_blocking(move || state.lobby.get_user(user_id)).await.map(Json)
}

/// Games of a user. `awaiting` implies `active`.
#[instrument(skip(state))]
async fn user_games(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<UserId>,
    AppQuery(query): AppQuery<GamesQuery>,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    run_blocking(move || {
        state.lobby.get_user(user_id)?;
        let games = if query.awaiting {
            state.games.games_awaiting(user_id)?
        } else {
            state.games.games_for_user(user_id, query.active)?
        };
        views::summaries(&games)
    })
    .await
    .map(Json)
}

async fn user_invitations(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<UserId>,
) -> Result<Json<Vec<Invitation>>, ApiError> {
    run_blocking(move || state.lobby.invitations_for_user(user_id))
        .await
        .map(Json)
}
