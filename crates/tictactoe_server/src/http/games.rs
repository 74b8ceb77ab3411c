use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use tracing::{info, instrument};

use super::{
    ApiError, AppJson, AppPath, AppState, CreateGameRequest, GameSummary, GameView, MoveView,
    PlayMoveRequest, UpdateCommentRequest, run_blocking, views,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(active_games).post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/moves", post(play_move))
        .route("/games/{id}/moves/{move_id}", patch(update_comment))
}

#[instrument(skip(state))]
async fn create_game(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let view = run_blocking(move || {
        state.lobby.get_user(request.first_player_id)?;
        state.lobby.get_user(request.second_player_id)?;
        let game = state
            .games
            .create_game(request.first_player_id, request.second_player_id)?;
        GameView::try_from(&state.games.game_detail(*game.id())?)
    })
    .await?;
    info!(game_id = view.summary.id, "Game created");
    Ok((StatusCode::CREATED, Json(view)))
}

async fn active_games(State(state): State<AppState>) -> Result<Json<Vec<GameSummary>>, ApiError> {
    run_blocking(move || views::summaries(&state.games.active_games()?))
        .await
        .map(Json)
}

async fn get_game(
    State(state): State<AppState>,
    AppPath(game_id): AppPath<i32>,
) -> Result<Json<GameView>, ApiError> {
    run_blocking(move || GameView::try_from(&state.games.game_detail(game_id)?))
        .await
        .map(Json)
}

#[instrument(skip(state, request), fields(player_id = request.player_id, x = request.x, y = request.y))]
async fn play_move(
    State(state): State<AppState>,
    AppPath(game_id): AppPath<i32>,
    AppJson(request): AppJson<PlayMoveRequest>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let view = run_blocking(move || {
        let (x, y) = request.coordinates();
        let detail = state
            .games
            .play_move(game_id, request.player_id, x, y, &request.comment)?;
        GameView::try_from(&detail)
    })
    .await?;
    info!(status = %view.summary.status, "Move played");
    Ok((StatusCode::CREATED, Json(view)))
}

#[instrument(skip(state, request))]
async fn update_comment(
    State(state): State<AppState>,
    AppPath((game_id, move_id)): AppPath<(i32, i32)>,
    AppJson(request): AppJson<UpdateCommentRequest>,
) -> Result<Json<MoveView>, ApiError> {
    run_blocking(move || {
        let record = state
            .games
            .update_comment(game_id, move_id, &request.comment)?;
        Ok(MoveView::from(&record))
    })
    .await
    .map(Json)
}
