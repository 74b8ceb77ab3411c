use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use tracing::{info, instrument};

use super::{
    ApiError, AppJson, AppPath, AppState, CreateInvitationRequest, GameView,
    InvitationActionRequest, run_blocking,
};
use crate::db::Invitation;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invitations", post(send_invitation))
        .route("/invitations/{id}/accept", post(accept_invitation))
        .route("/invitations/{id}/decline", post(decline_invitation))
}

#[instrument(skip(state, request), fields(from = request.from_user_id, to = request.to_user_id))]
async fn send_invitation(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<Invitation>), ApiError> {
    let invitation = run_blocking(move || {
        state
            .lobby
            .send_invitation(request.from_user_id, request.to_user_id, &request.message)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

#[instrument(skip(state))]
async fn accept_invitation(
    State(state): State<AppState>,
    AppPath(invitation_id): AppPath<i32>,
    AppJson(request): AppJson<InvitationActionRequest>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let view = run_blocking(move || {
        let game = state.lobby.accept_invitation(invitation_id, request.user_id)?;
        GameView::try_from(&state.games.game_detail(*game.id())?)
    })
    .await?;
    info!(game_id = view.summary.id, "Invitation accepted");
    Ok((StatusCode::CREATED, Json(view)))
}

#[instrument(skip(state))]
async fn decline_invitation(
    State(state): State<AppState>,
    AppPath(invitation_id): AppPath<i32>,
    AppJson(request): AppJson<InvitationActionRequest>,
) -> Result<StatusCode, ApiError> {
    run_blocking(move || state.lobby.decline_invitation(invitation_id, request.user_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
