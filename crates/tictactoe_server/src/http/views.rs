//! Request and response bodies of the JSON API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tictactoe_core::{GameStatus, Mover, board};

use crate::db::{GameRecord, MoveRecord, UserId};
use crate::error::ServiceError;
use crate::game_service::GameDetail;

/// Body of `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Name to register.
    pub username: String,
}

/// Body of `POST /games`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Player who moves first.
    pub first_player_id: UserId,
    /// Player who moves second.
    pub second_player_id: UserId,
}

/// Body of `POST /games/{id}/moves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayMoveRequest {
    /// Acting player.
    pub player_id: UserId,
    /// Column. Wider than a board coordinate so that any JSON integer
    /// reaches move validation.
    pub x: i64,
    /// Row.
    pub y: i64,
    /// Optional remark.
    #[serde(default)]
    pub comment: String,
}

impl PlayMoveRequest {
    /// Coordinates narrowed to the engine's type. Values outside `i32`
    /// saturate, which keeps them off the board.
    pub fn coordinates(&self) -> (i32, i32) {
        (saturate(self.x), saturate(self.y))
    }
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Body of `PATCH /games/{id}/moves/{move_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    /// Replacement comment.
    pub comment: String,
}

/// Body of `POST /invitations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitationRequest {
    /// Inviting user.
    pub from_user_id: UserId,
    /// Invited user.
    pub to_user_id: UserId,
    /// Optional note.
    #[serde(default)]
    pub message: String,
}

/// Body of the invitation accept and decline routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationActionRequest {
    /// User answering the invitation.
    pub user_id: UserId,
}

/// Query of `GET /users/{id}/games`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamesQuery {
    /// Only unfinished games.
    #[serde(default)]
    pub active: bool,
    /// Only games where it is this user's turn.
    #[serde(default)]
    pub awaiting: bool,
}

/// One move as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveView {
    /// Move id, usable for editing its comment.
    pub id: i32,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Side that played it.
    pub mover: Mover,
    /// Remark attached to the move.
    pub comment: String,
    /// When it was played.
    pub created_at: NaiveDateTime,
}

impl From<&MoveRecord> for MoveView {
    fn from(record: &MoveRecord) -> Self {
        Self {
            id: *record.id(),
            x: *record.x(),
            y: *record.y(),
            mover: record.mover(),
            comment: record.comment().clone(),
            created_at: *record.created_at(),
        }
    }
}

/// A game without its moves, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Game id.
    pub id: i32,
    /// Player who moves first.
    pub first_player_id: UserId,
    /// Player who moves second.
    pub second_player_id: UserId,
    /// Current status.
    pub status: GameStatus,
    /// Human-readable status.
    pub status_label: String,
    /// Whose turn it is; absent once the game is over.
    pub next_player_id: Option<UserId>,
    /// When the game was created.
    pub start_time: NaiveDateTime,
    /// When the last move was played.
    pub last_active: NaiveDateTime,
}

impl TryFrom<&GameRecord> for GameSummary {
    type Error = ServiceError;

    fn try_from(record: &GameRecord) -> Result<Self, Self::Error> {
        let game = record.to_game()?;
        Ok(Self {
            id: *record.id(),
            first_player_id: *record.first_player_id(),
            second_player_id: *record.second_player_id(),
            status: game.status(),
            status_label: game.status().to_string(),
            next_player_id: game.player_to_move().copied(),
            start_time: *record.start_time(),
            last_active: *record.last_active(),
        })
    }
}

/// A game with its board and moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    /// Identity and status.
    #[serde(flatten)]
    pub summary: GameSummary,
    /// Rows top to bottom, each cell the side occupying it.
    pub board: Vec<Vec<Option<Mover>>>,
    /// Moves in play order.
    pub moves: Vec<MoveView>,
}

impl TryFrom<&GameDetail> for GameView {
    type Error = ServiceError;

    fn try_from(detail: &GameDetail) -> Result<Self, Self::Error> {
        let history = detail.history();
        let grid = board(&history);
        let cells = grid
            .rows()
            .iter()
            .map(|row| row.iter().map(|cell| cell.map(|mv| mv.mover)).collect())
            .collect();
        Ok(Self {
            summary: GameSummary::try_from(&detail.game)?,
            board: cells,
            moves: detail.moves.iter().map(MoveView::from).collect(),
        })
    }
}

/// Converts a list of records into summaries.
pub fn summaries(records: &[GameRecord]) -> Result<Vec<GameSummary>, ServiceError> {
    records.iter().map(GameSummary::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_saturate() {
        let request = PlayMoveRequest {
            player_id: 1,
            x: 5_000_000_000,
            y: -5_000_000_000,
            comment: String::new(),
        };
        assert_eq!(request.coordinates(), (i32::MAX, i32::MIN));

        let request = PlayMoveRequest { x: 2, y: 0, ..request };
        assert_eq!(request.coordinates(), (2, 0));
    }
}
