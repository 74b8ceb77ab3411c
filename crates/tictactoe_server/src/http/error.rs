//! Mapping of service failures onto HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tictactoe_core::MoveError;
use tracing::{error, warn};

use crate::error::ServiceError;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Message fit for showing to the player.
    pub error: String,
    /// Input field the message belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Failure of a request handler.
#[derive(Debug, derive_more::Display)]
pub enum ApiError {
    /// A service operation failed.
    #[display("{_0}")]
    Service(ServiceError),
    /// The request body, path or query could not be decoded.
    #[display("{_0}")]
    BadRequest(String),
    /// The blocking task running the operation died.
    #[display("Internal error: {_0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        ApiError::Service(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected JSON body");
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected path");
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected query string");
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::Move(e)) => match e {
                MoveError::OutOfBounds { .. }
                | MoveError::SquareOccupied { .. }
                | MoveError::CommentTooLong(_) => StatusCode::UNPROCESSABLE_ENTITY,
                MoveError::NotYourTurn => StatusCode::FORBIDDEN,
                MoveError::GameFinished(_) => StatusCode::CONFLICT,
            },
            ApiError::Service(
                ServiceError::GameNotFound(_)
                | ServiceError::MoveNotFound(_)
                | ServiceError::UserNotFound(_)
                | ServiceError::InvitationNotFound(_),
            ) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::NotInvitee(_)) => StatusCode::FORBIDDEN,
            ApiError::Service(ServiceError::SamePlayer | ServiceError::InvalidInput(_))
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::UsernameTaken(_)) => StatusCode::CONFLICT,
            ApiError::Service(ServiceError::Db(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Response body for this error. Storage details are not exposed.
    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::Service(ServiceError::Move(e)) => ErrorBody {
                error: e.user_message(),
                field: e.field().map(str::to_string),
            },
            ApiError::Service(ServiceError::Db(_)) | ApiError::Internal(_) => ErrorBody {
                error: "Internal server error".to_string(),
                field: None,
            },
            ApiError::Service(other) => ErrorBody {
                error: other.to_string(),
                field: None,
            },
            ApiError::BadRequest(message) => ErrorBody {
                error: message.clone(),
                field: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
