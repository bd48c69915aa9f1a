use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::status::InvalidTransition};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller tried to join the matchmaking pool while already holding an open game.
    #[error("account `{account_id}` already has an open game `{game_id}`")]
    AlreadyInGame {
        /// Account that attempted to connect.
        account_id: Uuid,
        /// The open game blocking the new connection.
        game_id: Uuid,
    },
    /// Caller submitted an answer without an active game.
    #[error("account `{account_id}` has no active game")]
    NotInActiveGame {
        /// Account that attempted to submit.
        account_id: Uuid,
    },
    /// Caller submitted an answer after exhausting their question set.
    #[error("all questions of game `{game_id}` already answered")]
    AllQuestionsAnswered {
        /// Game whose question set is exhausted.
        game_id: Uuid,
    },
    /// Caller requested a view for a game they do not participate in.
    #[error("account `{account_id}` is not a participant of game `{game_id}`")]
    ForbiddenNotParticipant {
        /// Requesting account.
        account_id: Uuid,
        /// The game the account is not part of.
        game_id: Uuid,
    },
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The published question bank cannot fill a full assignment set.
    #[error("question bank exhausted: {needed} published questions required, {available} available")]
    ConfigurationExhausted {
        /// Questions required per game.
        needed: usize,
        /// Published questions currently available.
        available: usize,
    },
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// A game row reached a lifecycle state the status machine forbids.
    #[error("invalid game state: {0}")]
    InvalidState(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Missing or malformed caller identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Caller is authenticated but not allowed to see the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current game state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::AlreadyInGame { .. }
            | ServiceError::NotInActiveGame { .. }
            | ServiceError::AllQuestionsAnswered { .. } => AppError::Conflict(err.to_string()),
            ServiceError::ForbiddenNotParticipant { .. } => AppError::Forbidden(err.to_string()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::ConfigurationExhausted { .. } => AppError::Internal(err.to_string()),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidState(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
