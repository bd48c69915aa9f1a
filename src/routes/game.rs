use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::game::GameView,
    error::AppError,
    routes::account::AccountId,
    services::{matchmaking_service, view_service},
    state::SharedState,
};

/// Routes handling matchmaking and game views.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/connect", post(connect))
        .route("/games/current", get(current_game))
        .route("/games/{id}", get(game_view))
}

/// Join the matchmaking pool: claim a waiting game or open a fresh one.
#[utoipa::path(
    post,
    path = "/games/connect",
    tag = "matchmaking",
    responses(
        (status = 200, description = "Joined or opened a game", body = GameView),
        (status = 409, description = "Account already holds an open game"),
    )
)]
pub async fn connect(
    State(state): State<SharedState>,
    AccountId(account_id): AccountId,
) -> Result<Json<GameView>, AppError> {
    let view = matchmaking_service::connect(&state, account_id).await?;
    Ok(Json(view))
}

/// Snapshot of the caller's own open game.
#[utoipa::path(
    get,
    path = "/games/current",
    tag = "game",
    responses(
        (status = 200, description = "Current game snapshot", body = GameView),
        (status = 404, description = "No open game for the account"),
    )
)]
pub async fn current_game(
    State(state): State<SharedState>,
    AccountId(account_id): AccountId,
) -> Result<Json<GameView>, AppError> {
    let view = view_service::current(&state, account_id).await?;
    Ok(Json(view))
}

/// Snapshot of a specific game, restricted to its participants.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game snapshot", body = GameView),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Unknown game id"),
    )
)]
pub async fn game_view(
    State(state): State<SharedState>,
    AccountId(account_id): AccountId,
    Path(id): Path<Uuid>,
) -> Result<Json<GameView>, AppError> {
    let view = view_service::view(&state, id, account_id).await?;
    Ok(Json(view))
}
