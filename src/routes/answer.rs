use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    dto::answer::{AnswerRecord, SubmitAnswerRequest},
    error::AppError,
    routes::account::AccountId,
    services::answer_service,
    state::SharedState,
};

/// Routes handling answer submission.
pub fn router() -> Router<SharedState> {
    Router::new().route("/games/current/answers", post(submit_answer))
}

/// Record an answer for the caller's next unanswered question.
#[utoipa::path(
    post,
    path = "/games/current/answers",
    tag = "answers",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = AnswerRecord),
        (status = 400, description = "Blank answer text"),
        (status = 409, description = "No active game or question set exhausted"),
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    AccountId(account_id): AccountId,
    Valid(Json(payload)): Valid<Json<SubmitAnswerRequest>>,
) -> Result<Json<AnswerRecord>, AppError> {
    let record = answer_service::submit(&state, account_id, payload).await?;
    Ok(Json(record))
}
