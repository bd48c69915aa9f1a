use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{AnswerEntity, AnswerStatusEntity, GameEntity, GameStatusEntity, QuestionEntity},
    dto::format_system_time,
    state::game::ParticipantProgress,
};

/// Lifecycle status labels exposed on the wire.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatusDto {
    /// Waiting for a second participant.
    PendingSecondPlayer,
    /// Both participants attached, answers accepted.
    Active,
    /// Every assigned question answered by both participants.
    Finished,
}

impl From<GameStatusEntity> for GameStatusDto {
    fn from(value: GameStatusEntity) -> Self {
        match value {
            GameStatusEntity::PendingSecondPlayer => GameStatusDto::PendingSecondPlayer,
            GameStatusEntity::Active => GameStatusDto::Active,
            GameStatusEntity::Finished => GameStatusDto::Finished,
        }
    }
}

/// Correctness verdict exposed on the wire.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatusDto {
    /// Submission matched an accepted answer.
    Correct,
    /// Submission matched no accepted answer.
    Incorrect,
}

impl From<AnswerStatusEntity> for AnswerStatusDto {
    fn from(value: AnswerStatusEntity) -> Self {
        match value {
            AnswerStatusEntity::Correct => AnswerStatusDto::Correct,
            AnswerStatusEntity::Incorrect => AnswerStatusDto::Incorrect,
        }
    }
}

/// One recorded answer inside a participant's progress.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerView {
    /// Question the answer was recorded against.
    pub question_id: Uuid,
    /// Correctness verdict.
    pub status: AnswerStatusDto,
    /// Submission timestamp (RFC 3339).
    pub answered_at: String,
}

impl From<AnswerEntity> for AnswerView {
    fn from(value: AnswerEntity) -> Self {
        Self {
            question_id: value.question_id,
            status: value.status.into(),
            answered_at: format_system_time(value.answered_at),
        }
    }
}

/// Per-participant progress inside a game view.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerProgressView {
    /// Player row id (per-game participant record).
    pub player_id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Current score including any speed bonus.
    pub score: i32,
    /// Recorded answers in submission order.
    pub answers: Vec<AnswerView>,
}

impl From<ParticipantProgress> for PlayerProgressView {
    fn from(value: ParticipantProgress) -> Self {
        Self {
            player_id: value.player.id,
            account_id: value.player.account_id,
            score: value.player.score,
            answers: value.answers.into_iter().map(Into::into).collect(),
        }
    }
}

/// Question as shown to participants: id and body only. The accepted answers
/// deliberately have no field on this type.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionView {
    /// Question identifier.
    pub id: Uuid,
    /// Question text.
    pub body: String,
}

impl From<QuestionEntity> for QuestionView {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            body: value.body,
        }
    }
}

/// Participant-scoped snapshot of a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameView {
    /// Game identifier.
    pub id: Uuid,
    /// Current lifecycle status.
    pub status: GameStatusDto,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Set when the second player joined.
    pub started_at: Option<String>,
    /// Set when both players exhausted the question set.
    pub finished_at: Option<String>,
    /// Both participants' progress (one entry while pending).
    pub players: Vec<PlayerProgressView>,
    /// Shared question list in answering order; `null` while pending.
    pub questions: Option<Vec<QuestionView>>,
}

impl GameView {
    /// Assemble a view from fully loaded rows. `questions` must already be in
    /// position order; pass `None` while the game is pending.
    pub fn assemble(
        game: &GameEntity,
        participants: Vec<ParticipantProgress>,
        questions: Option<Vec<QuestionEntity>>,
    ) -> Self {
        Self {
            id: game.id,
            status: game.status.into(),
            created_at: format_system_time(game.created_at),
            started_at: game.started_at.map(format_system_time),
            finished_at: game.finished_at.map(format_system_time),
            players: participants.into_iter().map(Into::into).collect(),
            questions: questions.map(|list| list.into_iter().map(Into::into).collect()),
        }
    }
}
