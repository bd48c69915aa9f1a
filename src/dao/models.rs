use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Question definition owned by the question bank.
///
/// The duel core only ever reads these rows; authoring and publishing are
/// handled out of band (startup seeding from configuration).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Stable identifier for the question.
    pub id: Uuid,
    /// Question text shown to both players.
    pub body: String,
    /// Answers accepted as correct, compared case-insensitively.
    pub accepted_answers: Vec<String>,
    /// Whether the question may be drawn into new games.
    pub published: bool,
}

/// Lifecycle status of a game. Transitions are forward-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatusEntity {
    /// Waiting for a second participant; no questions assigned yet.
    PendingSecondPlayer,
    /// Both participants attached, question set assigned, answers accepted.
    Active,
    /// Both participants answered every assigned question.
    Finished,
}

/// Binding of a question into a game at a fixed 1-based position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameQuestionEntity {
    /// Question assigned to the game.
    pub question_id: Uuid,
    /// 1-based position in the shared answering order.
    pub position: u32,
}

/// Aggregate game entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Player row of the participant that opened the game.
    pub player_one: Uuid,
    /// Player row of the participant that joined, absent while pending.
    pub player_two: Option<Uuid>,
    /// Account ids of every participant, kept alongside the player rows so
    /// the open-game-per-account lookup stays a single query.
    pub accounts: Vec<Uuid>,
    /// Current lifecycle status.
    pub status: GameStatusEntity,
    /// Ordered question bindings, empty while pending.
    pub questions: Vec<GameQuestionEntity>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Set when the second player joins.
    pub started_at: Option<SystemTime>,
    /// Set when both players exhaust the question set.
    pub finished_at: Option<SystemTime>,
    /// Optimistic-concurrency counter, bumped on every guarded update.
    pub revision: u64,
}

impl GameEntity {
    /// Whether the game still accepts a participant or answers.
    pub fn is_open(&self) -> bool {
        !matches!(self.status, GameStatusEntity::Finished)
    }

    /// Whether the account participates in this game.
    pub fn has_account(&self, account_id: Uuid) -> bool {
        self.accounts.contains(&account_id)
    }
}

/// Per-game participant record. Not the account itself: one row exists per
/// (account, game) pair and carries the score for that game only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Primary key of the player row.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Owning game.
    pub game_id: Uuid,
    /// Cumulative score: +1 per correct answer, +1 possible speed bonus.
    pub score: i32,
}

/// Correctness verdict recorded with an answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatusEntity {
    /// Submission matched one of the accepted answers.
    Correct,
    /// Submission matched none of the accepted answers.
    Incorrect,
}

/// Answer row created once per (player, question) pair, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerEntity {
    /// Primary key of the answer.
    pub id: Uuid,
    /// Player row that submitted the answer.
    pub player_id: Uuid,
    /// Question the answer was recorded against.
    pub question_id: Uuid,
    /// Correctness verdict.
    pub status: AnswerStatusEntity,
    /// Submission arrival timestamp.
    pub answered_at: SystemTime,
}
