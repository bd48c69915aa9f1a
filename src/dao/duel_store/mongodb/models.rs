use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    AnswerEntity, AnswerStatusEntity, GameEntity, GameQuestionEntity, GameStatusEntity,
    PlayerEntity, QuestionEntity,
};

/// Serde label of [`GameStatusEntity::PendingSecondPlayer`], used in filters.
pub const STATUS_PENDING: &str = "pending_second_player";
/// Serde label of [`GameStatusEntity::Finished`], used in filters.
pub const STATUS_FINISHED: &str = "finished";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    player_one: Uuid,
    player_two: Option<Uuid>,
    accounts: Vec<Uuid>,
    status: GameStatusEntity,
    questions: Vec<GameQuestionEntity>,
    created_at: DateTime,
    started_at: Option<DateTime>,
    finished_at: Option<DateTime>,
    revision: i64,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            player_one: value.player_one,
            player_two: value.player_two,
            accounts: value.accounts,
            status: value.status,
            questions: value.questions,
            created_at: DateTime::from_system_time(value.created_at),
            started_at: value.started_at.map(DateTime::from_system_time),
            finished_at: value.finished_at.map(DateTime::from_system_time),
            revision: value.revision as i64,
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            player_one: value.player_one,
            player_two: value.player_two,
            accounts: value.accounts,
            status: value.status,
            questions: value.questions,
            created_at: value.created_at.to_system_time(),
            started_at: value.started_at.map(DateTime::to_system_time),
            finished_at: value.finished_at.map(DateTime::to_system_time),
            revision: value.revision as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    account_id: Uuid,
    game_id: Uuid,
    score: i32,
}

impl From<PlayerEntity> for MongoPlayerDocument {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            account_id: value.account_id,
            game_id: value.game_id,
            score: value.score,
        }
    }
}

impl From<MongoPlayerDocument> for PlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
        Self {
            id: value.id,
            account_id: value.account_id,
            game_id: value.game_id,
            score: value.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAnswerDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    player_id: Uuid,
    question_id: Uuid,
    status: AnswerStatusEntity,
    answered_at: DateTime,
}

impl From<AnswerEntity> for MongoAnswerDocument {
    fn from(value: AnswerEntity) -> Self {
        Self {
            id: value.id,
            player_id: value.player_id,
            question_id: value.question_id,
            status: value.status,
            answered_at: DateTime::from_system_time(value.answered_at),
        }
    }
}

impl From<MongoAnswerDocument> for AnswerEntity {
    fn from(value: MongoAnswerDocument) -> Self {
        Self {
            id: value.id,
            player_id: value.player_id,
            question_id: value.question_id,
            status: value.status,
            answered_at: value.answered_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    body: String,
    accepted_answers: Vec<String>,
    published: bool,
}

impl From<QuestionEntity> for MongoQuestionDocument {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            body: value.body,
            accepted_answers: value.accepted_answers,
            published: value.published,
        }
    }
}

impl From<MongoQuestionDocument> for QuestionEntity {
    fn from(value: MongoQuestionDocument) -> Self {
        Self {
            id: value.id,
            body: value.body,
            accepted_answers: value.accepted_answers,
            published: value.published,
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
