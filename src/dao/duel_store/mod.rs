/// In-memory store used as the default backend and as the test double.
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{AnswerEntity, GameEntity, PlayerEntity, QuestionEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for duels, players, answers and the
/// read-only question bank.
///
/// The store is the single point of serialization between concurrent
/// requests: [`DuelStore::update_game`] is a compare-and-swap on the game's
/// revision counter, and both guarded transitions (pending-join and
/// finish-detection) go through it.
pub trait DuelStore: Send + Sync {
    /// Insert or replace a question row, keyed by its id.
    fn upsert_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// All questions currently flagged as published.
    fn list_published_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Fetch one question by id, published or not.
    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>>;
    /// Persist a brand-new game row.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace the game row iff its stored revision equals `expected_revision`.
    ///
    /// Returns `false` when another writer got there first; the caller decides
    /// whether to retry, fall through, or treat the loss as a no-op.
    fn update_game(
        &self,
        game: GameEntity,
        expected_revision: u64,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Fetch one game by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Any one game waiting for a second player.
    ///
    /// When several games are waiting the pick is a non-deterministic single
    /// choice; callers must not rely on FIFO ordering.
    fn find_waiting_game(&self) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// The open (pending or active) game the account participates in, if any.
    fn find_open_game_for(
        &self,
        account_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Insert or replace a player row (score updates reuse this).
    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove a player row that lost the pending-join race.
    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch one player row by id.
    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Persist a freshly recorded answer.
    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// All answers of a player, ordered by submission timestamp.
    fn answers_of_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>>;
    /// Probe backend connectivity.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a lost backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
