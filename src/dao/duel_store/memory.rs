//! DashMap-backed store. Serves as the default backend when no database is
//! configured and as the storage double in service tests.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    duel_store::DuelStore,
    models::{AnswerEntity, GameEntity, GameStatusEntity, PlayerEntity, QuestionEntity},
    storage::StorageResult,
};

/// In-memory implementation of [`DuelStore`].
#[derive(Clone, Default)]
pub struct MemoryDuelStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    questions: DashMap<Uuid, QuestionEntity>,
    games: DashMap<Uuid, GameEntity>,
    players: DashMap<Uuid, PlayerEntity>,
    answers: DashMap<Uuid, AnswerEntity>,
}

impl MemoryDuelStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn compare_and_swap_game(&self, game: GameEntity, expected_revision: u64) -> bool {
        match self.inner.games.entry(game.id) {
            Entry::Occupied(mut slot) if slot.get().revision == expected_revision => {
                slot.insert(game);
                true
            }
            _ => false,
        }
    }
}

impl DuelStore for MemoryDuelStore {
    fn upsert_question(&self, question: QuestionEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.questions.insert(question.id, question);
            Ok(())
        })
    }

    fn list_published_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .questions
                .iter()
                .filter(|entry| entry.published)
                .map(|entry| entry.value().clone())
                .collect())
        })
    }

    fn find_question(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuestionEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.questions.get(&id).map(|entry| entry.value().clone())) })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.games.insert(game.id, game);
            Ok(())
        })
    }

    fn update_game(
        &self,
        game: GameEntity,
        expected_revision: u64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.compare_and_swap_game(game, expected_revision)) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.games.get(&id).map(|entry| entry.value().clone())) })
    }

    fn find_waiting_game(&self) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            // Shard iteration order is arbitrary: this is the documented
            // non-deterministic single pick, not a FIFO queue.
            Ok(store
                .inner
                .games
                .iter()
                .find(|entry| matches!(entry.status, GameStatusEntity::PendingSecondPlayer))
                .map(|entry| entry.value().clone()))
        })
    }

    fn find_open_game_for(
        &self,
        account_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .games
                .iter()
                .find(|entry| entry.is_open() && entry.has_account(account_id))
                .map(|entry| entry.value().clone()))
        })
    }

    fn save_player(&self, player: PlayerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.players.insert(player.id, player);
            Ok(())
        })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.players.remove(&id);
            Ok(())
        })
    }

    fn find_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.players.get(&id).map(|entry| entry.value().clone())) })
    }

    fn insert_answer(&self, answer: AnswerEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.answers.insert(answer.id, answer);
            Ok(())
        })
    }

    fn answers_of_player(
        &self,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AnswerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut answers = store
                .inner
                .answers
                .iter()
                .filter(|entry| entry.player_id == player_id)
                .map(|entry| entry.value().clone())
                .collect::<Vec<_>>();
            answers.sort_by_key(|answer| answer.answered_at);
            Ok(answers)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
