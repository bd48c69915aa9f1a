//! Shared fixtures for service tests, backed by the in-memory store.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        duel_store::{DuelStore, memory::MemoryDuelStore},
        models::QuestionEntity,
    },
    services::{matchmaking_service, question_bank},
    state::{AppState, SharedState},
};

/// Bootstrapped state with `bank_size` published questions (every one accepts
/// the answer "42") and `questions_per_game` questions per duel.
pub(crate) async fn state_with_bank(
    questions_per_game: usize,
    bank_size: usize,
) -> SharedState {
    let bank = (1..=bank_size)
        .map(|i| QuestionEntity {
            id: Uuid::from_u128(i as u128),
            body: format!("question {i}"),
            accepted_answers: vec!["42".into(), format!("alt-{i}")],
            published: true,
        })
        .collect::<Vec<_>>();

    let state = AppState::new(AppConfig::new(questions_per_game, bank.clone()));
    let store: Arc<dyn DuelStore> = Arc::new(MemoryDuelStore::new());
    question_bank::seed(&store, &bank).await.expect("seed bank");
    state.install_duel_store(store).await;
    state
}

/// Connect two fixed accounts so tests start from an active duel.
pub(crate) async fn paired_accounts(state: &SharedState) -> (Uuid, Uuid) {
    let first = Uuid::from_u128(0xA11CE);
    let second = Uuid::from_u128(0xB0B);
    matchmaking_service::connect(state, first)
        .await
        .expect("first connect");
    matchmaking_service::connect(state, second)
        .await
        .expect("second connect");
    (first, second)
}
