use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::{
    dao::{
        duel_store::DuelStore,
        models::{GameQuestionEntity, QuestionEntity},
        storage::StorageError,
    },
    error::ServiceError,
    state::{SharedState, game},
};

/// Upsert the configured question seeds into the store.
///
/// Seed ids come from the configuration, so running this again (fresh boot,
/// supervisor reconnect) rewrites the same rows instead of growing the bank.
pub async fn seed(
    store: &Arc<dyn DuelStore>,
    seeds: &[QuestionEntity],
) -> Result<(), StorageError> {
    for question in seeds {
        store.upsert_question(question.clone()).await?;
    }

    info!(count = seeds.len(), "seeded question bank");
    Ok(())
}

/// Draw `count` distinct published questions and bind them to positions
/// `1..=count`.
///
/// A bank that cannot fill the set is a fatal configuration error: the caller
/// must reject the game join rather than assign a truncated set.
pub async fn draw_assignments(
    state: &SharedState,
    count: usize,
) -> Result<Vec<GameQuestionEntity>, ServiceError> {
    let store = state.require_duel_store().await?;
    let bank = store.list_published_questions().await?;
    let available = bank.len();

    game::draw_assignments(bank, count).ok_or_else(|| {
        error!(
            needed = count,
            available, "published question bank cannot fill an assignment set"
        );
        ServiceError::ConfigurationExhausted {
            needed: count,
            available,
        }
    })
}

/// Load one question by id, failing with `NotFound` when it does not exist.
pub async fn load_question(
    state: &SharedState,
    id: Uuid,
) -> Result<QuestionEntity, ServiceError> {
    let store = state.require_duel_store().await?;
    store
        .find_question(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("question `{id}` not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;

    #[tokio::test]
    async fn draw_fails_when_bank_is_too_small() {
        let state = test_support::state_with_bank(6, 4).await;

        let err = draw_assignments(&state, 6).await.unwrap_err();
        match err {
            ServiceError::ConfigurationExhausted { needed, available } => {
                assert_eq!(needed, 6);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn draw_ignores_unpublished_questions() {
        let state = test_support::state_with_bank(2, 2).await;
        let store = state.duel_store().await.unwrap();

        store
            .upsert_question(QuestionEntity {
                id: Uuid::from_u128(0xdead),
                body: "draft question".into(),
                accepted_answers: vec!["x".into()],
                published: false,
            })
            .await
            .unwrap();

        let assignments = draw_assignments(&state, 2).await.unwrap();
        assert!(
            assignments
                .iter()
                .all(|binding| binding.question_id != Uuid::from_u128(0xdead))
        );
    }

    #[tokio::test]
    async fn seeding_twice_does_not_grow_the_bank() {
        let state = test_support::state_with_bank(2, 3).await;
        let store = state.duel_store().await.unwrap();

        let seeds = state.config().question_bank().to_vec();
        seed(&store, &seeds).await.unwrap();

        let bank = store.list_published_questions().await.unwrap();
        assert_eq!(bank.len(), 3);
    }
}
