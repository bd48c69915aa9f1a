use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::models::PlayerEntity,
    dto::game::GameView,
    error::ServiceError,
    services::{question_bank, view_service},
    state::{SharedState, game},
};

/// Pair the account into a duel: claim a waiting game when one exists,
/// otherwise open a fresh one.
///
/// Two connects racing for the same waiting game both build the joined row
/// from the same loaded revision; the store's compare-and-swap lets exactly
/// one through. The loser's fall-through to a fresh waiting game is a defined
/// successful outcome, not an error.
pub async fn connect(state: &SharedState, account_id: Uuid) -> Result<GameView, ServiceError> {
    let store = state.require_duel_store().await?;

    if let Some(open) = store.find_open_game_for(account_id).await? {
        return Err(ServiceError::AlreadyInGame {
            account_id,
            game_id: open.id,
        });
    }

    // A caller never joins a game they already participate in; the filter
    // covers the window between the guard above and the pool lookup.
    let waiting = store
        .find_waiting_game()
        .await?
        .filter(|game| !game.has_account(account_id));

    if let Some(waiting) = waiting {
        // Draw before touching the game so an exhausted bank rejects the
        // join outright instead of leaving a half-joined row behind.
        let questions =
            question_bank::draw_assignments(state, state.config().questions_per_game()).await?;

        let player = PlayerEntity {
            id: Uuid::new_v4(),
            account_id,
            game_id: waiting.id,
            score: 0,
        };
        let expected_revision = waiting.revision;
        let joined = game::join_game(waiting, &player, questions, SystemTime::now())?;

        store.save_player(player.clone()).await?;
        if store.update_game(joined.clone(), expected_revision).await? {
            info!(game_id = %joined.id, account_id = %account_id, "joined waiting game");
            return view_service::assemble(state, joined).await;
        }

        // Lost the claim race: drop the provisional player row and open a
        // fresh waiting game instead.
        debug!(game_id = %joined.id, "waiting game claimed by another connect");
        store.delete_player(player.id).await?;
    }

    let game_id = Uuid::new_v4();
    let player = PlayerEntity {
        id: Uuid::new_v4(),
        account_id,
        game_id,
        score: 0,
    };
    let pending = game::new_pending_game(game_id, &player, SystemTime::now());

    store.save_player(player).await?;
    store.insert_game(pending.clone()).await?;
    info!(game_id = %pending.id, account_id = %account_id, "opened waiting game");

    view_service::assemble(state, pending).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::models::GameStatusEntity,
        dto::game::GameStatusDto,
        services::test_support,
    };

    #[tokio::test]
    async fn first_connect_opens_a_waiting_game() {
        let state = test_support::state_with_bank(6, 8).await;
        let account = Uuid::from_u128(1);

        let view = connect(&state, account).await.unwrap();
        assert_eq!(view.status, GameStatusDto::PendingSecondPlayer);
        assert!(view.questions.is_none());
        assert_eq!(view.players.len(), 1);
        assert_eq!(view.players[0].account_id, account);
        assert_eq!(view.players[0].score, 0);
    }

    #[tokio::test]
    async fn second_connect_joins_and_assigns_the_question_set() {
        let state = test_support::state_with_bank(6, 8).await;
        let first = Uuid::from_u128(1);
        let second = Uuid::from_u128(2);

        let pending = connect(&state, first).await.unwrap();
        let active = connect(&state, second).await.unwrap();

        assert_eq!(active.id, pending.id);
        assert_eq!(active.status, GameStatusDto::Active);
        assert!(active.started_at.is_some());
        assert_eq!(active.players.len(), 2);
        assert_eq!(active.questions.as_ref().unwrap().len(), 6);

        // Both players answer the same set; bindings are distinct questions.
        let store = state.duel_store().await.unwrap();
        let game = store.find_game(active.id).await.unwrap().unwrap();
        assert_eq!(game.status, GameStatusEntity::Active);
        let mut ids = game
            .questions
            .iter()
            .map(|binding| binding.question_id)
            .collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[tokio::test]
    async fn connect_with_an_open_game_is_rejected() {
        let state = test_support::state_with_bank(6, 8).await;
        let account = Uuid::from_u128(1);

        connect(&state, account).await.unwrap();
        let err = connect(&state, account).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyInGame { .. }));
    }

    #[tokio::test]
    async fn join_is_rejected_when_the_bank_cannot_fill_the_set() {
        let state = test_support::state_with_bank(6, 3).await;
        let first = Uuid::from_u128(1);
        let second = Uuid::from_u128(2);

        // Opening a waiting game needs no questions yet.
        connect(&state, first).await.unwrap();

        let err = connect(&state, second).await.unwrap_err();
        assert!(matches!(err, ServiceError::ConfigurationExhausted { .. }));

        // The waiting game must be untouched by the failed join.
        let store = state.duel_store().await.unwrap();
        let waiting = store.find_waiting_game().await.unwrap().unwrap();
        assert_eq!(waiting.status, GameStatusEntity::PendingSecondPlayer);
        assert!(waiting.player_two.is_none());
        assert!(waiting.questions.is_empty());
    }

    #[tokio::test]
    async fn concurrent_connects_claim_one_game_exactly_once() {
        let state = test_support::state_with_bank(6, 8).await;
        let opener = Uuid::from_u128(1);

        connect(&state, opener).await.unwrap();

        let (left, right) = tokio::join!(
            connect(&state, Uuid::from_u128(2)),
            connect(&state, Uuid::from_u128(3)),
        );
        let left = left.unwrap();
        let right = right.unwrap();

        // Exactly one of the two callers joined the opener's game; the other
        // fell through to opening a fresh waiting game.
        let statuses = [left.status, right.status];
        assert!(statuses.contains(&GameStatusDto::Active));
        assert!(statuses.contains(&GameStatusDto::PendingSecondPlayer));
        assert_ne!(left.id, right.id);

        let active = if left.status == GameStatusDto::Active {
            &left
        } else {
            &right
        };
        assert_eq!(active.players.len(), 2);
        assert_eq!(active.questions.as_ref().unwrap().len(), 6);
    }
}
