use std::sync::Arc;

use uuid::Uuid;

use crate::{
    dao::{
        duel_store::DuelStore,
        models::{GameEntity, GameStatusEntity},
    },
    dto::game::GameView,
    error::ServiceError,
    services::question_bank,
    state::{SharedState, game::ParticipantProgress},
};

/// Build the participant-scoped snapshot of a game.
///
/// The participant check runs before any row beyond the game itself is
/// touched: an unknown id is `NotFound`, a known id requested by a stranger
/// is `ForbiddenNotParticipant`.
pub async fn view(
    state: &SharedState,
    game_id: Uuid,
    account_id: Uuid,
) -> Result<GameView, ServiceError> {
    let store = state.require_duel_store().await?;

    let Some(game) = store.find_game(game_id).await? else {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    };

    if !game.has_account(account_id) {
        return Err(ServiceError::ForbiddenNotParticipant {
            account_id,
            game_id,
        });
    }

    assemble(state, game).await
}

/// Resolve the caller's own open game and build its snapshot.
pub async fn current(state: &SharedState, account_id: Uuid) -> Result<GameView, ServiceError> {
    let store = state.require_duel_store().await?;

    let Some(game) = store.find_open_game_for(account_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "no open game for account `{account_id}`"
        )));
    };

    assemble(state, game).await
}

/// Assemble a view from a loaded game row. Callers have already verified the
/// requester participates in the game.
pub(crate) async fn assemble(
    state: &SharedState,
    game: GameEntity,
) -> Result<GameView, ServiceError> {
    let store = state.require_duel_store().await?;

    let mut participants = vec![load_progress(&store, game.player_one).await?];
    if let Some(second) = game.player_two {
        participants.push(load_progress(&store, second).await?);
    }

    // Question bodies are only disclosed once the set is assigned.
    let questions = match game.status {
        GameStatusEntity::PendingSecondPlayer => None,
        GameStatusEntity::Active | GameStatusEntity::Finished => {
            let mut bindings = game.questions.clone();
            bindings.sort_by_key(|binding| binding.position);

            let mut list = Vec::with_capacity(bindings.len());
            for binding in &bindings {
                list.push(question_bank::load_question(state, binding.question_id).await?);
            }
            Some(list)
        }
    };

    Ok(GameView::assemble(&game, participants, questions))
}

/// Load a participant's player row together with their full answer set.
pub(crate) async fn load_progress(
    store: &Arc<dyn DuelStore>,
    player_id: Uuid,
) -> Result<ParticipantProgress, ServiceError> {
    let Some(player) = store.find_player(player_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` not found"
        )));
    };
    let answers = store.answers_of_player(player.id).await?;
    Ok(ParticipantProgress { player, answers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::game::GameStatusDto,
        services::{matchmaking_service, test_support},
    };

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let state = test_support::state_with_bank(2, 4).await;
        let err = view(&state, Uuid::from_u128(7), Uuid::from_u128(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn strangers_are_rejected_before_any_disclosure() {
        let state = test_support::state_with_bank(2, 4).await;
        let opener = Uuid::from_u128(1);
        let stranger = Uuid::from_u128(2);

        let pending = matchmaking_service::connect(&state, opener).await.unwrap();

        let err = view(&state, pending.id, stranger).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::ForbiddenNotParticipant { .. }
        ));
    }

    #[tokio::test]
    async fn pending_views_carry_no_questions() {
        let state = test_support::state_with_bank(2, 4).await;
        let opener = Uuid::from_u128(1);

        let pending = matchmaking_service::connect(&state, opener).await.unwrap();
        assert_eq!(pending.status, GameStatusDto::PendingSecondPlayer);
        assert!(pending.questions.is_none());
        assert_eq!(pending.players.len(), 1);
        assert!(pending.started_at.is_none());

        let again = view(&state, pending.id, opener).await.unwrap();
        assert!(again.questions.is_none());
    }

    #[tokio::test]
    async fn active_views_list_questions_in_position_order() {
        let state = test_support::state_with_bank(3, 6).await;
        let first = Uuid::from_u128(1);
        let second = Uuid::from_u128(2);

        matchmaking_service::connect(&state, first).await.unwrap();
        let active = matchmaking_service::connect(&state, second).await.unwrap();

        let questions = active.questions.as_ref().unwrap();
        assert_eq!(questions.len(), 3);

        // The view follows the stored binding order exactly.
        let store = state.duel_store().await.unwrap();
        let game = store.find_game(active.id).await.unwrap().unwrap();
        let mut bindings = game.questions.clone();
        bindings.sort_by_key(|binding| binding.position);
        let expected = bindings
            .iter()
            .map(|binding| binding.question_id)
            .collect::<Vec<_>>();
        let listed = questions.iter().map(|q| q.id).collect::<Vec<_>>();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn current_resolves_the_open_game_or_fails() {
        let state = test_support::state_with_bank(2, 4).await;
        let account = Uuid::from_u128(1);

        let err = current(&state, account).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let pending = matchmaking_service::connect(&state, account).await.unwrap();
        let resolved = current(&state, account).await.unwrap();
        assert_eq!(resolved.id, pending.id);
    }
}
