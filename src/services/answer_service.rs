use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::models::{AnswerEntity, AnswerStatusEntity, GameEntity, GameStatusEntity, PlayerEntity},
    dto::answer::{AnswerRecord, SubmitAnswerRequest},
    error::ServiceError,
    services::{question_bank, view_service},
    state::{
        SharedState,
        game::{self, FinishEvaluation, ParticipantProgress},
    },
};

/// Record one answer for the caller's next unanswered question, score it, and
/// re-evaluate the finish condition of the owning game.
///
/// Only the caller's own rows are written here; the single cross-player
/// contention point is the finish transition, which goes through the game
/// revision compare-and-swap.
pub async fn submit(
    state: &SharedState,
    account_id: Uuid,
    request: SubmitAnswerRequest,
) -> Result<AnswerRecord, ServiceError> {
    let store = state.require_duel_store().await?;

    let game = store
        .find_open_game_for(account_id)
        .await?
        .filter(|game| matches!(game.status, GameStatusEntity::Active))
        .ok_or(ServiceError::NotInActiveGame { account_id })?;

    let mut player = resolve_caller_player(state, &game, account_id).await?;
    let answers = store.answers_of_player(player.id).await?;

    let Some(binding) = game::next_unanswered(&game.questions, &answers) else {
        return Err(ServiceError::AllQuestionsAnswered { game_id: game.id });
    };

    let question = question_bank::load_question(state, binding.question_id).await?;
    let status = if game::answer_matches(&question, &request.answer) {
        AnswerStatusEntity::Correct
    } else {
        AnswerStatusEntity::Incorrect
    };

    let answer = AnswerEntity {
        id: Uuid::new_v4(),
        player_id: player.id,
        question_id: question.id,
        status,
        answered_at: SystemTime::now(),
    };

    // The score lands before the answer row: finish detection on the other
    // side only counts answers, so whoever observes the final answer also
    // observes the final score.
    if status == AnswerStatusEntity::Correct {
        player.score += 1;
        store.save_player(player.clone()).await?;
    }
    store.insert_answer(answer.clone()).await?;
    debug!(
        game_id = %game.id,
        player_id = %player.id,
        position = binding.position,
        status = ?status,
        "answer recorded"
    );

    resolve_finish(state, game).await?;

    Ok(answer.into())
}

/// The caller's player row within the game.
async fn resolve_caller_player(
    state: &SharedState,
    game: &GameEntity,
    account_id: Uuid,
) -> Result<PlayerEntity, ServiceError> {
    let store = state.require_duel_store().await?;

    let mut player_ids = vec![game.player_one];
    player_ids.extend(game.player_two);

    for player_id in player_ids {
        let Some(player) = store.find_player(player_id).await? else {
            return Err(ServiceError::NotFound(format!(
                "player `{player_id}` not found"
            )));
        };
        if player.account_id == account_id {
            return Ok(player);
        }
    }

    // The game was selected by account membership, so this only triggers on
    // inconsistent rows.
    Err(ServiceError::NotInActiveGame { account_id })
}

/// Evaluate the finish condition and close the game when both participants
/// exhausted the question set.
///
/// Both finishing submissions may run this concurrently. The revision
/// compare-and-swap admits exactly one writer: the winner stamps the finish
/// time and awards the speed bonus, the loser observes a claimed revision and
/// no-ops.
async fn resolve_finish(state: &SharedState, game: GameEntity) -> Result<(), ServiceError> {
    let store = state.require_duel_store().await?;

    let Some(second_player) = game.player_two else {
        return Ok(());
    };

    let one = view_service::load_progress(&store, game.player_one).await?;
    let two = view_service::load_progress(&store, second_player).await?;

    let questions_per_game = game.questions.len();
    match game::evaluate_finish(questions_per_game, &one, &two) {
        FinishEvaluation::StillRunning => Ok(()),
        FinishEvaluation::Complete { bonus_recipient } => {
            let game_id = game.id;
            let expected_revision = game.revision;
            let finished = game::finish_game(game, SystemTime::now())?;

            if !store.update_game(finished, expected_revision).await? {
                // The concurrent finishing submission already closed the
                // game; this side must not award anything.
                debug!(game_id = %game_id, "game already finished by concurrent submission");
                return Ok(());
            }

            if let Some(player_id) = bonus_recipient {
                let mut faster = if one.player.id == player_id {
                    one.player
                } else {
                    two.player
                };
                faster.score += 1;
                store.save_player(faster).await?;
            }

            info!(game_id = %game_id, bonus = ?bonus_recipient, "game finished");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::game::{AnswerStatusDto, GameStatusDto},
        services::{matchmaking_service, test_support, view_service},
    };

    fn answer(text: &str) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            answer: text.into(),
        }
    }

    #[tokio::test]
    async fn submitting_without_a_game_is_rejected() {
        let state = test_support::state_with_bank(2, 4).await;

        let err = submit(&state, Uuid::from_u128(1), answer("42"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotInActiveGame { .. }));
    }

    #[tokio::test]
    async fn submitting_against_a_waiting_game_is_rejected() {
        let state = test_support::state_with_bank(2, 4).await;
        let account = Uuid::from_u128(1);

        matchmaking_service::connect(&state, account).await.unwrap();
        let err = submit(&state, account, answer("42")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotInActiveGame { .. }));
    }

    #[tokio::test]
    async fn correct_answers_score_and_walk_the_question_set() {
        let state = test_support::state_with_bank(3, 6).await;
        let (first, second) = test_support::paired_accounts(&state).await;

        let record = submit(&state, first, answer("42")).await.unwrap();
        assert_eq!(record.status, AnswerStatusDto::Correct);

        let wrong = submit(&state, first, answer("not the answer")).await.unwrap();
        assert_eq!(wrong.status, AnswerStatusDto::Incorrect);
        assert_ne!(record.question_id, wrong.question_id);

        let third = submit(&state, first, answer("42")).await.unwrap();
        let served = [record.question_id, wrong.question_id, third.question_id];
        assert_eq!(
            served.iter().collect::<std::collections::HashSet<_>>().len(),
            3
        );

        let view = view_service::current(&state, first).await.unwrap();
        let me = view
            .players
            .iter()
            .find(|p| p.account_id == first)
            .unwrap();
        assert_eq!(me.score, 2);
        assert_eq!(me.answers.len(), 3);

        // The opponent has not answered anything; the game stays active.
        assert_eq!(view.status, GameStatusDto::Active);
        let them = view
            .players
            .iter()
            .find(|p| p.account_id == second)
            .unwrap();
        assert!(them.answers.is_empty());
    }

    #[tokio::test]
    async fn exhausted_players_are_rejected_until_the_game_closes() {
        let state = test_support::state_with_bank(2, 4).await;
        let (first, _second) = test_support::paired_accounts(&state).await;

        submit(&state, first, answer("42")).await.unwrap();
        submit(&state, first, answer("42")).await.unwrap();

        let err = submit(&state, first, answer("42")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AllQuestionsAnswered { .. }));
    }

    #[tokio::test]
    async fn repeated_text_never_reserves_an_answered_question() {
        let state = test_support::state_with_bank(3, 6).await;
        let (first, _second) = test_support::paired_accounts(&state).await;

        // Same text every time; the pipeline must still advance positions.
        let a = submit(&state, first, answer("42")).await.unwrap();
        let b = submit(&state, first, answer("42")).await.unwrap();
        let c = submit(&state, first, answer("42")).await.unwrap();

        let mut ids = vec![a.question_id, b.question_id, c.question_id];
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn full_duel_awards_the_speed_bonus_to_the_faster_player() {
        let state = test_support::state_with_bank(6, 8).await;
        let (first, second) = test_support::paired_accounts(&state).await;

        // First player rushes through all six questions correctly.
        for _ in 0..6 {
            let record = submit(&state, first, answer("42")).await.unwrap();
            assert_eq!(record.status, AnswerStatusDto::Correct);
        }

        // Game stays active while the opponent still has questions left.
        let midway = view_service::current(&state, first).await.unwrap();
        assert_eq!(midway.status, GameStatusDto::Active);

        for _ in 0..6 {
            submit(&state, second, answer("42")).await.unwrap();
        }

        let closed = view_service::view(&state, midway.id, first).await.unwrap();
        assert_eq!(closed.status, GameStatusDto::Finished);
        assert!(closed.finished_at.is_some());

        let faster = closed
            .players
            .iter()
            .find(|p| p.account_id == first)
            .unwrap();
        let slower = closed
            .players
            .iter()
            .find(|p| p.account_id == second)
            .unwrap();

        // Six correct answers plus the speed bonus against six plain.
        assert_eq!(faster.score, 7);
        assert_eq!(slower.score, 6);
        assert_eq!(faster.answers.len(), 6);
        assert_eq!(slower.answers.len(), 6);
    }

    #[tokio::test]
    async fn all_wrong_faster_player_gets_no_bonus() {
        let state = test_support::state_with_bank(2, 4).await;
        let (first, second) = test_support::paired_accounts(&state).await;

        let game_id = view_service::current(&state, first).await.unwrap().id;

        for _ in 0..2 {
            submit(&state, first, answer("wrong")).await.unwrap();
        }
        for _ in 0..2 {
            submit(&state, second, answer("42")).await.unwrap();
        }

        let view = view_service::view(&state, game_id, first).await.unwrap();
        let faster = view.players.iter().find(|p| p.account_id == first).unwrap();
        let slower = view
            .players
            .iter()
            .find(|p| p.account_id == second)
            .unwrap();
        assert_eq!(view.status, GameStatusDto::Finished);
        assert_eq!(faster.score, 0);
        assert_eq!(slower.score, 2);
    }

    #[tokio::test]
    async fn finished_games_stay_queryable_and_accounts_can_reconnect() {
        let state = test_support::state_with_bank(2, 4).await;
        let (first, second) = test_support::paired_accounts(&state).await;

        let game_id = view_service::current(&state, first).await.unwrap().id;

        for _ in 0..2 {
            submit(&state, first, answer("42")).await.unwrap();
            submit(&state, second, answer("42")).await.unwrap();
        }

        // The finished game no longer counts as open, so both accounts can
        // queue again while the old game remains readable by id.
        let closed = view_service::view(&state, game_id, first).await.unwrap();
        assert_eq!(closed.status, GameStatusDto::Finished);

        let fresh = matchmaking_service::connect(&state, first).await.unwrap();
        assert_eq!(fresh.status, GameStatusDto::PendingSecondPlayer);
        assert_ne!(fresh.id, game_id);

        // The fresh game is pending, so submissions are still rejected.
        let err = submit(&state, first, answer("42")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotInActiveGame { .. }));
    }

    #[tokio::test]
    async fn concurrent_finishing_submissions_close_the_game_once() {
        let state = test_support::state_with_bank(2, 4).await;
        let (first, second) = test_support::paired_accounts(&state).await;

        let game_id = view_service::current(&state, first).await.unwrap().id;

        submit(&state, first, answer("42")).await.unwrap();
        submit(&state, second, answer("42")).await.unwrap();

        // Both players fire their final answer concurrently. Whatever the
        // interleaving, the game must finish exactly once with exactly one
        // bonus at most.
        let (a, b) = tokio::join!(
            submit(&state, first, answer("42")),
            submit(&state, second, answer("42")),
        );
        a.unwrap();
        b.unwrap();

        let store = state.duel_store().await.unwrap();
        let game = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(game.status, GameStatusEntity::Finished);
        assert!(game.finished_at.is_some());

        // Scores: every answer was correct, so each player holds at least 2.
        // The bonus adds at most one point across both players combined.
        let one = store.find_player(game.player_one).await.unwrap().unwrap();
        let two = store
            .find_player(game.player_two.unwrap())
            .await
            .unwrap()
            .unwrap();
        let total = one.score + two.score;
        assert!(
            (4..=5).contains(&total),
            "expected 4 points plus at most one bonus, got {total}"
        );
    }
}
