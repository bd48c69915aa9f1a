//! Pure decision logic of the duel core.
//!
//! Operations load every row they need up front, feed the owned data through
//! the functions in this module, and only then write the outcome back to
//! storage. Nothing here touches the store.

use std::time::SystemTime;

use rand::{rng, seq::SliceRandom};
use uuid::Uuid;

use crate::{
    dao::models::{
        AnswerEntity, AnswerStatusEntity, GameEntity, GameQuestionEntity, GameStatusEntity,
        PlayerEntity, QuestionEntity,
    },
    state::status::{GameLifecycleEvent, InvalidTransition, advance},
};

/// One participant's loaded state: the player row plus their full answer set.
#[derive(Debug, Clone)]
pub struct ParticipantProgress {
    /// Player row of the participant.
    pub player: PlayerEntity,
    /// Every answer the participant recorded, in submission order.
    pub answers: Vec<AnswerEntity>,
}

impl ParticipantProgress {
    /// Timestamp of the participant's most recent answer.
    fn last_answered_at(&self) -> Option<SystemTime> {
        self.answers.iter().map(|answer| answer.answered_at).max()
    }

    /// Whether at least one recorded answer was correct.
    fn has_correct_answer(&self) -> bool {
        self.answers
            .iter()
            .any(|answer| answer.status == AnswerStatusEntity::Correct)
    }
}

/// Outcome of evaluating the finish condition after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishEvaluation {
    /// At least one participant still has unanswered questions.
    StillRunning,
    /// Both participants exhausted the question set.
    Complete {
        /// Player row id of the speed-bonus recipient: the participant whose
        /// last answer landed strictly earlier, provided they answered at
        /// least one question correctly. `None` on an exact timestamp tie or
        /// when the faster participant got everything wrong.
        bonus_recipient: Option<Uuid>,
    },
}

/// The next question to serve: the lowest-position binding whose question has
/// no answer row for this participant yet.
pub fn next_unanswered<'a>(
    bindings: &'a [GameQuestionEntity],
    answers: &[AnswerEntity],
) -> Option<&'a GameQuestionEntity> {
    bindings
        .iter()
        .filter(|binding| {
            answers
                .iter()
                .all(|answer| answer.question_id != binding.question_id)
        })
        .min_by_key(|binding| binding.position)
}

/// Case-insensitive exact match of a trimmed submission against the accepted
/// answers of a question.
pub fn answer_matches(question: &QuestionEntity, submission: &str) -> bool {
    let submission = submission.trim();
    question
        .accepted_answers
        .iter()
        .any(|accepted| accepted.trim().eq_ignore_ascii_case(submission))
}

/// Evaluate the finish condition for a game with the given assignment size.
pub fn evaluate_finish(
    questions_per_game: usize,
    one: &ParticipantProgress,
    two: &ParticipantProgress,
) -> FinishEvaluation {
    if one.answers.len() < questions_per_game || two.answers.len() < questions_per_game {
        return FinishEvaluation::StillRunning;
    }

    let faster = match (one.last_answered_at(), two.last_answered_at()) {
        (Some(first), Some(second)) if first < second => Some(one),
        (Some(first), Some(second)) if second < first => Some(two),
        // Exact tie: no deterministic faster player exists.
        _ => None,
    };

    let bonus_recipient = faster
        .filter(|participant| participant.has_correct_answer())
        .map(|participant| participant.player.id);

    FinishEvaluation::Complete { bonus_recipient }
}

/// Shuffle the published bank and bind the first `count` questions to
/// positions `1..=count`. Returns `None` when the bank cannot fill the set.
pub fn draw_assignments(
    mut bank: Vec<QuestionEntity>,
    count: usize,
) -> Option<Vec<GameQuestionEntity>> {
    if bank.len() < count {
        return None;
    }

    bank.shuffle(&mut rng());
    Some(
        bank.into_iter()
            .take(count)
            .enumerate()
            .map(|(index, question)| GameQuestionEntity {
                question_id: question.id,
                position: index as u32 + 1,
            })
            .collect(),
    )
}

/// Build a fresh waiting game opened by `player`.
pub fn new_pending_game(id: Uuid, player: &PlayerEntity, created_at: SystemTime) -> GameEntity {
    GameEntity {
        id,
        player_one: player.id,
        player_two: None,
        accounts: vec![player.account_id],
        status: GameStatusEntity::PendingSecondPlayer,
        questions: Vec::new(),
        created_at,
        started_at: None,
        finished_at: None,
        revision: 0,
    }
}

/// Attach a second participant to a waiting game, assign the question set and
/// bump the revision. The caller races the result through the store's
/// compare-and-swap.
pub fn join_game(
    mut game: GameEntity,
    second_player: &PlayerEntity,
    questions: Vec<GameQuestionEntity>,
    started_at: SystemTime,
) -> Result<GameEntity, InvalidTransition> {
    game.status = advance(game.status, GameLifecycleEvent::SecondPlayerJoined)?;
    game.player_two = Some(second_player.id);
    game.accounts.push(second_player.account_id);
    game.questions = questions;
    game.started_at = Some(started_at);
    game.revision += 1;
    Ok(game)
}

/// Close out a game whose participants both exhausted the question set.
pub fn finish_game(
    mut game: GameEntity,
    finished_at: SystemTime,
) -> Result<GameEntity, InvalidTransition> {
    game.status = advance(game.status, GameLifecycleEvent::BothPlayersExhausted)?;
    game.finished_at = Some(finished_at);
    game.revision += 1;
    Ok(game)
}
