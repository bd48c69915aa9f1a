use thiserror::Error;

use crate::dao::models::GameStatusEntity;

/// Events that move a game through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameLifecycleEvent {
    /// A second participant joined a waiting game.
    SecondPlayerJoined,
    /// Both participants answered every assigned question.
    BothPlayersExhausted,
}

/// Error returned when attempting to apply an invalid lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The status the game was in when the invalid event was received.
    pub from: GameStatusEntity,
    /// The event that cannot be applied from this status.
    pub event: GameLifecycleEvent,
}

/// Compute the next status for an event, rejecting anything but the two
/// forward transitions. A game never regresses and never skips a stage.
pub fn advance(
    from: GameStatusEntity,
    event: GameLifecycleEvent,
) -> Result<GameStatusEntity, InvalidTransition> {
    match (from, event) {
        (GameStatusEntity::PendingSecondPlayer, GameLifecycleEvent::SecondPlayerJoined) => {
            Ok(GameStatusEntity::Active)
        }
        (GameStatusEntity::Active, GameLifecycleEvent::BothPlayersExhausted) => {
            Ok(GameStatusEntity::Finished)
        }
        (from, event) => Err(InvalidTransition { from, event }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_advances_to_active_on_join() {
        assert_eq!(
            advance(
                GameStatusEntity::PendingSecondPlayer,
                GameLifecycleEvent::SecondPlayerJoined
            ),
            Ok(GameStatusEntity::Active)
        );
    }

    #[test]
    fn active_advances_to_finished_on_exhaustion() {
        assert_eq!(
            advance(
                GameStatusEntity::Active,
                GameLifecycleEvent::BothPlayersExhausted
            ),
            Ok(GameStatusEntity::Finished)
        );
    }

    #[test]
    fn every_other_pair_is_rejected() {
        let statuses = [
            GameStatusEntity::PendingSecondPlayer,
            GameStatusEntity::Active,
            GameStatusEntity::Finished,
        ];
        let events = [
            GameLifecycleEvent::SecondPlayerJoined,
            GameLifecycleEvent::BothPlayersExhausted,
        ];

        for from in statuses {
            for event in events {
                let valid = matches!(
                    (from, event),
                    (
                        GameStatusEntity::PendingSecondPlayer,
                        GameLifecycleEvent::SecondPlayerJoined
                    ) | (
                        GameStatusEntity::Active,
                        GameLifecycleEvent::BothPlayersExhausted
                    )
                );
                if valid {
                    continue;
                }

                let err = advance(from, event).unwrap_err();
                assert_eq!(err.from, from);
                assert_eq!(err.event, event);
            }
        }
    }

    #[test]
    fn finished_is_terminal() {
        for event in [
            GameLifecycleEvent::SecondPlayerJoined,
            GameLifecycleEvent::BothPlayersExhausted,
        ] {
            assert!(advance(GameStatusEntity::Finished, event).is_err());
        }
    }
}
