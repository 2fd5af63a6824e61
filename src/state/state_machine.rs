use thiserror::Error;

use crate::dao::models::GameStatus;

/// Events that move a game through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A second, distinct player claimed the pending game.
    SecondPlayerJoined,
    /// Both players answered every question.
    AllQuestionsAnswered,
    /// One player finished and the other stayed silent past the grace window.
    TimedOut,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The status the game was in when the invalid event was received.
    pub from: GameStatus,
    /// The event that cannot be applied from this status.
    pub event: GameEvent,
}

/// Compute the status reached by applying `event` to a game in `from`.
///
/// `PendingSecondPlayer → Active → Finished`; every other combination is rejected,
/// in particular nothing leaves [`GameStatus::Finished`].
pub fn next_status(from: GameStatus, event: GameEvent) -> Result<GameStatus, InvalidTransition> {
    let next = match (from, event) {
        (GameStatus::PendingSecondPlayer, GameEvent::SecondPlayerJoined) => GameStatus::Active,
        (GameStatus::Active, GameEvent::AllQuestionsAnswered) => GameStatus::Finished,
        (GameStatus::Active, GameEvent::TimedOut) => GameStatus::Finished,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}
