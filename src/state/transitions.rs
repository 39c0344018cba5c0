//! Legal lifecycle transitions for games.
//!
//! Every status change, whether requested by a user or performed by a
//! background job, is validated against [`allowed_transitions`].

use thiserror::Error;

use crate::dao::models::GameStatus;

/// Error returned when a status change is not permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid status transition: {from} cannot move to {to}")]
pub struct InvalidTransition {
    /// Status the game was in.
    pub from: GameStatus,
    /// Status that was requested.
    pub to: GameStatus,
}

/// Statuses reachable from `from` in a single step.
pub fn allowed_transitions(from: GameStatus) -> &'static [GameStatus] {
    match from {
        GameStatus::Upcoming => &[GameStatus::Released, GameStatus::Cancelled],
        GameStatus::Released | GameStatus::Cancelled => &[],
    }
}

/// Whether `from -> to` is a legal transition.
pub fn can_transition(from: GameStatus, to: GameStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Validate `from -> to`, returning [`InvalidTransition`] when it is not allowed.
pub fn ensure_transition(from: GameStatus, to: GameStatus) -> Result<(), InvalidTransition> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}
