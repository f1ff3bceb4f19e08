//! Error types surfaced by the arena.
//!
//! Only [`IllegalAction`] is a reportable runtime outcome: a request that the
//! current situation does not allow. [`TransitionError`] and
//! [`InvariantViolation`] mean the rules themselves were broken and are
//! classified as internal faults.

use crate::machine::TransitionError;
use crate::state::{ActionKind, ActorId, ActorState};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// The request can be retried later (e.g. once the actor is idle again).
    Recoverable,
    /// The request referenced something that does not exist.
    Validation,
    /// The rules were violated internally; indicates a bug.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Why an action could not begin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IllegalReason {
    #[error("actor is dead")]
    Dead,

    #[error("actor is busy ({0})")]
    Busy(ActorState),

    #[error("no target selected")]
    NoTarget,

    #[error("target {0} is already down")]
    TargetDown(ActorId),
}

/// An action request whose preconditions were not met. Nothing was mutated
/// and no timer was armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{actor} cannot {action}: {reason}")]
pub struct IllegalAction {
    pub actor: ActorId,
    pub action: ActionKind,
    pub reason: IllegalReason,
}

/// A broken data-model invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{actor} has health {health} but is {state}")]
    HealthStateMismatch {
        actor: ActorId,
        health: u32,
        state: ActorState,
    },

    #[error("{actor} has health {health} above its maximum {max_health}")]
    HealthAboveMax {
        actor: ActorId,
        health: u32,
        max_health: u32,
    },

    #[error("{actor} defense flag disagrees with state {state}")]
    DefenseMismatch { actor: ActorId, state: ActorState },

    #[error("{actor} pending completion disagrees with state {state}")]
    PendingMismatch { actor: ActorId, state: ActorState },
}

/// Errors returned by [`crate::Arena`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    #[error("no actor named {0:?}")]
    UnknownName(String),

    #[error("arena already holds the maximum number of actors")]
    RosterFull,

    #[error(transparent)]
    Illegal(#[from] IllegalAction),

    #[error("state machine rejected a guarded trigger for {actor}: {source}")]
    Transition {
        actor: ActorId,
        #[source]
        source: TransitionError,
    },
}

impl ArenaError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Illegal(_) => ErrorSeverity::Recoverable,
            Self::UnknownActor(_) | Self::UnknownName(_) | Self::RosterFull => {
                ErrorSeverity::Validation
            }
            Self::Transition { .. } => ErrorSeverity::Internal,
        }
    }

    /// Returns the rejected action, if this is an [`IllegalAction`].
    pub fn as_illegal(&self) -> Option<&IllegalAction> {
        match self {
            Self::Illegal(illegal) => Some(illegal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_capacity_errors_are_validation_failures() {
        assert_eq!(ArenaError::RosterFull.severity(), ErrorSeverity::Validation);
        assert_eq!(
            ArenaError::UnknownName("Ghost".to_owned()).severity(),
            ErrorSeverity::Validation
        );
        assert!(ArenaError::RosterFull.as_illegal().is_none());
    }
}
