//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and the arena so clients can
//! bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::{ArenaError, ErrorSeverity, IllegalAction};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("encounter has no actors")]
    EmptyRoster,

    #[error("arena worker command channel closed")]
    CommandChannelClosed,

    #[error("arena worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("arena worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Arena(#[from] ArenaError),
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Arena(err) => err.severity(),
            Self::EmptyRoster => ErrorSeverity::Validation,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    /// The refused action, when the arena rejected a request.
    pub fn as_illegal(&self) -> Option<&IllegalAction> {
        match self {
            Self::Arena(err) => err.as_illegal(),
            _ => None,
        }
    }
}
