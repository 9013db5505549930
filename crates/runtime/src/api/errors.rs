//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, session construction and player
//! input so clients can bubble them up with consistent context.
use std::fmt;

use battle_core::{BattleError, ErrorSeverity, SessionError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{kind} action provider not set")]
    ProviderNotSet { kind: ProviderKind },

    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("event bus closed")]
    EventBusClosed,

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires content or a prebuilt session before building")]
    MissingContent,

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl RuntimeError {
    /// Whether the session rejected input but kept running.
    ///
    /// Worker plumbing failures and fatal session errors are not recoverable.
    pub fn is_rejected_input(&self) -> bool {
        match self {
            RuntimeError::Session(error) => matches!(
                error.severity(),
                ErrorSeverity::Recoverable | ErrorSeverity::Validation
            ),
            _ => false,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub enum ProviderKind {
    Player,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Player => "player",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{ActionError, UnitId};

    #[test]
    fn rejected_input_is_recoverable() {
        let rejected = RuntimeError::from(SessionError::Action(ActionError::NotActing(UnitId(1))));
        assert!(rejected.is_rejected_input());

        let fatal = RuntimeError::from(SessionError::EmptyTeam);
        assert!(!fatal.is_rejected_input());
        assert!(!RuntimeError::CommandChannelClosed.is_rejected_input());
    }
}
