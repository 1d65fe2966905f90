//! Unified error types surfaced by the runtime API.
//!
//! Wraps worker coordination failures and the rule violations reported by the
//! scenario so clients can bubble them up with consistent context.
use armada_core::{ErrorSeverity, GameError};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::events::Topic;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("no event channel for topic {0}")]
    UnknownTopic(Topic),

    #[error(transparent)]
    Game(#[from] GameError),
}

impl RuntimeError {
    /// The rule violation behind this error, if any.
    pub fn game_error(&self) -> Option<&GameError> {
        match self {
            RuntimeError::Game(err) => Some(err),
            _ => None,
        }
    }

    /// Plumbing failures are fatal; rule violations keep their own severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Game(err) => err.severity(),
            RuntimeError::UnknownTopic(_) => ErrorSeverity::Validation,
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_) => ErrorSeverity::Fatal,
        }
    }
}
