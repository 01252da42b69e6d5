//! Pipeline-specific error types.

use crate::pipeline::id::ObserverId;
use thiserror::Error;

/// Errors that can occur within the block graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Node '{identifier}' has no observer wired")]
    UnwiredObserver { identifier: String },

    #[error("Identifier '{0}' is already registered in this graph")]
    IdentifierCollision(String),

    #[error("Node '{identifier}' holds {expected}, got {found}")]
    TypeMismatch {
        identifier: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Unknown observer: {0}")]
    UnknownObserver(ObserverId),

    #[error("Node '{0}' is wired, its identifier can no longer change")]
    IdentifierLocked(String),

    #[error("Node identifier must not be empty")]
    EmptyIdentifier,

    #[error("Node '{0}' is already wired to an observer")]
    AlreadyWired(String),

    #[error("Node '{0}' is derived and cannot be written by a producer")]
    ReadOnly(String),

    #[error("Notification cascade exceeded depth {0}")]
    CascadeOverflow(usize),

    #[error("Observer '{observer}' failed: {message}")]
    Observer { observer: String, message: String },

    #[error("Channel send error")]
    ChannelSend,

    #[error("Graph worker is not running")]
    NotRunning,
}

impl PipelineError {
    /// Build a [`PipelineError::Observer`] error.
    pub fn observer(observer: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Observer {
            observer: observer.into(),
            message: message.into(),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
