//! Error types for caret navigation
//!
//! "Nothing to do" outcomes (not a shortcut, no selection) are not errors;
//! they are reported as [`crate::controller::Activation::Ignored`].

use thiserror::Error;

use crate::annotation::NodeId;

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, CaretError>;

/// Result type for collaborator calls
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Failure reported by a host collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Rejected by host: {0}")]
    Rejected(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Host unavailable: {0}")]
    Unavailable(String),
}

/// Controller error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaretError {
    /// A collaborator call failed part-way through an activation
    #[error("{operation} failed: {source}")]
    Collaborator {
        operation: &'static str,
        #[source]
        source: HostError,
    },

    /// Neither the adder nor a temporary highlight could provide a position
    #[error("No anchor available for the editor")]
    MissingAnchor,

    /// Editor signals arrived out of order or for an unknown draft
    #[error("Inconsistent editor state: {0}")]
    InconsistentState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CaretError {
    pub(crate) fn collaborator(operation: &'static str) -> impl FnOnce(HostError) -> Self {
        move |source| CaretError::Collaborator { operation, source }
    }
}

impl From<serde_json::Error> for CaretError {
    fn from(err: serde_json::Error) -> Self {
        CaretError::InvalidConfig(err.to_string())
    }
}
