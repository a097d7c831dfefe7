//! Error types for record operations.

use qrc_core::CoreError;
use thiserror::Error;

/// Failures reported by a [`Transport`](crate::transport::Transport).
///
/// Records pass these through untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Precondition failed: the key already holds a value")]
    PreconditionFailed,

    #[error("Quorum not met: requested {requested}, available {available}")]
    QuorumNotMet { requested: u32, available: u32 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by records and buckets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// More than one sibling is present where a single value is required.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Key name must either be absent or a non-empty string")]
    InvalidKey,

    #[error("Resolver is not a function: {0}")]
    InvalidResolver(String),

    #[error(transparent)]
    Content(#[from] CoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub(crate) fn siblings(count: usize) -> Self {
        ClientError::Conflict(format!(
            "record has {} siblings, resolve them before accessing a single value",
            count
        ))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
