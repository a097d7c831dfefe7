//! Error types for the core value types.

use thiserror::Error;

/// Errors raised by causality tokens, content values and codecs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0} is not a valid vector clock encoding")]
    InvalidEncoding(String),

    #[error("Malformed vector clock: {0}")]
    MalformedToken(String),

    #[error("Content is a tombstone and carries no payload")]
    Tombstone,

    #[error("No codec registered for content type: {0}")]
    NoCodec(String),

    #[error("Codec for {content_type} failed: {reason}")]
    Codec {
        content_type: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
