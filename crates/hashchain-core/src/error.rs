//! Error types for hash chain operations

use thiserror::Error;

/// Result type alias for hash chain operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors that can occur while building, validating or moving a chain
#[derive(Debug, Error)]
pub enum ChainError {
    /// Malformed external representation, or nothing to serialize
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Hash linkage violated at the given index
    #[error("Broken chain at index {index}: {reason}")]
    BrokenChain {
        /// Index of the first link that fails verification
        index: u64,
        /// What failed at that link
        reason: String,
    },

    /// No link with this index
    #[error("Index not found: {0}")]
    IndexNotFound(u64),

    /// No link with this hash
    #[error("Hash not found: {0}")]
    HashNotFound(String),

    /// Invalid constructor argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Payload could not be encoded or decoded
    #[error("Payload codec error: {0}")]
    Codec(String),

    /// No serializer registered under this key
    #[error("Unknown serializer: {0}")]
    UnknownSerializer(String),

    /// Registry has no default serializer
    #[error("No default serializer configured")]
    NoDefaultSerializer,

    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChainError {
    /// Shorthand for a linkage failure
    pub fn broken(index: u64, reason: impl Into<String>) -> Self {
        ChainError::BrokenChain {
            index,
            reason: reason.into(),
        }
    }

    /// Index carried by a linkage failure, if any
    pub fn broken_index(&self) -> Option<u64> {
        match self {
            ChainError::BrokenChain { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

impl From<quick_xml::DeError> for ChainError {
    fn from(err: quick_xml::DeError) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for ChainError {
    fn from(err: base64::DecodeError) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for ChainError {
    fn from(err: bincode::Error) -> Self {
        ChainError::Codec(err.to_string())
    }
}
