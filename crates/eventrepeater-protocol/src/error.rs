//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while decoding platform payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Payload is not valid JSON or does not match the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A field required for this interaction type is absent.
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    /// A command option is absent or has the wrong type.
    #[error("command option `{name}` is missing or not a string")]
    InvalidOption { name: String },

    /// Gateway frame with an opcode this client does not understand.
    #[error("unsupported gateway opcode {0}")]
    UnsupportedOpcode(u8),
}

impl ProtocolError {
    /// Creates a missing field error.
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}
