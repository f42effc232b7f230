//! Server error types.

use std::io;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (listener bind, accept, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed payload from the platform.
    #[error("Protocol error: {0}")]
    Protocol(#[from] eventrepeater_protocol::ProtocolError),

    /// A remote platform call failed.
    #[error("Platform error: {0}")]
    Platform(#[from] eventrepeater_platform::PlatformError),

    /// Gateway connection or session failure.
    #[error("Gateway error: {message}")]
    Gateway { message: String },

    /// Inbound request failed signature verification.
    #[error("Invalid request signature: {reason}")]
    InvalidSignature { reason: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
        }
    }

    /// Creates a signature verification error.
    pub fn invalid_signature(reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            reason: reason.into(),
        }
    }
}
