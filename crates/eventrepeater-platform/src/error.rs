//! Error types for platform API operations.

use std::fmt;
use thiserror::Error;

/// The category of a platform error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformErrorCode {
    /// The bot token was rejected (401).
    AuthenticationFailed,
    /// The bot lacks a permission for this guild or resource (403).
    MissingPermissions,
    /// Connection failed, timed out, or the body could not be read.
    NetworkError,
    /// Too many requests (429).
    RateLimited,
    /// The platform failed (5xx).
    ServerError,
    /// The response body did not match the expected shape.
    InvalidResponse,
    /// Resource not found (404).
    NotFound,
    /// The request was rejected as invalid (400), e.g. bad timestamps.
    BadRequest,
    /// Missing or invalid local configuration.
    ConfigurationError,
}

impl PlatformErrorCode {
    /// Returns a stable name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::MissingPermissions => "missing_permissions",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for PlatformErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error returned by a platform call.
#[derive(Debug, Error)]
pub struct PlatformError {
    code: PlatformErrorCode,
    message: String,
    /// The operation that failed, e.g. `create_scheduled_event`.
    operation: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PlatformError {
    /// Creates a new error with the given code and message.
    pub fn new(code: PlatformErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            operation: None,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::AuthenticationFailed, message)
    }

    pub fn missing_permissions(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::MissingPermissions, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::NetworkError, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::InvalidResponse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::BadRequest, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::ConfigurationError, message)
    }

    /// Sets the operation that produced this error.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> PlatformErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref operation) = self.operation {
            write!(f, "[{}] ", operation)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
