//! Shared error type across livetrack crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Out-of-range or missing coordinates.
    InvalidLocation,
    /// Invalid input / malformed message.
    BadRequest,
    /// Unexpected fault while handling an event.
    Processing,
    /// Surfaced by the underlying channel (abrupt disconnect, closed queue).
    Transport,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::InvalidLocation => "INVALID_LOCATION",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Processing => "PROCESSING_ERROR",
            ClientCode::Transport => "TRANSPORT",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LivetrackError>;

/// Unified error type used by core and gateway.
///
/// Mirrors the dispatcher's failure taxonomy: `InvalidLocation` is rejected
/// per-event with the registry untouched, `Processing` keeps the connection
/// open, `Transport` is treated like a graceful disconnect. No variant is
/// fatal to the process.
#[derive(Debug, Error)]
pub enum LivetrackError {
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("processing error: {0}")]
    Processing(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl LivetrackError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            LivetrackError::InvalidLocation(_) => ClientCode::InvalidLocation,
            LivetrackError::BadRequest(_) => ClientCode::BadRequest,
            LivetrackError::Processing(_) => ClientCode::Processing,
            LivetrackError::Transport(_) => ClientCode::Transport,
            LivetrackError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            LivetrackError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Message shown to the offending client over the channel.
    ///
    /// Internal detail stays in the logs; the wire gets a short generic
    /// message per error class.
    pub fn client_message(&self) -> &'static str {
        match self {
            LivetrackError::InvalidLocation(_) => "Invalid location data",
            LivetrackError::BadRequest(_) => "Malformed message",
            _ => "Error processing location data",
        }
    }
}
