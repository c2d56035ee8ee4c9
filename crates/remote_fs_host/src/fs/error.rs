//! Error taxonomy for remote filesystem operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Discriminant of a [`RemoteFsError`] without its message.
pub enum ErrorKind {
    /// The entry does not exist (or no longer exists).
    NotFound,
    /// Access was denied for the authenticated user.
    Unauthorized,
    /// The server rejected a duplicate name.
    Conflict,
    /// The request was malformed or rejected as invalid.
    Invalid,
    /// No HTTP response was received.
    NetworkError,
    /// The server failed or answered with an unusable response.
    ServerError,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Typed failure of a single remote filesystem operation.
///
/// An operation reporting any of these errors must be treated as not applied.
pub enum RemoteFsError {
    /// The entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Access was denied.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Duplicate name rejected by the server.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Malformed request or name.
    #[error("invalid request: {0}")]
    Invalid(String),
    /// Transport failure before a response was received.
    #[error("network error: {0}")]
    Network(String),
    /// Server failure or malformed server response.
    #[error("server error: {0}")]
    Server(String),
}

impl RemoteFsError {
    /// Returns the error discriminant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Network(_) => ErrorKind::NetworkError,
            Self::Server(_) => ErrorKind::ServerError,
        }
    }

    /// Returns the human-readable message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Conflict(msg)
            | Self::Invalid(msg)
            | Self::Network(msg)
            | Self::Server(msg) => msg,
        }
    }

    /// Maps a non-success HTTP status and its plain-text body to a typed error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = match body.trim() {
            "" => format!("HTTP {status}"),
            text => text.to_string(),
        };
        match status {
            401 | 403 => Self::Unauthorized(message),
            404 | 410 => Self::NotFound(message),
            409 => Self::Conflict(message),
            400..=499 => Self::Invalid(message),
            _ => Self::Server(message),
        }
    }
}

/// Result alias for remote filesystem operations.
pub type RemoteFsResult<T> = Result<T, RemoteFsError>;
