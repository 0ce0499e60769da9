//! Typed errors for directory fetches.

use thiserror::Error;

/// Failure of a single directory fetch.
///
/// All variants are local to the picker that issued the fetch; none of them
/// affect connectivity or other tabs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Service-provided message, or a generic status message.
        message: String,
    },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not a device list.
    #[error("invalid directory response: {0}")]
    Parse(String),

    /// The configured directory URL is unusable.
    #[error("invalid directory URL: {0}")]
    InvalidUrl(String),
}
