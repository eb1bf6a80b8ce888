//! Error types for the arena scoring client.

use thiserror::Error;

/// Errors that can occur when using the scoring panel client.
#[derive(Debug, Error)]
pub enum ScoringClientError {
    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed unexpectedly.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize or deserialize a protocol message.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Attempted an operation that requires an active connection, but the client is not connected.
    #[error("not connected to arena server")]
    NotConnected,

    /// A scoring gesture was attempted while the controls are locked for the current match phase.
    #[error("scoring controls are locked in the current match phase")]
    ControlsLocked,

    /// A commit was attempted outside the post-match window, or after the score was already committed.
    #[error("score commit is not available")]
    CommitUnavailable,

    /// A tower gesture named a position outside the 1-3 range.
    #[error("tower position out of range: {0}")]
    InvalidPosition(u8),

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for scoring panel operations.
pub type Result<T> = std::result::Result<T, ScoringClientError>;
