//! Transport abstraction for the scoring panel channel.
//!
//! The [`Transport`] trait defines a bidirectional text message channel
//! between a scoring panel and the arena server. The panel protocol uses
//! JSON text messages, so every transport implementation must handle message
//! framing internally (e.g., WebSocket frames, length-prefixed TCP).
//!
//! # Connection Setup
//!
//! Connection setup is intentionally NOT part of this trait — different
//! transports have fundamentally different connection parameters (URLs for
//! WebSocket, host:port for TCP). Construct a connected transport
//! externally, then pass it to
//! [`ScoringPanelClient::start`](crate::client::ScoringPanelClient::start).
//! The channel is opened per scoring session, one per alliance.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use arena_scoring_client::error::ScoringClientError;
//! use arena_scoring_client::transport::Transport;
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, message: String) -> Result<(), ScoringClientError> {
//!         // Send the JSON text message over your transport
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, ScoringClientError>> {
//!         // Receive the next JSON text message
//!         // Return None when the connection is closed cleanly
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<(), ScoringClientError> {
//!         // Gracefully shut down the connection
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ScoringClientError;

/// A bidirectional text message transport for the scoring panel channel.
///
/// Implementors shuttle serialized JSON strings between the panel and the
/// arena server. Each call to [`send`](Transport::send) transmits one
/// complete JSON message; each call to [`recv`](Transport::recv) returns one
/// complete JSON message. The client relies on the transport for in-order,
/// at-most-once delivery; reconnect/redelivery semantics are the
/// implementation's concern.
///
/// # Object Safety
///
/// This trait is object-safe, so `Box<dyn Transport>` works for dynamic
/// dispatch. However, `ScoringPanelClient::start` accepts `impl Transport`
/// (monomorphized) for the common case.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because it
/// is used inside `tokio::select!`. If `recv` is cancelled before
/// completion, calling it again must not lose data. Channel-based
/// implementations (e.g., wrapping `mpsc::Receiver`) are naturally
/// cancel-safe.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a JSON text message to the arena server.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringClientError::TransportSend`] if the message could
    /// not be sent (e.g., connection broken, write buffer full).
    async fn send(&mut self, message: String) -> Result<(), ScoringClientError>;

    /// Receive the next JSON text message from the arena server.
    ///
    /// Returns:
    /// - `Some(Ok(text))` — a complete message was received
    /// - `Some(Err(e))` — a transport error occurred (e.g., [`ScoringClientError::TransportReceive`])
    /// - `None` — the connection was closed cleanly by the server
    ///
    /// # Cancel Safety
    ///
    /// This method **MUST** be cancel-safe (see [trait documentation](Transport)).
    async fn recv(&mut self) -> Option<Result<String, ScoringClientError>>;

    /// Close the transport connection gracefully.
    ///
    /// After calling this method, subsequent calls to [`send`](Transport::send)
    /// and [`recv`](Transport::recv) may return errors or `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graceful shutdown fails. Implementations
    /// should still release resources even if the close handshake fails.
    async fn close(&mut self) -> Result<(), ScoringClientError>;
}
