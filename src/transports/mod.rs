//! Transport implementations for the scoring panel channel.
//!
//! This module provides concrete [`Transport`](crate::Transport)
//! implementations behind feature gates. Enable the corresponding Cargo
//! feature to pull in a transport:
//!
//! | Feature                | Transport              |
//! |------------------------|------------------------|
//! | `transport-websocket`  | [`WebSocketTransport`] |
//!
//! # Example
//!
//! ```rust,ignore
//! # async fn example() -> Result<(), arena_scoring_client::ScoringClientError> {
//! use arena_scoring_client::{AllianceColor, Transport, WebSocketTransport};
//! use arena_scoring_client::transports::websocket::scoring_panel_url;
//!
//! let url = scoring_panel_url("ws://10.0.100.5:8080", AllianceColor::Red);
//! let mut ws = WebSocketTransport::connect(&url).await?;
//!
//! if let Some(Ok(msg)) = ws.recv().await {
//!     println!("arena said: {msg}");
//! }
//!
//! ws.close().await?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "transport-websocket")]
pub mod websocket;

#[cfg(feature = "transport-websocket")]
pub use websocket::WebSocketTransport;
