//! # Arena Scoring Client
//!
//! Transport-agnostic Rust client for a competition arena's alliance
//! scoring panel.
//!
//! A human scorekeeper watches a match unfold and records scoring events in
//! real time. This crate keeps the panel's controls consistent with the
//! arena's authoritative match clock and scoreboard: phase events gate which
//! controls are live, score snapshots overwrite the rendered state
//! wholesale, and button gestures become single outgoing commands that the
//! server validates and echoes back. The client never mutates score state
//! directly.
//!
//! ## Features
//!
//! - **Transport-agnostic** — implement the [`Transport`] trait for any backend
//! - **Wire-compatible** — protocol types match the arena server's JSON exactly
//! - **WebSocket built-in** — default `transport-websocket` feature provides `WebSocketTransport`
//! - **Season rulesets** — two tower scoring rule-sets selectable per session
//! - **Event-driven** — receive typed [`PanelEvent`]s via a channel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arena_scoring_client::{
//!     AllianceColor, PanelConfig, PanelEvent, ScoringPanelClient, WebSocketTransport,
//! };
//! use arena_scoring_client::transports::websocket::scoring_panel_url;
//!
//! let url = scoring_panel_url("ws://10.0.100.5:8080", AllianceColor::Red);
//! let transport = WebSocketTransport::connect(&url).await?;
//! let (client, mut events) = ScoringPanelClient::start(transport, PanelConfig::new(AllianceColor::Red));
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         PanelEvent::ScoreUpdated { view } => { /* re-render */ }
//!         PanelEvent::Disconnected { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod event;
pub mod panel;
pub mod phase;
pub mod protocol;
pub mod rules;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use client::{PanelConfig, ScoringPanelClient};
pub use error::ScoringClientError;
pub use event::PanelEvent;
pub use panel::{PanelView, ScoringPanel};
pub use phase::{MatchPhase, SessionState, UiAvailability};
pub use protocol::{AllianceColor, ArenaEvent, FoulSeverity, PanelCommand};
pub use rules::{Ruleset, ScoringRules, TowerSlot};
pub use transport::Transport;

#[cfg(feature = "transport-websocket")]
pub use transports::WebSocketTransport;
