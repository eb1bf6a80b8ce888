//! Typed events delivered to the embedding UI.
//!
//! The background transport loop applies each inbound
//! [`ArenaEvent`](crate::protocol::ArenaEvent) to the panel state machine,
//! then emits one [`PanelEvent`] describing what changed. Consumers receive these
//! on the bounded channel returned by
//! [`ScoringPanelClient::start`](crate::client::ScoringPanelClient::start)
//! and re-render from the data carried here — they never need to poll.

use crate::panel::PanelView;
use crate::phase::{MatchPhase, UiAvailability};

/// An event emitted by the scoring panel client.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// The transport is up. Always the first event on the channel.
    Connected,

    /// A new match was loaded; the whole panel display was reset.
    MatchLoaded {
        match_name: String,
        /// Tracked alliance's team numbers by station position.
        teams: [Option<u32>; 3],
    },

    /// A clock tick arrived: new phase, countdown, and control availability.
    TimeUpdated {
        phase: MatchPhase,
        countdown_sec: i64,
        availability: UiAvailability,
    },

    /// Auxiliary timing metadata, passed through untouched.
    TimingUpdated { data: serde_json::Value },

    /// An authoritative score snapshot was applied; `view` is the complete
    /// rendered state after the update.
    ScoreUpdated { view: PanelView },

    /// The server cleared locally-held session state (the committed lock).
    LocalStateReset { availability: UiAvailability },

    /// The server asked displays to reload themselves.
    ReloadRequested,

    /// The server rejected a command. Informational only; the
    /// authoritative correction arrives as the next score snapshot.
    ServerError { message: String },

    /// The transport closed. Always the last event on the channel.
    Disconnected { reason: Option<String> },
}
