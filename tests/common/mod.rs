#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for arena scoring client integration tests.
//!
//! Provides a scripted [`MockTransport`] and helper functions producing raw
//! JSON frames in the exact shape the arena server writes on a scoring
//! panel websocket (PascalCase payload fields inside a `{type, data}`
//! envelope).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use arena_scoring_client::{ScoringClientError, Transport};
use async_trait::async_trait;

// ── MockTransport ───────────────────────────────────────────────────

/// A channel-based mock transport for integration testing.
///
/// Scripted server frames are consumed in order by `recv()`. All messages
/// sent by the client are recorded in `sent`.
pub struct MockTransport {
    /// Scripted server frames (consumed in order by `recv`).
    incoming: VecDeque<Option<Result<String, ScoringClientError>>>,
    /// Recorded outgoing messages from the client.
    pub sent: Arc<StdMutex<Vec<String>>>,
    /// Whether `close()` has been called.
    pub closed: Arc<AtomicBool>,
}

impl MockTransport {
    /// Create a new mock transport with the given scripted incoming frames.
    ///
    /// Returns the transport plus shared handles for inspecting sent
    /// messages and whether close was called.
    pub fn new(
        incoming: Vec<Option<Result<String, ScoringClientError>>>,
    ) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let transport = Self {
            incoming: VecDeque::from(incoming),
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        };
        (transport, sent, closed)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), ScoringClientError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, ScoringClientError>> {
        if let Some(item) = self.incoming.pop_front() {
            item
        } else {
            // No more scripted frames — hang forever so the transport loop
            // stays alive until shutdown is called.
            std::future::pending().await
        }
    }

    async fn close(&mut self) -> Result<(), ScoringClientError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

// ── Raw server frames ───────────────────────────────────────────────

/// The `resetLocalState` frame the server sends on connect.
pub fn reset_local_state_frame() -> String {
    r#"{"type":"resetLocalState","data":null}"#.to_string()
}

/// A `matchLoad` frame with a full six-team roster.
pub fn match_load_frame(long_name: &str) -> String {
    format!(
        concat!(
            r#"{{"type":"matchLoad","data":{{"Match":{{"LongName":"{}","#,
            r#""Red1":254,"Red2":971,"Red3":1678,"#,
            r#""Blue1":1114,"Blue2":2056,"Blue3":973}}}}}}"#
        ),
        long_name
    )
}

/// A `matchTime` frame with the given phase code and countdown.
pub fn match_time_frame(phase_code: i32, countdown_sec: i64) -> String {
    format!(
        r#"{{"type":"matchTime","data":{{"MatchState":{phase_code},"CountdownSec":{countdown_sec}}}}}"#
    )
}

/// A `matchTiming` frame carrying period durations.
pub fn match_timing_frame() -> String {
    concat!(
        r#"{"type":"matchTiming","data":{"WarmupDurationSec":0,"#,
        r#""AutoDurationSec":15,"PauseDurationSec":3,"TeleopDurationSec":135}}"#
    )
    .to_string()
}

/// A `realtimeScore` frame for the red alliance with the given tower state
/// and fuel counts.
pub fn realtime_score_frame(levels: [u8; 3], autos: [bool; 3], fuel_auto: i64, fuel_teleop: i64) -> String {
    format!(
        concat!(
            r#"{{"type":"realtimeScore","data":{{"Red":{{"Score":{{"#,
            r#""TowerLevels":[{},{},{}],"TowerAuto":[{},{},{}],"#,
            r#""Fuel":{{"auto":{},"teleop":{}}},"Fouls":[]}},"#,
            r#""HubActive":true,"ScoreCommitted":false}}}}}}"#
        ),
        levels[0], levels[1], levels[2], autos[0], autos[1], autos[2], fuel_auto, fuel_teleop
    )
}

/// A `realtimeScore` frame whose red snapshot confirms a committed score.
pub fn realtime_score_committed_frame() -> String {
    concat!(
        r#"{"type":"realtimeScore","data":{"Red":{"Score":{"#,
        r#""TowerLevels":[0,0,0],"TowerAuto":[false,false,false],"#,
        r#""Fuel":{"auto":0,"teleop":0},"Fouls":[]},"#,
        r#""HubActive":false,"ScoreCommitted":true}}}"#
    )
    .to_string()
}

/// A `reload` frame (no data member, as the server writes it).
pub fn reload_frame() -> String {
    r#"{"type":"reload"}"#.to_string()
}

/// An `error` frame with the given rejection message.
pub fn error_frame(message: &str) -> String {
    format!(r#"{{"type":"error","data":"{message}"}}"#)
}
