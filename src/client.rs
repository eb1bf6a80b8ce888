//! Async client for a scoring panel session.
//!
//! [`ScoringPanelClient`] is a thin handle that communicates with a
//! background transport loop task via an unbounded MPSC channel. Panel
//! events are emitted on a bounded channel
//! ([`tokio::sync::mpsc::Receiver<PanelEvent>`]) returned from
//! [`ScoringPanelClient::start`].
//!
//! All state mutation — inbound arena events and local gestures alike —
//! funnels through one lock around the [`ScoringPanel`] state machine, so
//! messages are processed strictly in delivery order and each gesture reads
//! the state the scorekeeper actually saw.
//!
//! # Example
//!
//! ```rust,ignore
//! let transport = connect_somehow().await;
//! let config = PanelConfig::new(AllianceColor::Red).with_ruleset(Ruleset::ExclusiveAuto);
//! let (client, mut events) = ScoringPanelClient::start(transport, config);
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         PanelEvent::ScoreUpdated { view } => { /* re-render */ }
//!         PanelEvent::Disconnected { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, warn};

use crate::error::{Result, ScoringClientError};
use crate::event::PanelEvent;
use crate::panel::{PanelView, ScoringPanel};
use crate::phase::{SessionState, UiAvailability};
use crate::protocol::{AllianceColor, ArenaEvent, FoulSeverity, PanelCommand};
use crate::rules::Ruleset;
use crate::transport::Transport;

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`ScoringPanelClient`] session.
///
/// The only required field is the alliance; the ruleset defaults to
/// [`Ruleset::IndependentAuto`] and everything else has sensible defaults.
///
/// # Example
///
/// ```
/// use arena_scoring_client::client::PanelConfig;
/// use arena_scoring_client::protocol::AllianceColor;
/// use arena_scoring_client::rules::Ruleset;
///
/// let config = PanelConfig::new(AllianceColor::Blue)
///     .with_ruleset(Ruleset::ExclusiveAuto);
/// assert_eq!(config.alliance, AllianceColor::Blue);
/// ```
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Alliance this panel scores for. Fixed for the session.
    pub alliance: AllianceColor,
    /// Season scoring ruleset, selected once at session start.
    pub ruleset: Ruleset,
    /// Capacity of the bounded event channel.
    ///
    /// When the consumer cannot keep up with incoming server messages,
    /// events are dropped (with a warning logged) to avoid blocking the
    /// transport loop. The `Disconnected` event is always delivered
    /// regardless of capacity.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// Timeout for the graceful shutdown.
    ///
    /// When [`ScoringPanelClient::shutdown`] is called, the background
    /// transport loop is given this much time to close the transport and
    /// emit a final `Disconnected` event. If the timeout expires the task
    /// is aborted.
    ///
    /// Defaults to **1 second**.
    pub shutdown_timeout: Duration,
}

impl PanelConfig {
    /// Create a new configuration for the given alliance with defaults.
    pub fn new(alliance: AllianceColor) -> Self {
        Self {
            alliance,
            ruleset: Ruleset::default(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Select the season scoring ruleset.
    #[must_use]
    pub fn with_ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = ruleset;
        self
    }

    /// Set the capacity of the bounded event channel.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

// ── Client handle ───────────────────────────────────────────────────

/// Async client handle for one alliance's scoring panel session.
///
/// Created via [`ScoringPanelClient::start`], which spawns a background
/// transport loop and returns this handle together with an event receiver.
///
/// Gesture methods read the currently rendered panel state under the shared
/// lock, queue exactly one command to the transport loop, and return once
/// the message is queued (no round-trip await).
pub struct ScoringPanelClient {
    /// Sender half of the command channel to the transport loop.
    cmd_tx: mpsc::UnboundedSender<PanelCommand>,
    /// The scoring-session state machine, shared with the transport loop.
    panel: Arc<Mutex<ScoringPanel>>,
    /// Whether the transport is believed to be connected.
    connected: Arc<AtomicBool>,
    /// Handle to the background transport loop task.
    task: Option<tokio::task::JoinHandle<()>>,
    /// Oneshot sender to signal the transport loop to shut down gracefully.
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    /// Timeout for the graceful shutdown.
    shutdown_timeout: Duration,
}

impl ScoringPanelClient {
    /// Start the client transport loop and return a handle plus event receiver.
    ///
    /// # Arguments
    ///
    /// * `transport` — A connected [`Transport`] implementation (the
    ///   per-alliance panel channel).
    /// * `config` — Session configuration: alliance, ruleset, tuning.
    ///
    /// # Returns
    ///
    /// A tuple of `(client_handle, event_receiver)`. The event receiver
    /// yields [`PanelEvent`]s until the transport closes or the client
    /// shuts down.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start(
        transport: impl Transport,
        config: PanelConfig,
    ) -> (Self, mpsc::Receiver<PanelEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<PanelCommand>();
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<PanelEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let panel = Arc::new(Mutex::new(ScoringPanel::new(
            config.alliance,
            config.ruleset,
        )));
        let connected = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(transport_loop(
            transport,
            cmd_rx,
            event_tx,
            Arc::clone(&panel),
            Arc::clone(&connected),
            shutdown_rx,
        ));

        let client = Self {
            cmd_tx,
            panel,
            connected,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (client, event_rx)
    }

    // ── Gestures ────────────────────────────────────────────────────

    /// Auto-button press for a tower position (1-3).
    ///
    /// # Errors
    ///
    /// [`ScoringClientError::ControlsLocked`] outside a scoring phase,
    /// [`ScoringClientError::InvalidPosition`] for positions outside 1-3,
    /// [`ScoringClientError::NotConnected`] if the transport has closed.
    pub async fn toggle_tower_auto(&self, position: u8) -> Result<()> {
        let cmd = self.panel.lock().await.toggle_tower_auto(position)?;
        self.send(cmd)
    }

    /// Teleop-button press for a tower position (1-3).
    ///
    /// # Errors
    ///
    /// Same conditions as [`toggle_tower_auto`](Self::toggle_tower_auto).
    pub async fn cycle_tower_teleop(&self, position: u8) -> Result<()> {
        let cmd = self.panel.lock().await.cycle_tower_teleop(position)?;
        self.send(cmd)
    }

    /// Adjust the fuel counter for the named shift by ±1 (or any delta the
    /// UI wants to propose). No client-side clamping.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringClientError::ControlsLocked`] outside a scoring
    /// phase, or [`ScoringClientError::NotConnected`] if the transport has
    /// closed.
    pub async fn adjust_fuel(&self, shift: impl Into<String>, adjustment: i64) -> Result<()> {
        let cmd = self.panel.lock().await.adjust_fuel(shift, adjustment)?;
        self.send(cmd)
    }

    /// Record a foul against an alliance.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringClientError::ControlsLocked`] outside a scoring
    /// phase, or [`ScoringClientError::NotConnected`] if the transport has
    /// closed.
    pub async fn add_foul(&self, alliance: AllianceColor, severity: FoulSeverity) -> Result<()> {
        let cmd = self.panel.lock().await.add_foul(alliance, severity)?;
        self.send(cmd)
    }

    /// Declare this alliance's score final for the current match. Latches
    /// the local committed lock before the command is even queued, so a
    /// double press cannot race the server's echo.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringClientError::CommitUnavailable`] outside the
    /// post-match window or after a prior commit, or
    /// [`ScoringClientError::NotConnected`] if the transport has closed.
    pub async fn commit_match(&self) -> Result<()> {
        let cmd = self.panel.lock().await.commit_match()?;
        self.send(cmd)
    }

    // ── State accessors ─────────────────────────────────────────────

    /// Returns `true` if the transport is believed to be connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// A clone of the currently rendered panel state.
    pub async fn view(&self) -> PanelView {
        self.panel.lock().await.view().clone()
    }

    /// The current phase/commit state.
    pub async fn session(&self) -> SessionState {
        self.panel.lock().await.session()
    }

    /// The current control availability.
    pub async fn availability(&self) -> UiAvailability {
        self.panel.lock().await.availability()
    }

    /// Shut down the client, closing the transport and stopping the
    /// background task.
    ///
    /// After calling this method, the event receiver will yield `None` once
    /// the transport loop exits.
    pub async fn shutdown(&mut self) {
        debug!("ScoringPanelClient: shutdown requested");

        // Signal the transport loop to shut down gracefully.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        // Await the transport loop with a timeout. If it doesn't exit in
        // time, abort it so the task cannot detach and run indefinitely.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("transport loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("transport loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("transport loop aborted: {join_err}");
                    }
                }
            }
        }

        self.connected.store(false, Ordering::Release);
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Queue a `PanelCommand` to the transport loop.
    fn send(&self, cmd: PanelCommand) -> Result<()> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(ScoringClientError::NotConnected);
        }
        self.cmd_tx
            .send(cmd)
            .map_err(|_| ScoringClientError::NotConnected)
    }
}

impl std::fmt::Debug for ScoringPanelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringPanelClient")
            .field("connected", &self.is_connected())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for ScoringPanelClient {
    fn drop(&mut self) {
        // `Drop` is synchronous so we cannot await a graceful shutdown.
        // The only safe action is to abort the spawned task, which causes
        // the transport loop future to be dropped immediately. The
        // `shutdown_tx` oneshot is intentionally *not* sent here: sending
        // it would trigger a graceful path that calls async
        // `transport.close()`, but there is no executor context to drive
        // it inside `Drop`.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Transport loop ──────────────────────────────────────────────────

/// Background transport loop that multiplexes send/receive via `tokio::select!`.
///
/// Exits when:
/// - The command channel closes (client handle dropped or shutdown called)
/// - The transport returns `None` (server closed connection)
/// - A transport error occurs
async fn transport_loop(
    mut transport: impl Transport,
    mut cmd_rx: mpsc::UnboundedReceiver<PanelCommand>,
    event_tx: mpsc::Sender<PanelEvent>,
    panel: Arc<Mutex<ScoringPanel>>,
    connected: Arc<AtomicBool>,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) {
    debug!("transport loop started");

    // Emit the synthetic Connected event before entering the select loop.
    emit_event(&event_tx, PanelEvent::Connected).await;

    loop {
        tokio::select! {
            // Branch 1: outgoing command from the client handle
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => {
                        debug!("sending panel command: {:?}", std::mem::discriminant(&cmd));
                        match serde_json::to_string(&cmd) {
                            Ok(json) => {
                                if let Err(e) = transport.send(json).await {
                                    error!("transport send error: {e}");
                                    emit_disconnected(
                                        &event_tx,
                                        &connected,
                                        Some(format!("transport send error: {e}")),
                                    ).await;
                                    break;
                                }
                            }
                            Err(e) => {
                                error!("failed to serialize PanelCommand: {e}");
                                // Serialization errors are programming bugs; don't kill the loop.
                            }
                        }
                    }
                    // Command channel closed — client handle dropped.
                    None => {
                        debug!("command channel closed, shutting down transport loop");
                        let _ = transport.close().await;
                        emit_disconnected(&event_tx, &connected, Some("client shut down".into())).await;
                        break;
                    }
                }
            }

            // Branch 2: shutdown signal
            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                let _ = transport.close().await;
                emit_disconnected(&event_tx, &connected, Some("client shut down".into())).await;
                break;
            }

            // Branch 3: incoming message from the arena server
            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => {
                        match serde_json::from_str::<ArenaEvent>(&text) {
                            Ok(arena_event) => {
                                let event = apply_arena_event(&panel, arena_event).await;
                                emit_event(&event_tx, event).await;
                            }
                            Err(e) => {
                                warn!("failed to deserialize arena event: {e} — raw: {text}");
                            }
                        }
                    }
                    Some(Err(e)) => {
                        error!("transport receive error: {e}");
                        emit_disconnected(
                            &event_tx,
                            &connected,
                            Some(format!("transport receive error: {e}")),
                        ).await;
                        break;
                    }
                    // Transport closed cleanly.
                    None => {
                        debug!("transport closed by server");
                        emit_disconnected(&event_tx, &connected, None).await;
                        break;
                    }
                }
            }
        }
    }

    debug!("transport loop exited");
}

/// Apply an inbound [`ArenaEvent`] to the panel state machine and build the
/// [`PanelEvent`] describing the result. Runs atomically under the panel
/// lock, so a concurrent gesture sees either the whole update or none of it.
async fn apply_arena_event(panel: &Mutex<ScoringPanel>, event: ArenaEvent) -> PanelEvent {
    let mut panel = panel.lock().await;
    match event {
        ArenaEvent::MatchLoad(payload) => {
            panel.on_match_load(&payload);
            debug!("match loaded: {}", panel.view().match_name);
            PanelEvent::MatchLoaded {
                match_name: panel.view().match_name.clone(),
                teams: panel.view().teams,
            }
        }
        ArenaEvent::MatchTime(payload) => {
            panel.on_match_time(&payload);
            PanelEvent::TimeUpdated {
                phase: panel.session().phase,
                countdown_sec: payload.countdown_sec,
                availability: panel.availability(),
            }
        }
        ArenaEvent::MatchTiming(value) => {
            panel.on_match_timing(value.clone());
            PanelEvent::TimingUpdated { data: value }
        }
        ArenaEvent::RealtimeScore(payload) => {
            panel.on_realtime_score(&payload);
            PanelEvent::ScoreUpdated {
                view: panel.view().clone(),
            }
        }
        ArenaEvent::ResetLocalState => {
            panel.on_reset_local_state();
            debug!("local state reset by server");
            PanelEvent::LocalStateReset {
                availability: panel.availability(),
            }
        }
        ArenaEvent::Reload => PanelEvent::ReloadRequested,
        ArenaEvent::Error(message) => {
            warn!("server rejected a command: {message}");
            PanelEvent::ServerError { message }
        }
    }
}

/// Emit an event to the event channel. If the channel is full, log a warning
/// and drop the event to avoid blocking the transport loop.
async fn emit_event(event_tx: &mpsc::Sender<PanelEvent>, event: PanelEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(
                "event channel full, dropping event: {:?}",
                std::mem::discriminant(&dropped)
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

/// Emit a [`Disconnected`](PanelEvent::Disconnected) event and clear the
/// connected flag.
///
/// Uses `send().await` (blocking) instead of `try_send` because
/// `Disconnected` is always the last event on the channel and must never be
/// silently dropped.
async fn emit_disconnected(
    event_tx: &mpsc::Sender<PanelEvent>,
    connected: &AtomicBool,
    reason: Option<String>,
) {
    connected.store(false, Ordering::Release);
    let event = PanelEvent::Disconnected { reason };
    if event_tx.send(event).await.is_err() {
        debug!("event channel closed, receiver dropped");
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::protocol::{
        AllianceSnapshot, MatchInfo, MatchLoadPayload, MatchTimePayload, RealtimeScorePayload,
        ScoreFields,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    // ── Mock transport ──────────────────────────────────────────────

    /// A mock transport that records sent messages and replays scripted
    /// responses.
    struct MockTransport {
        /// Messages that `recv()` will yield in order.
        incoming: VecDeque<Option<std::result::Result<String, ScoringClientError>>>,
        /// Recorded outgoing messages.
        sent: Arc<StdMutex<Vec<String>>>,
        /// Whether `close()` was called.
        closed: Arc<AtomicBool>,
    }

    impl MockTransport {
        fn new(
            incoming: Vec<Option<std::result::Result<String, ScoringClientError>>>,
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
        async fn send(&mut self, message: String) -> std::result::Result<(), ScoringClientError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Option<std::result::Result<String, ScoringClientError>> {
            if let Some(item) = self.incoming.pop_front() {
                // An explicit `None` entry signals a clean transport close;
                // `Some(result)` delivers the scripted message or error.
                item
            } else {
                // All scripted messages have been delivered — hang forever
                // so the transport loop stays alive until shutdown.
                std::future::pending().await
            }
        }

        async fn close(&mut self) -> std::result::Result<(), ScoringClientError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn reset_local_state_json() -> String {
        serde_json::to_string(&ArenaEvent::ResetLocalState).unwrap()
    }

    fn match_time_json(code: i32, countdown: i64) -> String {
        serde_json::to_string(&ArenaEvent::MatchTime(MatchTimePayload {
            match_state: code,
            countdown_sec: countdown,
        }))
        .unwrap()
    }

    fn match_load_json() -> String {
        serde_json::to_string(&ArenaEvent::MatchLoad(MatchLoadPayload {
            match_info: MatchInfo {
                long_name: "Qualification 3".into(),
                red1: 254,
                red2: 971,
                red3: 1678,
                blue1: 1114,
                blue2: 2056,
                blue3: 0,
            },
        }))
        .unwrap()
    }

    fn realtime_score_json(levels: [u8; 3], autos: [bool; 3]) -> String {
        serde_json::to_string(&ArenaEvent::RealtimeScore(RealtimeScorePayload {
            red: Some(AllianceSnapshot {
                score: ScoreFields {
                    tower_levels: levels,
                    tower_auto: autos,
                    ..ScoreFields::default()
                },
                ..AllianceSnapshot::default()
            }),
            blue: None,
        }))
        .unwrap()
    }

    fn start_red(
        incoming: Vec<Option<std::result::Result<String, ScoringClientError>>>,
    ) -> (
        ScoringPanelClient,
        mpsc::Receiver<PanelEvent>,
        Arc<StdMutex<Vec<String>>>,
        Arc<AtomicBool>,
    ) {
        let (transport, sent, closed) = MockTransport::new(incoming);
        let config = PanelConfig::new(AllianceColor::Red);
        let (client, events) = ScoringPanelClient::start(transport, config);
        (client, events, sent, closed)
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn connected_is_first_event() {
        let (mut client, mut events, _sent, _closed) = start_red(vec![]);

        let first = events.recv().await.unwrap();
        assert!(
            matches!(first, PanelEvent::Connected),
            "expected Connected as first event, got {first:?}"
        );

        client.shutdown().await;
    }

    #[tokio::test]
    async fn match_time_event_updates_availability() {
        let (mut client, mut events, _sent, _closed) =
            start_red(vec![Some(Ok(match_time_json(5, 97)))]);

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        if let PanelEvent::TimeUpdated {
            countdown_sec,
            availability,
            ..
        } = event
        {
            assert_eq!(countdown_sec, 97);
            assert!(availability.scoring_available);
            assert!(availability.in_teleop);
        } else {
            panic!("expected TimeUpdated, got {event:?}");
        }

        assert!(client.availability().await.scoring_available);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn match_load_event_carries_tracked_roster() {
        let (mut client, mut events, _sent, _closed) = start_red(vec![Some(Ok(match_load_json()))]);

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        if let PanelEvent::MatchLoaded { match_name, teams } = event {
            assert_eq!(match_name, "Qualification 3");
            assert_eq!(teams, [Some(254), Some(971), Some(1678)]);
        } else {
            panic!("expected MatchLoaded, got {event:?}");
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn gesture_sends_command_over_transport() {
        let (mut client, mut events, sent, _closed) =
            start_red(vec![Some(Ok(match_time_json(5, 60)))]);

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // TimeUpdated

        client.cycle_tower_teleop(2).await.unwrap();

        // Give the loop a moment to process.
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let messages = sent.lock().unwrap();
            assert_eq!(messages.len(), 1);
            let cmd: PanelCommand = serde_json::from_str(&messages[0]).unwrap();
            assert_eq!(
                cmd,
                PanelCommand::Tower {
                    team_position: 2,
                    level: 1,
                    is_auto: false,
                }
            );
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn locked_gesture_sends_nothing() {
        let (mut client, mut events, sent, _closed) = start_red(vec![]);

        let _ = events.recv().await; // Connected

        let result = client.adjust_fuel("auto", 1).await;
        assert!(matches!(result, Err(ScoringClientError::ControlsLocked)));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(sent.lock().unwrap().is_empty());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn commit_latches_before_echo() {
        let (mut client, mut events, sent, _closed) =
            start_red(vec![Some(Ok(match_time_json(6, 0)))]);

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // TimeUpdated (post-match)

        client.commit_match().await.unwrap();
        let second = client.commit_match().await;
        assert!(matches!(second, Err(ScoringClientError::CommitUnavailable)));

        tokio::time::sleep(Duration::from_millis(50)).await;
        {
            let messages = sent.lock().unwrap();
            assert_eq!(messages.len(), 1);
            let cmd: PanelCommand = serde_json::from_str(&messages[0]).unwrap();
            assert_eq!(cmd, PanelCommand::CommitMatch);
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn reset_event_unlocks_commit() {
        // Inbound-only sequence: the snapshot echo latches the commit, the
        // reset clears it. Frames are processed strictly in delivery order.
        let committed_snapshot = serde_json::to_string(&ArenaEvent::RealtimeScore(
            RealtimeScorePayload {
                red: Some(AllianceSnapshot {
                    score_committed: true,
                    ..AllianceSnapshot::default()
                }),
                blue: None,
            },
        ))
        .unwrap();

        let (mut client, mut events, _sent, _closed) = start_red(vec![
            Some(Ok(match_time_json(6, 0))),
            Some(Ok(committed_snapshot)),
            Some(Ok(reset_local_state_json())),
        ]);

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // TimeUpdated
        let _ = events.recv().await; // ScoreUpdated (latches commit)

        let event = events.recv().await.unwrap();
        if let PanelEvent::LocalStateReset { availability } = event {
            assert!(availability.commit_available);
        } else {
            panic!("expected LocalStateReset, got {event:?}");
        }

        assert!(!client.session().await.committed);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn score_event_renders_view() {
        let (mut client, mut events, _sent, _closed) = start_red(vec![Some(Ok(
            realtime_score_json([0, 3, 0], [true, false, false]),
        ))]);

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        if let PanelEvent::ScoreUpdated { view } = event {
            assert!(view.towers[0].auto_selected);
            assert_eq!(view.towers[1].teleop_label, "Level 3");
        } else {
            panic!("expected ScoreUpdated, got {event:?}");
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_frame_is_skipped() {
        let (mut client, mut events, _sent, _closed) = start_red(vec![
            Some(Ok("{not json".into())),
            Some(Ok(match_time_json(3, 12))),
        ]);

        let _ = events.recv().await; // Connected
        // The malformed frame is dropped; the next event still arrives.
        let event = events.recv().await.unwrap();
        assert!(matches!(event, PanelEvent::TimeUpdated { .. }));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn disconnected_on_transport_close() {
        let (mut client, mut events, _sent, _closed) =
            start_red(vec![Some(Ok(match_time_json(3, 10))), None]);

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // TimeUpdated
        let event = events.recv().await.unwrap();
        assert!(matches!(event, PanelEvent::Disconnected { .. }));
        assert!(!client.is_connected());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn transport_recv_error_emits_disconnected() {
        let (mut client, mut events, _sent, _closed) = start_red(vec![Some(Err(
            ScoringClientError::TransportReceive("boom".into()),
        ))]);

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        if let PanelEvent::Disconnected { reason } = event {
            assert!(reason.unwrap().contains("boom"));
        } else {
            panic!("expected Disconnected, got {event:?}");
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn not_connected_error_after_shutdown() {
        let (mut client, mut events, _sent, _closed) =
            start_red(vec![Some(Ok(match_time_json(5, 30)))]);

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // TimeUpdated

        client.shutdown().await;

        let result = client.adjust_fuel("teleop", 1).await;
        assert!(matches!(result, Err(ScoringClientError::NotConnected)));
    }

    #[tokio::test]
    async fn shutdown_emits_disconnected_and_closes_transport() {
        let (mut client, mut events, _sent, closed) = start_red(vec![]);

        let _ = events.recv().await; // Connected
        client.shutdown().await;

        let event = events.recv().await.unwrap();
        if let PanelEvent::Disconnected { reason } = event {
            assert_eq!(reason.as_deref(), Some("client shut down"));
        } else {
            panic!("expected Disconnected, got {event:?}");
        }
        assert!(closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn double_shutdown_does_not_panic() {
        let (mut client, mut events, _sent, _closed) = start_red(vec![]);

        let _ = events.recv().await; // Connected

        client.shutdown().await;
        client.shutdown().await; // should not panic
    }

    #[tokio::test]
    async fn drop_without_explicit_shutdown() {
        let (client, mut events, _sent, _closed) = start_red(vec![]);

        let _ = events.recv().await; // Connected

        // Drop the client without calling shutdown; the transport loop
        // should exit and close the channel without hanging.
        drop(client);
        while let Some(_event) = events.recv().await {}
    }

    #[tokio::test]
    async fn config_defaults() {
        let config = PanelConfig::new(AllianceColor::Red);
        assert_eq!(config.alliance, AllianceColor::Red);
        assert_eq!(config.ruleset, Ruleset::IndependentAuto);
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn config_builder_methods() {
        let config = PanelConfig::new(AllianceColor::Blue)
            .with_ruleset(Ruleset::ExclusiveAuto)
            .with_event_channel_capacity(0)
            .with_shutdown_timeout(Duration::from_secs(5));
        assert_eq!(config.ruleset, Ruleset::ExclusiveAuto);
        // Capacity is clamped to at least 1.
        assert_eq!(config.event_channel_capacity, 1);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn event_channel_backpressure_does_not_block() {
        // More clock ticks than the event channel can hold.
        let mut incoming: Vec<Option<std::result::Result<String, ScoringClientError>>> =
            Vec::new();
        for i in 0i64..20 {
            incoming.push(Some(Ok(match_time_json(5, 120 - i))));
        }
        incoming.push(None);

        let (transport, _sent, _closed) = MockTransport::new(incoming);
        let config = PanelConfig::new(AllianceColor::Red).with_event_channel_capacity(1);
        let (mut client, mut events) = ScoringPanelClient::start(transport, config);

        // Let the channel fill up and events get dropped.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut count = 0;
        while let Some(_event) = events.recv().await {
            count += 1;
        }
        // Connected (first try_send) and Disconnected (blocking send) always
        // arrive; intermediate ticks may be dropped.
        assert!(count >= 2, "expected at least 2 events, got {count}");
        assert!(
            count < 22,
            "expected backpressure to drop some events, but got all {count}"
        );

        client.shutdown().await;
    }
}
