#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Integration tests for the scoring panel client.
//!
//! Uses the shared `MockTransport` from `tests/common` to script raw server
//! frames (in the arena server's exact JSON shape) and verify that
//! `ScoringPanelClient` processes them correctly: availability gating,
//! commit locking, gesture-to-command translation, and view rendering.

mod common;

use arena_scoring_client::protocol::FoulSeverity;
use arena_scoring_client::rules::Ruleset;
use arena_scoring_client::{
    AllianceColor, PanelCommand, PanelConfig, PanelEvent, ScoringClientError, ScoringPanelClient,
};

use common::{
    error_frame, match_load_frame, match_time_frame, match_timing_frame,
    realtime_score_committed_frame, realtime_score_frame, reload_frame, reset_local_state_frame,
    MockTransport,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Start a red-alliance client with the given scripted server frames.
#[allow(clippy::type_complexity)]
fn start_client(
    ruleset: Ruleset,
    incoming: Vec<Option<Result<String, ScoringClientError>>>,
) -> (
    ScoringPanelClient,
    tokio::sync::mpsc::Receiver<PanelEvent>,
    std::sync::Arc<std::sync::Mutex<Vec<String>>>,
) {
    let (transport, sent, _closed) = MockTransport::new(incoming);
    let config = PanelConfig::new(AllianceColor::Red).with_ruleset(ruleset);
    let (client, events) = ScoringPanelClient::start(transport, config);
    (client, events, sent)
}

/// Consume events until one matches `pred`, panicking if the channel ends.
async fn recv_until(
    rx: &mut tokio::sync::mpsc::Receiver<PanelEvent>,
    pred: impl Fn(&PanelEvent) -> bool,
) -> PanelEvent {
    loop {
        let event = rx.recv().await.expect("event channel closed early");
        if pred(&event) {
            return event;
        }
    }
}

/// Parse every sent frame back into a typed command.
fn sent_commands(sent: &std::sync::Mutex<Vec<String>>) -> Vec<PanelCommand> {
    sent.lock()
        .unwrap()
        .iter()
        .map(|raw| serde_json::from_str(raw).expect("sent frame should parse as PanelCommand"))
        .collect()
}

// ── Whole-session flow ──────────────────────────────────────────────

#[tokio::test]
async fn full_match_session_flow() {
    let (client, mut events, sent) = start_client(
        Ruleset::IndependentAuto,
        vec![
            Some(Ok(reset_local_state_frame())),
            Some(Ok(match_load_frame("Qualification 10"))),
            Some(Ok(match_timing_frame())),
            Some(Ok(match_time_frame(3, 15))), // autonomous
        ],
    );

    let event = recv_until(&mut events, |e| matches!(e, PanelEvent::MatchLoaded { .. })).await;
    if let PanelEvent::MatchLoaded { match_name, teams } = event {
        assert_eq!(match_name, "Qualification 10");
        assert_eq!(teams, [Some(254), Some(971), Some(1678)]);
    }

    let event = recv_until(&mut events, |e| matches!(e, PanelEvent::TimeUpdated { .. })).await;
    if let PanelEvent::TimeUpdated { availability, .. } = event {
        assert!(availability.scoring_available);
        assert!(!availability.commit_available);
    }

    // Score a tower auto climb during autonomous.
    client.toggle_tower_auto(1).await.unwrap();
    // And bank some fuel.
    client.adjust_fuel("auto", 1).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let commands = sent_commands(&sent);
    assert_eq!(
        commands,
        vec![
            PanelCommand::Tower {
                team_position: 1,
                level: 0,
                is_auto: true,
            },
            PanelCommand::Fuel {
                shift: "auto".into(),
                adjustment: 1,
            },
        ]
    );

    let mut client = client;
    client.shutdown().await;
}

#[tokio::test]
async fn commit_refused_outside_post_match() {
    let (client, mut events, sent) = start_client(
        Ruleset::IndependentAuto,
        vec![Some(Ok(match_time_frame(5, 30)))], // teleop
    );

    recv_until(&mut events, |e| matches!(e, PanelEvent::TimeUpdated { .. })).await;

    // Teleop: scoring yes, commit no.
    assert!(matches!(
        client.commit_match().await,
        Err(ScoringClientError::CommitUnavailable)
    ));

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(sent.lock().unwrap().is_empty());

    let mut client = client;
    client.shutdown().await;
}

#[tokio::test]
async fn commit_locks_session_in_post_match() {
    let (client, mut events, sent) = start_client(
        Ruleset::IndependentAuto,
        vec![Some(Ok(match_time_frame(6, 0)))], // post-match
    );

    recv_until(&mut events, |e| {
        matches!(e, PanelEvent::TimeUpdated { availability, .. } if availability.commit_available)
    })
    .await;

    client.commit_match().await.unwrap();

    // The lock holds against a second press and against scoring gestures.
    assert!(matches!(
        client.commit_match().await,
        Err(ScoringClientError::CommitUnavailable)
    ));
    assert!(matches!(
        client.cycle_tower_teleop(1).await,
        Err(ScoringClientError::ControlsLocked)
    ));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(sent_commands(&sent), vec![PanelCommand::CommitMatch]);

    let mut client = client;
    client.shutdown().await;
}

#[tokio::test]
async fn reset_local_state_reopens_commit_window() {
    // The server latches the commit through a snapshot echo, then clears it
    // with an explicit reset — a pure inbound sequence, processed strictly
    // in delivery order.
    let (client, mut events, _sent) = start_client(
        Ruleset::IndependentAuto,
        vec![
            Some(Ok(match_time_frame(6, 0))),
            Some(Ok(realtime_score_committed_frame())),
            Some(Ok(reset_local_state_frame())),
        ],
    );

    let event = recv_until(&mut events, |e| matches!(e, PanelEvent::ScoreUpdated { .. })).await;
    assert!(matches!(event, PanelEvent::ScoreUpdated { .. }));

    let event = recv_until(&mut events, |e| {
        matches!(e, PanelEvent::LocalStateReset { .. })
    })
    .await;
    if let PanelEvent::LocalStateReset { availability } = event {
        assert!(availability.commit_available);
    }
    assert!(!client.session().await.committed);

    // The window is genuinely open again.
    client.commit_match().await.unwrap();
    assert!(client.session().await.committed);

    let mut client = client;
    client.shutdown().await;
}

// ── Score synchronization ───────────────────────────────────────────

#[tokio::test]
async fn snapshot_overwrites_rendered_state() {
    let (client, mut events, _sent) = start_client(
        Ruleset::IndependentAuto,
        vec![
            Some(Ok(match_time_frame(5, 100))),
            Some(Ok(realtime_score_frame(
                [2, 0, 1],
                [true, false, false],
                4,
                17,
            ))),
        ],
    );

    let event = recv_until(&mut events, |e| matches!(e, PanelEvent::ScoreUpdated { .. })).await;
    let PanelEvent::ScoreUpdated { view } = event else {
        unreachable!()
    };

    assert_eq!(view.towers[0].teleop_label, "Level 2");
    assert!(view.towers[0].auto_selected);
    assert_eq!(view.towers[2].teleop_label, "Level 1");
    assert_eq!(view.fuel.get("auto"), Some(&4));
    assert_eq!(view.fuel.get("teleop"), Some(&17));
    assert!(view.hub_active);

    let mut client = client;
    client.shutdown().await;
}

#[tokio::test]
async fn exclusive_ruleset_auto_level_one_wins_over_stale_teleop() {
    let (client, mut events, _sent) = start_client(
        Ruleset::ExclusiveAuto,
        vec![
            Some(Ok(match_time_frame(5, 100))),
            // Position 2 carries both an auto flag and a stale level 1.
            Some(Ok(realtime_score_frame(
                [0, 1, 0],
                [false, true, false],
                0,
                0,
            ))),
        ],
    );

    let event = recv_until(&mut events, |e| matches!(e, PanelEvent::ScoreUpdated { .. })).await;
    let PanelEvent::ScoreUpdated { view } = event else {
        unreachable!()
    };

    assert_eq!(view.towers[1].auto_label, "Level 1");
    assert!(view.towers[1].auto_selected);
    assert_eq!(view.towers[1].teleop_label, "None");
    assert!(!view.towers[1].teleop_selected);

    let mut client = client;
    client.shutdown().await;
}

// ── Ruleset gesture differences ─────────────────────────────────────

#[tokio::test]
async fn exclusive_ruleset_teleop_cycle_skips_level_one() {
    let (client, mut events, sent) = start_client(
        Ruleset::ExclusiveAuto,
        vec![Some(Ok(match_time_frame(5, 60)))],
    );

    recv_until(&mut events, |e| matches!(e, PanelEvent::TimeUpdated { .. })).await;

    // From a blank slot, the first teleop press proposes level 2.
    client.cycle_tower_teleop(3).await.unwrap();
    // The auto press proposes level 1 with the auto flag.
    client.toggle_tower_auto(3).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(
        sent_commands(&sent),
        vec![
            PanelCommand::Tower {
                team_position: 3,
                level: 2,
                is_auto: false,
            },
            PanelCommand::Tower {
                team_position: 3,
                level: 1,
                is_auto: true,
            },
        ]
    );

    let mut client = client;
    client.shutdown().await;
}

#[tokio::test]
async fn foul_gesture_sends_severity_on_the_wire() {
    let (client, mut events, sent) = start_client(
        Ruleset::IndependentAuto,
        vec![Some(Ok(match_time_frame(5, 60)))],
    );

    recv_until(&mut events, |e| matches!(e, PanelEvent::TimeUpdated { .. })).await;

    client
        .add_foul(AllianceColor::Blue, FoulSeverity::from_token("tech"))
        .await
        .unwrap();
    client
        .add_foul(AllianceColor::Red, FoulSeverity::from_token("standard"))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(
        sent_commands(&sent),
        vec![
            PanelCommand::AddFoul {
                alliance: AllianceColor::Blue,
                is_major: true,
            },
            PanelCommand::AddFoul {
                alliance: AllianceColor::Red,
                is_major: false,
            },
        ]
    );

    let mut client = client;
    client.shutdown().await;
}

// ── Passthrough frames ──────────────────────────────────────────────

#[tokio::test]
async fn reload_and_error_frames_are_surfaced() {
    let (client, mut events, _sent) = start_client(
        Ruleset::IndependentAuto,
        vec![
            Some(Ok(reload_frame())),
            Some(Ok(error_frame("Cannot commit score: Match is not over."))),
        ],
    );

    let event = recv_until(&mut events, |e| {
        matches!(e, PanelEvent::ReloadRequested | PanelEvent::ServerError { .. })
    })
    .await;
    assert!(matches!(event, PanelEvent::ReloadRequested));

    let event = recv_until(&mut events, |e| matches!(e, PanelEvent::ServerError { .. })).await;
    if let PanelEvent::ServerError { message } = event {
        assert!(message.contains("Match is not over"));
    }

    let mut client = client;
    client.shutdown().await;
}

#[tokio::test]
async fn timing_metadata_passes_through() {
    let (client, mut events, _sent) = start_client(
        Ruleset::IndependentAuto,
        vec![Some(Ok(match_timing_frame()))],
    );

    let event = recv_until(&mut events, |e| {
        matches!(e, PanelEvent::TimingUpdated { .. })
    })
    .await;
    if let PanelEvent::TimingUpdated { data } = event {
        assert_eq!(data.get("AutoDurationSec").and_then(|v| v.as_i64()), Some(15));
    }

    let mut client = client;
    client.shutdown().await;
}
