//! # Scoring Panel Example
//!
//! Demonstrates a complete scoring panel session:
//!
//! 1. Connect to the arena server via WebSocket (one channel per alliance)
//! 2. React to match load, clock, and score events
//! 3. Send a fuel adjustment once scoring opens
//! 4. Shut down gracefully on Ctrl+C or disconnect
//!
//! ## Running
//!
//! ```sh
//! # With an arena server on 10.0.100.5:8080, score for red:
//! cargo run --example scoring_panel
//!
//! # Override the server URL or alliance:
//! ARENA_URL=ws://localhost:8080 ALLIANCE=blue cargo run --example scoring_panel
//! ```

use arena_scoring_client::transports::websocket::scoring_panel_url;
use arena_scoring_client::{
    AllianceColor, PanelConfig, PanelEvent, ScoringPanelClient, WebSocketTransport,
};

/// Default arena server URL when `ARENA_URL` is not set.
const DEFAULT_URL: &str = "ws://10.0.100.5:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Initialize tracing. Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let base = std::env::var("ARENA_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let alliance = match std::env::var("ALLIANCE").as_deref() {
        Ok("blue") => AllianceColor::Blue,
        _ => AllianceColor::Red,
    };
    let url = scoring_panel_url(&base, alliance);
    tracing::info!("Connecting to {url}");

    // ── Connect ─────────────────────────────────────────────────────
    let transport = WebSocketTransport::connect(&url).await?;
    let config = PanelConfig::new(alliance);

    // Start the client. This spawns a background task that drives the
    // transport and emits events on `event_rx`.
    let (mut client, mut event_rx) = ScoringPanelClient::start(transport, config);

    // ── Event loop ──────────────────────────────────────────────────
    // Use `tokio::select!` to listen for both panel events and Ctrl+C.
    loop {
        tokio::select! {
            // Branch 1: Incoming panel event.
            event = event_rx.recv() => {
                let Some(event) = event else {
                    tracing::info!("Event channel closed, exiting");
                    break;
                };

                match event {
                    PanelEvent::Connected => {
                        tracing::info!("Transport connected, awaiting match data…");
                    }

                    PanelEvent::MatchLoaded { match_name, teams } => {
                        tracing::info!("Match loaded: {match_name}, teams {teams:?}");
                    }

                    PanelEvent::TimeUpdated { phase, countdown_sec, availability } => {
                        tracing::info!(
                            "{phase:?} ({countdown_sec}s) — scoring {}",
                            if availability.scoring_available { "open" } else { "locked" }
                        );

                        // Demonstrate a gesture the first time scoring opens.
                        if availability.scoring_available {
                            if let Err(e) = client.adjust_fuel("auto", 1).await {
                                tracing::warn!("fuel gesture refused: {e}");
                            }
                        }
                    }

                    PanelEvent::ScoreUpdated { view } => {
                        tracing::info!(
                            "score update: fuel {:?}, hub {}",
                            view.fuel,
                            if view.hub_active { "active" } else { "inactive" }
                        );
                    }

                    PanelEvent::LocalStateReset { .. } => {
                        tracing::info!("local state reset by server");
                    }

                    PanelEvent::TimingUpdated { .. } | PanelEvent::ReloadRequested => {}

                    PanelEvent::ServerError { message } => {
                        tracing::warn!("server rejected a command: {message}");
                    }

                    PanelEvent::Disconnected { reason } => {
                        tracing::info!("Disconnected: {reason:?}");
                        break;
                    }
                }
            }

            // Branch 2: Ctrl+C.
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    client.shutdown().await;
    Ok(())
}
