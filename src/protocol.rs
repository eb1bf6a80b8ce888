//! Wire-compatible protocol types for the arena scoring panel channel.
//!
//! Every type in this module produces the same JSON the arena server reads
//! and writes on a scoring panel websocket: messages are framed as
//! `{"type": <name>, "data": <payload>}` envelopes, with PascalCase field
//! names inside the payloads.
//!
//! Outbound messages are [`PanelCommand`]s; inbound messages are
//! [`ArenaEvent`]s. Neither side acknowledges individual messages: a
//! command's effect, if accepted, arrives back as a later
//! [`realtimeScore`](ArenaEvent::RealtimeScore) snapshot.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Enums ───────────────────────────────────────────────────────────

/// The alliance a scoring panel is stationed on.
///
/// Fixed for the lifetime of a client session: it selects the websocket
/// endpoint at connect time and the sub-record of every realtime-score
/// snapshot afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllianceColor {
    Red,
    Blue,
}

impl AllianceColor {
    /// The opposing alliance.
    pub fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

impl fmt::Display for AllianceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

/// Severity of a recorded foul.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoulSeverity {
    Minor,
    Major,
}

impl FoulSeverity {
    /// Parse the foul-type token used by scoring UIs ("tech" maps to a
    /// major foul, anything else to a minor one).
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("tech") {
            Self::Major
        } else {
            Self::Minor
        }
    }

    /// Whether this severity is reported as a major foul on the wire.
    pub fn is_major(self) -> bool {
        matches!(self, Self::Major)
    }
}

// ── Payload structs ─────────────────────────────────────────────────

/// Payload for the `matchLoad` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchLoadPayload {
    #[serde(rename = "Match")]
    pub match_info: MatchInfo,
}

/// Identity of the loaded match: display name plus team assignments by
/// alliance station. A team number of `0` means the station is vacant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchInfo {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub red1: u32,
    #[serde(default)]
    pub red2: u32,
    #[serde(default)]
    pub red3: u32,
    #[serde(default)]
    pub blue1: u32,
    #[serde(default)]
    pub blue2: u32,
    #[serde(default)]
    pub blue3: u32,
}

impl MatchInfo {
    /// Team numbers for the given alliance, by station position 1-3.
    /// Vacant stations (`0` on the wire) come back as `None`.
    pub fn alliance_teams(&self, alliance: AllianceColor) -> [Option<u32>; 3] {
        let raw = match alliance {
            AllianceColor::Red => [self.red1, self.red2, self.red3],
            AllianceColor::Blue => [self.blue1, self.blue2, self.blue3],
        };
        raw.map(|team| (team > 0).then_some(team))
    }
}

/// Payload for the `matchTime` event.
///
/// `match_state` is a numeric phase code resolved through
/// [`MatchPhase::from_code`](crate::phase::MatchPhase::from_code);
/// `countdown_sec` is the server-computed remaining time for the phase.
/// The client never ticks a clock of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchTimePayload {
    pub match_state: i32,
    #[serde(default)]
    pub countdown_sec: i64,
}

/// Payload for the `realtimeScore` event: one snapshot per alliance.
///
/// Either side may be absent (e.g. partial broadcasts during arena
/// resets); an absent record is a no-op for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RealtimeScorePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<AllianceSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<AllianceSnapshot>,
}

impl RealtimeScorePayload {
    /// The sub-record for the given alliance, if present.
    pub fn alliance(&self, alliance: AllianceColor) -> Option<&AllianceSnapshot> {
        match alliance {
            AllianceColor::Red => self.red.as_ref(),
            AllianceColor::Blue => self.blue.as_ref(),
        }
    }
}

/// Authoritative scoring state for one alliance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllianceSnapshot {
    #[serde(default)]
    pub score: ScoreFields,
    #[serde(default)]
    pub hub_active: bool,
    /// Set once the server has accepted this alliance's score commit.
    #[serde(default)]
    pub score_committed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_summary: Option<ScoreSummary>,
}

/// Raw score fields mirrored verbatim into the rendered view.
///
/// `fuel` is an open schema: the set of shift labels is defined by the
/// season's ruleset on the server and copied through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreFields {
    #[serde(default)]
    pub tower_levels: [u8; 3],
    #[serde(default)]
    pub tower_auto: [bool; 3],
    #[serde(default)]
    pub fuel: BTreeMap<String, i64>,
    #[serde(default)]
    pub fouls: Vec<FoulRecord>,
}

/// A single foul assessed against an alliance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FoulRecord {
    #[serde(default)]
    pub foul_id: i64,
    #[serde(default)]
    pub is_major: bool,
}

/// Server-computed totals forwarded to hub-style displays. Display-only
/// passthrough; the client performs no arithmetic on these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreSummary {
    #[serde(default)]
    pub total_fuel: i64,
    #[serde(rename = "FuelNextRPThreshold", default)]
    pub fuel_next_rp_threshold: i64,
}

// ── Messages ────────────────────────────────────────────────────────

/// Commands sent from the scoring panel to the arena server.
///
/// Commands propose score deltas; the server validates them and echoes the
/// authoritative result back as a `realtimeScore` snapshot. The client never
/// mutates score state locally on send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "PascalCase"
)]
pub enum PanelCommand {
    /// Set one tower position's level and auto flag.
    Tower {
        team_position: u8,
        level: u8,
        is_auto: bool,
    },
    /// Adjust a fuel counter for the named shift. No client-side clamping;
    /// the server owns bounds.
    Fuel { shift: String, adjustment: i64 },
    /// Record a foul against an alliance.
    AddFoul {
        alliance: AllianceColor,
        is_major: bool,
    },
    /// Declare this alliance's score final for the current match.
    CommitMatch,
}

/// Events received from the arena server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ArenaEvent {
    /// A new match was loaded; all panel state resets.
    MatchLoad(MatchLoadPayload),
    /// Phase code plus remaining seconds, pushed on every clock tick.
    MatchTime(MatchTimePayload),
    /// Auxiliary timing metadata (period durations etc.). Passed through
    /// untouched for displays that want it.
    MatchTiming(serde_json::Value),
    /// Authoritative per-alliance score snapshot.
    RealtimeScore(RealtimeScorePayload),
    /// Clear locally-held session state (the committed lock). Sent on
    /// connect and whenever a committed match is reloaded or edited.
    ResetLocalState,
    /// The server asks displays to reload themselves.
    Reload,
    /// A rejected command's explanation. Informational only; the
    /// authoritative correction arrives as the next score snapshot.
    Error(String),
}
