//! The scoring-session state machine.
//!
//! [`ScoringPanel`] owns everything a scoring panel renders and every rule
//! about what a scorekeeper may do next. Inbound arena events mutate the
//! single [`PanelView`] state tree; gestures read the *currently rendered*
//! state (never a shadow copy), and turn it into exactly one outgoing
//! [`PanelCommand`]. The panel never mutates score values locally; every
//! proposal is echoed back by the server as the next snapshot.
//!
//! Handlers are synchronous and run to completion one at a time; the async
//! client layer serializes all access through a single lock, which preserves
//! the in-order processing the design relies on.

use std::collections::BTreeMap;

use crate::error::{Result, ScoringClientError};
use crate::phase::{countdown_string, MatchPhase, SessionState, UiAvailability};
use crate::protocol::{
    AllianceColor, ArenaEvent, FoulSeverity, MatchLoadPayload, MatchTimePayload, PanelCommand,
    RealtimeScorePayload, ScoreSummary,
};
use crate::rules::{Ruleset, SlotView, TowerSlot};

/// Foul counts for one alliance, split by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoulCounts {
    pub minor: u32,
    pub major: u32,
}

/// Mirror of the server's foul lists, tallied per alliance and severity.
/// Never computed locally beyond increment requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoulTally {
    pub red: FoulCounts,
    pub blue: FoulCounts,
}

impl FoulTally {
    fn tally(payload: &RealtimeScorePayload) -> Self {
        let count = |alliance: AllianceColor| {
            payload
                .alliance(alliance)
                .map(|snap| {
                    snap.score.fouls.iter().fold(
                        FoulCounts::default(),
                        |mut counts, foul| {
                            if foul.is_major {
                                counts.major += 1;
                            } else {
                                counts.minor += 1;
                            }
                            counts
                        },
                    )
                })
                .unwrap_or_default()
        };
        Self {
            red: count(AllianceColor::Red),
            blue: count(AllianceColor::Blue),
        }
    }

    /// Count for one `(alliance, severity)` cell.
    pub fn count(&self, alliance: AllianceColor, severity: FoulSeverity) -> u32 {
        let counts = match alliance {
            AllianceColor::Red => self.red,
            AllianceColor::Blue => self.blue,
        };
        match severity {
            FoulSeverity::Minor => counts.minor,
            FoulSeverity::Major => counts.major,
        }
    }
}

/// The single rendered UI state tree.
///
/// The rendering layer reads from this value and never queries state back
/// from the view. Everything here is overwritten wholesale by the event that
/// owns it; nothing accumulates.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    /// Display name of the loaded match.
    pub match_name: String,
    /// Team numbers for the tracked alliance by station position; `None`
    /// renders as a blank label.
    pub teams: [Option<u32>; 3],
    /// Header text for the current phase.
    pub phase_text: &'static str,
    /// Server-pushed countdown, formatted `M:SS`.
    pub countdown: String,
    /// Rendered tower buttons, by station position.
    pub towers: [SlotView; 3],
    /// Fuel counters keyed by shift label; copied verbatim from snapshots.
    pub fuel: BTreeMap<String, i64>,
    /// Hub activation indicator. Display only.
    pub hub_active: bool,
    /// Foul tallies mirrored from the latest snapshot.
    pub fouls: FoulTally,
    /// Optional server-computed totals for hub-style readouts.
    pub score_summary: Option<ScoreSummary>,
    /// Auxiliary timing metadata, passed through untouched.
    pub match_timing: Option<serde_json::Value>,
}

impl PanelView {
    fn new() -> Self {
        Self {
            match_name: String::new(),
            teams: [None; 3],
            phase_text: MatchPhase::PreMatch.display_text(),
            countdown: countdown_string(0),
            towers: [SlotView::default(); 3],
            fuel: BTreeMap::new(),
            hub_active: false,
            fouls: FoulTally::default(),
            score_summary: None,
            match_timing: None,
        }
    }
}

/// State machine for one alliance's scoring session.
pub struct ScoringPanel {
    alliance: AllianceColor,
    ruleset: Ruleset,
    session: SessionState,
    view: PanelView,
}

impl ScoringPanel {
    /// Create a fresh panel for the given alliance and season ruleset.
    pub fn new(alliance: AllianceColor, ruleset: Ruleset) -> Self {
        Self {
            alliance,
            ruleset,
            session: SessionState::new(),
            view: PanelView::new(),
        }
    }

    /// The alliance this panel scores for.
    pub fn alliance(&self) -> AllianceColor {
        self.alliance
    }

    /// The season ruleset selected at session start.
    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    /// Current phase/commit state.
    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Current control availability.
    pub fn availability(&self) -> UiAvailability {
        self.session.availability
    }

    /// The rendered state tree.
    pub fn view(&self) -> &PanelView {
        &self.view
    }

    // ── Inbound event handlers ──────────────────────────────────────

    /// Dispatch an inbound arena event to its handler. `Reload` and `Error`
    /// carry no panel state and are left to the caller to surface.
    pub fn handle_event(&mut self, event: &ArenaEvent) {
        match event {
            ArenaEvent::MatchLoad(payload) => self.on_match_load(payload),
            ArenaEvent::MatchTime(payload) => self.on_match_time(payload),
            ArenaEvent::MatchTiming(value) => self.on_match_timing(value.clone()),
            ArenaEvent::RealtimeScore(payload) => self.on_realtime_score(payload),
            ArenaEvent::ResetLocalState => self.on_reset_local_state(),
            ArenaEvent::Reload | ArenaEvent::Error(_) => {}
        }
    }

    /// A new match was loaded: replace the roster and reset every counter
    /// and button to its blank state. Fuel keeps its label schema with
    /// zeroed values so display cells don't vanish between matches.
    pub fn on_match_load(&mut self, payload: &MatchLoadPayload) {
        let rules = self.ruleset.rules();
        self.view.match_name = payload.match_info.long_name.clone();
        self.view.teams = payload.match_info.alliance_teams(self.alliance);
        self.view.towers = [rules.render_slot(TowerSlot::default()); 3];
        for count in self.view.fuel.values_mut() {
            *count = 0;
        }
        self.view.hub_active = false;
        self.view.fouls = FoulTally::default();
        self.view.score_summary = None;
    }

    /// A clock tick: resolve the phase code, update the displayed countdown,
    /// and recompute availability.
    pub fn on_match_time(&mut self, payload: &MatchTimePayload) {
        let phase = MatchPhase::from_code(payload.match_state);
        self.session = self.session.apply_phase(phase);
        self.view.phase_text = phase.display_text();
        self.view.countdown = countdown_string(payload.countdown_sec);
    }

    /// Stash auxiliary timing metadata for displays that want it.
    pub fn on_match_timing(&mut self, value: serde_json::Value) {
        self.view.match_timing = Some(value);
    }

    /// An authoritative score snapshot: overwrite the rendered score state
    /// wholesale. Idempotent, so the same snapshot twice produces an
    /// identical view. A snapshot without this panel's alliance is a no-op.
    pub fn on_realtime_score(&mut self, payload: &RealtimeScorePayload) {
        let Some(snapshot) = payload.alliance(self.alliance) else {
            return;
        };

        let rules = self.ruleset.rules();
        let score = &snapshot.score;
        for ((view_slot, &level), &is_auto) in self
            .view
            .towers
            .iter_mut()
            .zip(score.tower_levels.iter())
            .zip(score.tower_auto.iter())
        {
            *view_slot = rules.render_slot(TowerSlot { level, is_auto });
        }

        self.view.fuel = score.fuel.clone();
        self.view.hub_active = snapshot.hub_active;
        self.view.score_summary = snapshot.score_summary;
        self.view.fouls = FoulTally::tally(payload);

        // Server confirmation of a commit latches the local lock too, so a
        // panel that reconnects mid-post-match can't double-commit.
        if snapshot.score_committed && !self.session.committed {
            self.session = self.session.commit();
        }
    }

    /// Explicit server instruction to drop locally-held session state.
    pub fn on_reset_local_state(&mut self) {
        self.session = self.session.reset_local();
    }

    // ── Gestures ────────────────────────────────────────────────────

    /// Auto-button press for a tower position.
    pub fn toggle_tower_auto(&self, position: u8) -> Result<PanelCommand> {
        self.require_scoring()?;
        let next = self.ruleset.rules().toggle_auto(self.slot(position)?);
        Ok(next.into_command(position))
    }

    /// Teleop-button press for a tower position.
    pub fn cycle_tower_teleop(&self, position: u8) -> Result<PanelCommand> {
        self.require_scoring()?;
        let next = self.ruleset.rules().cycle_teleop(self.slot(position)?);
        Ok(next.into_command(position))
    }

    /// Plus/minus press on a fuel counter. The counter itself only changes
    /// when the next snapshot arrives; negative totals and overflow are the
    /// server's concern.
    pub fn adjust_fuel(&self, shift: impl Into<String>, adjustment: i64) -> Result<PanelCommand> {
        self.require_scoring()?;
        Ok(PanelCommand::Fuel {
            shift: shift.into(),
            adjustment,
        })
    }

    /// Record a foul against an alliance.
    pub fn add_foul(&self, alliance: AllianceColor, severity: FoulSeverity) -> Result<PanelCommand> {
        self.require_scoring()?;
        Ok(PanelCommand::AddFoul {
            alliance,
            is_major: severity.is_major(),
        })
    }

    /// Declare the score final. Latches the committed lock immediately so a
    /// second press can't race the server's echo.
    pub fn commit_match(&mut self) -> Result<PanelCommand> {
        if !self.session.availability.commit_available {
            return Err(ScoringClientError::CommitUnavailable);
        }
        self.session = self.session.commit();
        Ok(PanelCommand::CommitMatch)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn require_scoring(&self) -> Result<()> {
        if self.session.availability.scoring_available {
            Ok(())
        } else {
            Err(ScoringClientError::ControlsLocked)
        }
    }

    /// Currently rendered slot state for a 1-based tower position.
    fn slot(&self, position: u8) -> Result<TowerSlot> {
        let index = position
            .checked_sub(1)
            .ok_or(ScoringClientError::InvalidPosition(position))?;
        self.view
            .towers
            .get(usize::from(index))
            .map(|rendered| rendered.slot)
            .ok_or(ScoringClientError::InvalidPosition(position))
    }
}

impl std::fmt::Debug for ScoringPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringPanel")
            .field("alliance", &self.alliance)
            .field("ruleset", &self.ruleset)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
