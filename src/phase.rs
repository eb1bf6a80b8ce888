//! Match phase tracking and control availability.
//!
//! The arena clock pushes a numeric phase code with every `matchTime` event.
//! [`MatchPhase::from_code`] resolves it through a fixed table, and
//! [`SessionState`] derives which panel controls may be interacted with.
//!
//! [`SessionState`] is a single immutable value replaced atomically per
//! event. Availability is a pure function of `(phase, committed)`, never of
//! event history, so any phase sequence ending in the same pair produces
//! the same control state.

use serde::{Deserialize, Serialize};

/// Phase of the currently loaded match, as broadcast by the arena clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    PreMatch,
    StartMatch,
    WarmupPeriod,
    AutoPeriod,
    PausePeriod,
    TeleopPeriod,
    PostMatch,
    TimeoutActive,
    PostTimeout,
    /// A code outside the known table. Treated like any non-scoring phase.
    Unknown,
}

impl MatchPhase {
    /// Resolve a wire phase code through the fixed lookup table.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::PreMatch,
            1 => Self::StartMatch,
            2 => Self::WarmupPeriod,
            3 => Self::AutoPeriod,
            4 => Self::PausePeriod,
            5 => Self::TeleopPeriod,
            6 => Self::PostMatch,
            7 => Self::TimeoutActive,
            8 => Self::PostTimeout,
            _ => Self::Unknown,
        }
    }

    /// Header text shown for this phase on the panel.
    pub fn display_text(self) -> &'static str {
        match self {
            Self::PreMatch => "PRE-MATCH",
            Self::StartMatch | Self::WarmupPeriod => "WARMUP",
            Self::AutoPeriod => "AUTONOMOUS",
            Self::PausePeriod => "PAUSE",
            Self::TeleopPeriod => "TELEOPERATED",
            Self::PostMatch => "POST-MATCH",
            Self::TimeoutActive => "TIMEOUT",
            Self::PostTimeout => "POST-TIMEOUT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Which panel controls may currently be interacted with.
///
/// Derived solely from `(phase, committed)`; recomputed on every phase
/// event, commit, and local-state reset. The server remains the real
/// authority; this gating keeps the panel from offering controls it knows
/// would be rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiAvailability {
    /// Scoring controls (towers, fuel counters, fouls) are enabled.
    pub scoring_available: bool,
    /// The commit button is enabled.
    pub commit_available: bool,
    /// Teleop-only styling/controls apply.
    pub in_teleop: bool,
}

impl UiAvailability {
    /// All controls locked.
    pub const LOCKED: Self = Self {
        scoring_available: false,
        commit_available: false,
        in_teleop: false,
    };

    /// Compute availability for a phase and commit flag.
    ///
    /// Once committed, post-match scoring locks entirely; the lock holds
    /// until an explicit local-state reset or a new match cycle.
    pub fn derive(phase: MatchPhase, committed: bool) -> Self {
        match phase {
            MatchPhase::AutoPeriod | MatchPhase::PausePeriod => Self {
                scoring_available: true,
                commit_available: false,
                in_teleop: false,
            },
            MatchPhase::TeleopPeriod => Self {
                scoring_available: true,
                commit_available: false,
                in_teleop: true,
            },
            MatchPhase::PostMatch => Self {
                scoring_available: !committed,
                commit_available: !committed,
                in_teleop: true,
            },
            _ => Self::LOCKED,
        }
    }
}

/// The scoring session's phase/commit state, replaced atomically per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: MatchPhase,
    pub committed: bool,
    pub availability: UiAvailability,
}

impl SessionState {
    /// Fresh session: pre-match, uncommitted, everything locked.
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::PreMatch,
            committed: false,
            availability: UiAvailability::LOCKED,
        }
    }

    /// Apply a phase event. Any phase other than post-match clears the
    /// committed flag (a new match cycle has begun); post-match preserves it.
    #[must_use]
    pub fn apply_phase(self, phase: MatchPhase) -> Self {
        let committed = match phase {
            MatchPhase::PostMatch => self.committed,
            _ => false,
        };
        Self {
            phase,
            committed,
            availability: UiAvailability::derive(phase, committed),
        }
    }

    /// Latch the committed lock (local commit gesture or server echo).
    /// One-way within a match cycle: only [`reset_local`](Self::reset_local)
    /// or a new-cycle phase event clears it.
    #[must_use]
    pub fn commit(self) -> Self {
        Self {
            phase: self.phase,
            committed: true,
            availability: UiAvailability::derive(self.phase, true),
        }
    }

    /// Clear the committed lock on an explicit `resetLocalState` event.
    #[must_use]
    pub fn reset_local(self) -> Self {
        Self {
            phase: self.phase,
            committed: false,
            availability: UiAvailability::derive(self.phase, false),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a server-pushed countdown as `M:SS`. Negative values clamp to
/// `0:00` rather than rendering a sign.
pub fn countdown_string(countdown_sec: i64) -> String {
    let secs = countdown_sec.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn phase_code_table() {
        assert_eq!(MatchPhase::from_code(0), MatchPhase::PreMatch);
        assert_eq!(MatchPhase::from_code(3), MatchPhase::AutoPeriod);
        assert_eq!(MatchPhase::from_code(4), MatchPhase::PausePeriod);
        assert_eq!(MatchPhase::from_code(5), MatchPhase::TeleopPeriod);
        assert_eq!(MatchPhase::from_code(6), MatchPhase::PostMatch);
        assert_eq!(MatchPhase::from_code(42), MatchPhase::Unknown);
        assert_eq!(MatchPhase::from_code(-1), MatchPhase::Unknown);
    }

    #[test]
    fn auto_and_pause_enable_scoring_without_commit() {
        for phase in [MatchPhase::AutoPeriod, MatchPhase::PausePeriod] {
            let avail = UiAvailability::derive(phase, false);
            assert!(avail.scoring_available);
            assert!(!avail.commit_available);
            assert!(!avail.in_teleop);
        }
    }

    #[test]
    fn teleop_enables_scoring_and_teleop_mode() {
        let avail = UiAvailability::derive(MatchPhase::TeleopPeriod, false);
        assert!(avail.scoring_available);
        assert!(!avail.commit_available);
        assert!(avail.in_teleop);
    }

    #[test]
    fn post_match_opens_commit_until_committed() {
        let open = UiAvailability::derive(MatchPhase::PostMatch, false);
        assert!(open.scoring_available);
        assert!(open.commit_available);
        assert!(open.in_teleop);

        let locked = UiAvailability::derive(MatchPhase::PostMatch, true);
        assert!(!locked.scoring_available);
        assert!(!locked.commit_available);
        assert!(locked.in_teleop);
    }

    #[test]
    fn non_scoring_phases_lock_everything() {
        for phase in [
            MatchPhase::PreMatch,
            MatchPhase::StartMatch,
            MatchPhase::WarmupPeriod,
            MatchPhase::TimeoutActive,
            MatchPhase::PostTimeout,
            MatchPhase::Unknown,
        ] {
            assert_eq!(UiAvailability::derive(phase, false), UiAvailability::LOCKED);
            assert_eq!(UiAvailability::derive(phase, true), UiAvailability::LOCKED);
        }
    }

    #[test]
    fn availability_is_history_free() {
        // Two very different phase histories ending in the same (phase,
        // committed) pair must agree on availability.
        let a = SessionState::new()
            .apply_phase(MatchPhase::AutoPeriod)
            .apply_phase(MatchPhase::PausePeriod)
            .apply_phase(MatchPhase::TeleopPeriod)
            .apply_phase(MatchPhase::PostMatch);
        let b = SessionState::new().apply_phase(MatchPhase::PostMatch);
        assert_eq!(a.availability, b.availability);
        assert_eq!(a.committed, b.committed);
    }

    #[test]
    fn full_match_sequence_without_commit() {
        let state = SessionState::new()
            .apply_phase(MatchPhase::AutoPeriod)
            .apply_phase(MatchPhase::TeleopPeriod)
            .apply_phase(MatchPhase::PostMatch);
        assert!(state.availability.scoring_available);
        assert!(state.availability.commit_available);
        assert!(state.availability.in_teleop);
        assert!(!state.committed);
    }

    #[test]
    fn commit_is_one_way_within_a_cycle() {
        let committed = SessionState::new()
            .apply_phase(MatchPhase::PostMatch)
            .commit();
        assert!(committed.committed);
        assert!(!committed.availability.commit_available);
        assert!(!committed.availability.scoring_available);

        // Repeated post-match ticks preserve the lock.
        let still = committed.apply_phase(MatchPhase::PostMatch);
        assert!(still.committed);
        assert!(!still.availability.commit_available);
    }

    #[test]
    fn reset_local_clears_commit_lock() {
        let state = SessionState::new()
            .apply_phase(MatchPhase::PostMatch)
            .commit()
            .reset_local();
        assert!(!state.committed);
        assert!(state.availability.commit_available);
    }

    #[test]
    fn new_cycle_clears_commit_lock() {
        let state = SessionState::new()
            .apply_phase(MatchPhase::PostMatch)
            .commit()
            .apply_phase(MatchPhase::AutoPeriod);
        assert!(!state.committed);
        assert!(state.availability.scoring_available);
    }

    #[test]
    fn countdown_formats_minutes_and_seconds() {
        assert_eq!(countdown_string(135), "2:15");
        assert_eq!(countdown_string(60), "1:00");
        assert_eq!(countdown_string(9), "0:09");
        assert_eq!(countdown_string(0), "0:00");
        assert_eq!(countdown_string(-5), "0:00");
    }
}
