//! Season scoring rule-sets for tower gestures and display.
//!
//! Two incompatible rule-sets exist across competition seasons. In one, the
//! auto flag is an independent boolean alongside a 0-3 teleop level; in the
//! other, level 1 is reachable only through the auto pathway and teleop
//! levels exclude it. A panel selects exactly one [`Ruleset`] at session
//! start — the two are never blended.

use crate::protocol::PanelCommand;

/// One tower position's raw state: the numeric level plus the auto flag,
/// exactly as carried by score snapshots and `tower` commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TowerSlot {
    pub level: u8,
    pub is_auto: bool,
}

impl TowerSlot {
    /// Build the outgoing `tower` command proposing this slot state.
    pub fn into_command(self, team_position: u8) -> PanelCommand {
        PanelCommand::Tower {
            team_position,
            level: self.level,
            is_auto: self.is_auto,
        }
    }
}

/// Rendered state of one tower position's pair of buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotView {
    /// Raw slot state the rendering was derived from. Gestures read this,
    /// never a separately tracked copy.
    pub slot: TowerSlot,
    pub auto_label: &'static str,
    pub auto_selected: bool,
    pub teleop_label: &'static str,
    pub teleop_selected: bool,
}

impl Default for SlotView {
    fn default() -> Self {
        Self {
            slot: TowerSlot::default(),
            auto_label: "None",
            auto_selected: false,
            teleop_label: "None",
            teleop_selected: false,
        }
    }
}

/// Text label for a numeric tower level.
pub fn level_label(level: u8) -> &'static str {
    match level {
        1 => "Level 1",
        2 => "Level 2",
        3 => "Level 3",
        _ => "None",
    }
}

/// A season's tower scoring rules: how gestures advance a slot and how a
/// snapshot slot is rendered.
///
/// The gesture methods compute the next *proposed* state from the currently
/// rendered one; the server validates the proposal and echoes the
/// authoritative result back in the next snapshot.
pub trait ScoringRules: Send + Sync {
    /// Next slot state when the teleop button is pressed.
    fn cycle_teleop(&self, current: TowerSlot) -> TowerSlot;

    /// Next slot state when the auto button is pressed.
    fn toggle_auto(&self, current: TowerSlot) -> TowerSlot;

    /// Render a snapshot slot into button labels and selection flags.
    fn render_slot(&self, slot: TowerSlot) -> SlotView;
}

/// Ruleset selector, chosen once per scoring session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ruleset {
    /// Auto is an independent flag beside a 0-3 teleop level.
    #[default]
    IndependentAuto,
    /// Level 1 is auto-only; teleop levels cycle through {0, 2, 3}.
    ExclusiveAuto,
}

impl Ruleset {
    /// The rule implementation for this selector.
    pub fn rules(self) -> &'static dyn ScoringRules {
        match self {
            Self::IndependentAuto => &IndependentAutoRules,
            Self::ExclusiveAuto => &ExclusiveAutoRules,
        }
    }
}

/// Rule-set where the auto flag and the teleop level vary independently.
#[derive(Debug, Clone, Copy)]
pub struct IndependentAutoRules;

impl ScoringRules for IndependentAutoRules {
    fn cycle_teleop(&self, current: TowerSlot) -> TowerSlot {
        TowerSlot {
            level: current.level.wrapping_add(1) % 4,
            is_auto: current.is_auto,
        }
    }

    fn toggle_auto(&self, current: TowerSlot) -> TowerSlot {
        TowerSlot {
            level: current.level,
            is_auto: !current.is_auto,
        }
    }

    fn render_slot(&self, slot: TowerSlot) -> SlotView {
        SlotView {
            slot,
            auto_label: if slot.is_auto { "Auto" } else { "None" },
            auto_selected: slot.is_auto,
            teleop_label: level_label(slot.level),
            teleop_selected: slot.level > 0,
        }
    }
}

/// Rule-set where level 1 belongs to the auto pathway exclusively.
///
/// The auto button is a binary toggle between level 0 and level-1-with-auto;
/// the teleop button cycles {0, 2, 3} and always clears the auto flag. An
/// auto-scored level 1 fully overrides teleop display for that position.
#[derive(Debug, Clone, Copy)]
pub struct ExclusiveAutoRules;

impl ExclusiveAutoRules {
    fn is_auto_level_one(slot: TowerSlot) -> bool {
        slot.is_auto && slot.level == 1
    }
}

impl ScoringRules for ExclusiveAutoRules {
    fn cycle_teleop(&self, current: TowerSlot) -> TowerSlot {
        // Level 1 is unreachable from here; a slot holding an auto level 1
        // enters the teleop ladder at its first rung.
        let level = match current.level {
            0 | 1 => 2,
            2 => 3,
            _ => 0,
        };
        TowerSlot {
            level,
            is_auto: false,
        }
    }

    fn toggle_auto(&self, current: TowerSlot) -> TowerSlot {
        if Self::is_auto_level_one(current) {
            TowerSlot {
                level: 0,
                is_auto: false,
            }
        } else {
            TowerSlot {
                level: 1,
                is_auto: true,
            }
        }
    }

    fn render_slot(&self, slot: TowerSlot) -> SlotView {
        if Self::is_auto_level_one(slot) {
            // Auto level 1 overrides whatever teleop fields the snapshot
            // might otherwise imply for this position.
            SlotView {
                slot,
                auto_label: "Level 1",
                auto_selected: true,
                teleop_label: "None",
                teleop_selected: false,
            }
        } else {
            SlotView {
                slot,
                auto_label: "None",
                auto_selected: false,
                teleop_label: level_label(slot.level),
                teleop_selected: slot.level > 0,
            }
        }
    }
}
