//! Minigame gauge, equipment kinds and pickup scoring

use serde::{Deserialize, Serialize};

use super::state::Outcome;
use crate::tuning::MiniGameTuning;

/// Collectible equipment categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    Sword,
    Shield,
    Staff,
}

impl EquipmentKind {
    pub const ALL: [EquipmentKind; 3] = [Self::Sword, Self::Shield, Self::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentKind::Sword => "Sword",
            EquipmentKind::Shield => "Shield",
            EquipmentKind::Staff => "Staff",
        }
    }

    /// Skill announced when the periodic bonus fires for this kind
    pub fn skill_name(&self) -> &'static str {
        match self {
            EquipmentKind::Sword => "Blade Flash",
            EquipmentKind::Shield => "Iron Wall",
            EquipmentKind::Staff => "Mana Torrent",
        }
    }

    /// Pick a kind from a uniform roll in [0, 1) using the spawner weights.
    /// Staff takes whatever probability sword and shield leave.
    pub fn from_roll(roll: f32, sword_rate: f32, shield_rate: f32) -> Self {
        if roll < sword_rate {
            EquipmentKind::Sword
        } else if roll < sword_rate + shield_rate {
            EquipmentKind::Shield
        } else {
            EquipmentKind::Staff
        }
    }
}

/// Session progress bounded to [0, max]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    current: f32,
    max: f32,
}

impl Gauge {
    pub fn new(start: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: start.clamp(0.0, max),
            max,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Fill level in [0, 1] for HUD bars
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    /// Add `delta` and clamp. Returns the change actually applied.
    pub fn adjust(&mut self, delta: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + delta).clamp(0.0, self.max);
        self.current - before
    }
}

/// Per-kind pickup tallies for one minigame session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentCounts {
    pub sword: u32,
    pub shield: u32,
    pub staff: u32,
}

impl EquipmentCounts {
    pub fn get(&self, kind: EquipmentKind) -> u32 {
        match kind {
            EquipmentKind::Sword => self.sword,
            EquipmentKind::Shield => self.shield,
            EquipmentKind::Staff => self.staff,
        }
    }

    /// Count one pickup; returns the new tally for that kind
    pub fn record(&mut self, kind: EquipmentKind) -> u32 {
        let slot = match kind {
            EquipmentKind::Sword => &mut self.sword,
            EquipmentKind::Shield => &mut self.shield,
            EquipmentKind::Staff => &mut self.staff,
        };
        *slot += 1;
        *slot
    }

    pub fn total(&self) -> u32 {
        self.sword + self.shield + self.staff
    }
}

/// What a single pickup did to the gauge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupReport {
    pub kind: EquipmentKind,
    pub matched: bool,
    pub gauge_before: f32,
    /// After the gain or penalty, before any skill bonus
    pub gauge_after_delta: f32,
    pub gauge_after: f32,
    /// The pickup completed a multiple of the skill threshold and the bonus
    /// was applied
    pub skill: bool,
}

impl PickupReport {
    /// Terminal outcome decided by the gain or penalty. A gauge filled only
    /// by the skill bonus does not end the session.
    pub fn ending(&self, max: f32) -> Option<Outcome> {
        if self.gauge_after_delta >= max {
            Some(Outcome::Success)
        } else if self.gauge_after_delta <= 0.0 {
            Some(Outcome::Failure)
        } else {
            None
        }
    }
}

/// Apply one pickup: category gain/penalty first, then the periodic skill
/// bonus. The gauge is clamped after each step. When the gain or penalty
/// lands on a bound the session is over and no bonus is applied.
pub fn apply_pickup(
    gauge: &mut Gauge,
    counts: &mut EquipmentCounts,
    needed: EquipmentKind,
    kind: EquipmentKind,
    tuning: &MiniGameTuning,
) -> PickupReport {
    let gauge_before = gauge.current();
    let count = counts.record(kind);

    let matched = kind == needed;
    if matched {
        gauge.adjust(tuning.match_gain);
    } else {
        gauge.adjust(-tuning.mismatch_penalty);
    }
    let gauge_after_delta = gauge.current();
    let terminal = gauge.is_full() || gauge.is_empty();

    let skill = !terminal && tuning.skill_threshold > 0 && count % tuning.skill_threshold == 0;
    if skill {
        gauge.adjust(tuning.skill_bonus);
    }

    PickupReport {
        kind,
        matched,
        gauge_before,
        gauge_after_delta,
        gauge_after: gauge.current(),
        skill,
    }
}
