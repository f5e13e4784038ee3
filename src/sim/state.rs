//! Shared simulation types
//!
//! Identifiers, outcomes and events used by more than one scene.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::gauge::EquipmentKind;
use crate::scene::Scene;

/// Stable enemy identifier (`"{kind}_{NN}"`), identical across maze loads
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(String);

impl EnemyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Name for the `slot`-th placed enemy (1-based)
    pub fn for_slot(kind: &str, slot: usize) -> Self {
        Self(format!("{kind}_{slot:02}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EnemyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A maze enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub pos: Vec3,
    /// Set once this enemy has armed an encounter
    pub triggered: bool,
}

impl Enemy {
    pub fn new(id: EnemyId, pos: Vec3) -> Self {
        Self {
            id,
            pos,
            triggered: false,
        }
    }
}

/// Player transform captured when an encounter starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedPose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// How a minigame session ended. Exactly one per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Gauge reached max
    Success,
    /// Gauge reached zero
    Failure,
    /// Timer expired with the gauge at max
    TimeoutSuccess,
    /// Timer expired with the gauge below max
    TimeoutFailure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success | Outcome::TimeoutSuccess)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Outcome::TimeoutSuccess | Outcome::TimeoutFailure)
    }

    /// Banner shown while waiting to return to the maze
    pub fn banner(&self) -> &'static str {
        match self {
            Outcome::Success => "Gauge full! Returning to the maze",
            Outcome::Failure => "Gauge empty... Returning to the maze",
            Outcome::TimeoutSuccess => "Time up, but the gauge is full! Returning to the maze",
            Outcome::TimeoutFailure => "Time up! Returning to the maze",
        }
    }
}

/// Things that happened during a tick, for front ends and logs
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SceneEntered(Scene),
    /// Background music request for the new scene
    MusicCue {
        track: &'static str,
        volume: f32,
        fade_secs: f32,
    },
    EncounterStarted {
        enemy: EnemyId,
    },
    ItemSpawned {
        kind: EquipmentKind,
    },
    ItemCollected {
        kind: EquipmentKind,
        matched: bool,
        gauge: f32,
    },
    SkillActivated {
        kind: EquipmentKind,
    },
    MiniGameResolved {
        enemy: EnemyId,
        outcome: Outcome,
    },
    SpawningStopped,
    EnemyRemoved {
        enemy: EnemyId,
    },
    PlayerRestored {
        position: Vec3,
    },
    GoalReached,
    NewBestRun {
        rank: usize,
    },
}
