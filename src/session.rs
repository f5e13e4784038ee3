//! Cross-scene encounter state
//!
//! One `Session` lives for the whole process and is passed explicitly to the
//! encounter trigger, the minigame resolution and the maze re-entry handler.
//! The removal target is mirrored to the persisted store under
//! `DeleteTargetEnemy` so a pending removal survives an app restart.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::persistence::{DELETE_TARGET_ENEMY_KEY, KeyValueStore};
use crate::scene::Resolution;
use crate::sim::state::{EnemyId, Outcome, SavedPose};

/// The active or pending encounter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncounterFlag {
    /// Enemy armed by the last encounter; after a success it marks the
    /// enemy for removal on the next maze load
    pub target: Option<EnemyId>,
    /// Blocks new encounters while set
    pub in_progress: bool,
}

/// Per-run counters shown on the result screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub encounters_won: u32,
    pub encounters_lost: u32,
    pub maze_ticks: u64,
}

pub struct Session {
    encounter: EncounterFlag,
    saved_pose: Option<SavedPose>,
    last_result: Option<bool>,
    defeated: BTreeSet<EnemyId>,
    stats: RunStats,
    store: Box<dyn KeyValueStore>,
}

impl Session {
    /// Build a session on top of a persisted store, picking up any removal
    /// target left behind by a previous process.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let target = store.get_non_empty(DELETE_TARGET_ENEMY_KEY).map(EnemyId::new);
        if let Some(target) = &target {
            log::info!("Pending removal of {target} carried over from last session");
        }
        Self {
            encounter: EncounterFlag {
                target,
                in_progress: false,
            },
            saved_pose: None,
            last_result: None,
            defeated: BTreeSet::new(),
            stats: RunStats::default(),
            store,
        }
    }

    pub fn encounter(&self) -> &EncounterFlag {
        &self.encounter
    }

    pub fn in_progress(&self) -> bool {
        self.encounter.in_progress
    }

    pub fn removal_target(&self) -> Option<&EnemyId> {
        self.encounter.target.as_ref()
    }

    pub fn is_removal_target(&self, enemy: &EnemyId) -> bool {
        self.encounter.target.as_ref() == Some(enemy)
    }

    pub fn saved_pose(&self) -> Option<&SavedPose> {
        self.saved_pose.as_ref()
    }

    pub fn last_result(&self) -> Option<bool> {
        self.last_result
    }

    pub fn defeated(&self) -> &BTreeSet<EnemyId> {
        &self.defeated
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn record_maze_tick(&mut self) {
        self.stats.maze_ticks += 1;
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }

    /// Arm an encounter with `enemy`. Returns false (and changes nothing)
    /// while another encounter is in progress.
    pub fn arm_encounter(&mut self, enemy: &EnemyId, pose: SavedPose) -> bool {
        if self.encounter.in_progress {
            log::debug!("Encounter already in progress, ignoring {enemy}");
            return false;
        }
        self.encounter.in_progress = true;
        self.encounter.target = Some(enemy.clone());
        self.saved_pose = Some(pose);
        self.persist_target();
        log::info!("Encounter armed with {enemy} at {}", pose.position);
        true
    }

    /// Record the minigame outcome. Success keeps `enemy` as the removal
    /// target; failure clears it so the enemy stays in the maze. Either way
    /// the in-progress flag drops.
    pub fn resolve(&mut self, enemy: &EnemyId, outcome: Outcome) -> Resolution {
        if outcome.is_success() {
            self.encounter.target = Some(enemy.clone());
            self.stats.encounters_won += 1;
            log::info!(
                "{enemy} marked for removal{}",
                if outcome.is_timeout() { " (time up)" } else { "" }
            );
        } else {
            self.encounter.target = None;
            self.stats.encounters_lost += 1;
            log::info!(
                "{enemy} kept in the maze{}",
                if outcome.is_timeout() { " (time up)" } else { "" }
            );
        }
        self.last_result = Some(outcome.is_success());
        self.encounter.in_progress = false;
        self.persist_target();
        Resolution {
            enemy: enemy.clone(),
            outcome,
        }
    }

    /// The maze removed `enemy`; clear the target and remember the defeat
    pub fn complete_removal(&mut self, enemy: &EnemyId) {
        if self.is_removal_target(enemy) {
            self.encounter.target = None;
        }
        self.encounter.in_progress = false;
        self.defeated.insert(enemy.clone());
        self.persist_target();
    }

    /// Drop a removal target that matches no enemy in the maze
    pub fn clear_stale_target(&mut self) {
        if let Some(target) = self.encounter.target.take() {
            log::warn!("Removal target {target} not found in maze - clearing");
            self.persist_target();
        }
    }

    pub fn reset_in_progress(&mut self) {
        if self.encounter.in_progress {
            log::debug!("Clearing stale encounter-in-progress flag");
        }
        self.encounter.in_progress = false;
    }

    /// Hand the saved pose to the restore step; it is consumed
    pub fn take_saved_pose(&mut self) -> Option<SavedPose> {
        self.saved_pose.take()
    }

    /// Forget everything about the current run (title start, result -> title)
    pub fn reset_run(&mut self) {
        self.encounter = EncounterFlag::default();
        self.saved_pose = None;
        self.last_result = None;
        self.defeated.clear();
        self.stats = RunStats::default();
        self.persist_target();
        log::info!("Run state reset");
    }

    fn persist_target(&mut self) {
        let result = match &self.encounter.target {
            Some(target) => self.store.set(DELETE_TARGET_ENEMY_KEY, target.as_str()),
            None => self.store.remove(DELETE_TARGET_ENEMY_KEY),
        }
        .and_then(|_| self.store.flush());
        if let Err(e) = result {
            log::warn!("Could not persist removal target: {e}");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("encounter", &self.encounter)
            .field("saved_pose", &self.saved_pose)
            .field("last_result", &self.last_result)
            .field("defeated", &self.defeated)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
