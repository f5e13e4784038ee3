//! Data-driven game balance
//!
//! Every gameplay number the simulation reads lives here. Defaults come from
//! `consts`; a JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::secs_to_ticks;

/// Collection minigame balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniGameTuning {
    pub duration_secs: f32,
    pub gauge_max: f32,
    pub gauge_start: f32,
    pub match_gain: f32,
    pub mismatch_penalty: f32,
    pub skill_threshold: u32,
    pub skill_bonus: f32,
    pub resolution_delay_secs: f32,
    pub spawn_interval_secs: f32,
    pub spawn_range_x: f32,
    pub spawn_height: f32,
    /// Probability of a sword; shields take the next slice, staffs the rest
    pub sword_rate: f32,
    pub shield_rate: f32,
    pub fall_speed: f32,
    pub despawn_y: f32,
    pub catcher_speed: f32,
    pub catcher_bound_x: f32,
    pub catcher_y: f32,
    pub catch_radius: f32,
}

impl Default for MiniGameTuning {
    fn default() -> Self {
        Self {
            duration_secs: MINIGAME_DURATION_SECS,
            gauge_max: GAUGE_MAX,
            gauge_start: GAUGE_START,
            match_gain: GAUGE_MATCH_GAIN,
            mismatch_penalty: GAUGE_MISMATCH_PENALTY,
            skill_threshold: SKILL_THRESHOLD,
            skill_bonus: SKILL_BONUS,
            resolution_delay_secs: RESOLUTION_DELAY_SECS,
            spawn_interval_secs: SPAWN_INTERVAL_SECS,
            spawn_range_x: SPAWN_RANGE_X,
            spawn_height: SPAWN_HEIGHT,
            sword_rate: SWORD_SPAWN_RATE,
            shield_rate: SHIELD_SPAWN_RATE,
            fall_speed: FALL_SPEED,
            despawn_y: DESPAWN_Y,
            catcher_speed: CATCHER_SPEED,
            catcher_bound_x: CATCHER_BOUND_X,
            catcher_y: CATCHER_Y,
            catch_radius: CATCH_RADIUS,
        }
    }
}

impl MiniGameTuning {
    pub fn duration_ticks(&self) -> u32 {
        secs_to_ticks(self.duration_secs)
    }

    pub fn spawn_interval_ticks(&self) -> u32 {
        secs_to_ticks(self.spawn_interval_secs)
    }

    pub fn resolution_delay_ticks(&self) -> u32 {
        secs_to_ticks(self.resolution_delay_secs)
    }
}

/// Maze exploration balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeTuning {
    pub ground_y: f32,
    pub walk_speed: f32,
    pub dash_speed: f32,
    /// Dash drains stamina when enabled
    pub use_stamina: bool,
    pub max_stamina: f32,
    pub stamina_regen_rate: f32,
    pub player_radius: f32,
    pub enemy_radius: f32,
    pub goal_radius: f32,
    pub half_extent: f32,
    pub retreat_distance: f32,
    pub retreat_scan_radius: f32,
    pub success_nudge: f32,
    pub max_enemies: usize,
    pub min_enemy_spacing: f32,
    pub goal_delay_secs: f32,
}

impl Default for MazeTuning {
    fn default() -> Self {
        Self {
            ground_y: GROUND_Y,
            walk_speed: PLAYER_WALK_SPEED,
            dash_speed: PLAYER_DASH_SPEED,
            use_stamina: false,
            max_stamina: PLAYER_MAX_STAMINA,
            stamina_regen_rate: STAMINA_REGEN_RATE,
            player_radius: PLAYER_RADIUS,
            enemy_radius: ENEMY_RADIUS,
            goal_radius: GOAL_RADIUS,
            half_extent: MAZE_HALF_EXTENT,
            retreat_distance: RETREAT_DISTANCE,
            retreat_scan_radius: RETREAT_SCAN_RADIUS,
            success_nudge: SUCCESS_NUDGE,
            max_enemies: MAX_ENEMIES,
            min_enemy_spacing: MIN_ENEMY_SPACING,
            goal_delay_secs: GOAL_DELAY_SECS,
        }
    }
}

impl MazeTuning {
    pub fn goal_delay_ticks(&self) -> u32 {
        secs_to_ticks(self.goal_delay_secs)
    }

    /// Centre distance at which the player touches an enemy
    pub fn contact_distance(&self) -> f32 {
        self.player_radius + self.enemy_radius
    }
}

/// Result screen pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultTuning {
    pub intro_secs: f32,
    pub celebration_secs: f32,
}

impl Default for ResultTuning {
    fn default() -> Self {
        Self {
            intro_secs: RESULT_INTRO_SECS,
            celebration_secs: RESULT_CELEBRATION_SECS,
        }
    }
}

impl ResultTuning {
    pub fn intro_ticks(&self) -> u32 {
        secs_to_ticks(self.intro_secs)
    }

    /// Ticks until input is accepted
    pub fn unlock_ticks(&self) -> u32 {
        secs_to_ticks(self.intro_secs + self.celebration_secs)
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub minigame: MiniGameTuning,
    pub maze: MazeTuning,
    pub result: ResultTuning,
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load tuning from a JSON file, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring malformed tuning {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning {}: {e} - using defaults", path.display());
                Self::default()
            }
        }
    }
}
