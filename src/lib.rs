//! Maze Encounter - deterministic core for a maze exploration game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze walking, encounters, collection minigame)
//! - `session`: Cross-scene encounter state passed explicitly between scenes
//! - `scene`: Scene identities and typed transition requests
//! - `game`: Frame loop driver that owns the active scene and pending transitions
//! - `persistence`: Key-value stores that survive scene loads and restarts
//! - `platform`: Browser/native platform abstraction
//! - `tuning`: Data-driven game balance

pub mod best_runs;
pub mod error;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod scene;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use best_runs::BestRuns;
pub use error::StoreError;
pub use game::Game;
pub use scene::{Scene, SceneRequest};
pub use session::Session;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Minigame length in seconds
    pub const MINIGAME_DURATION_SECS: f32 = 60.0;
    /// Gauge bounds and starting value
    pub const GAUGE_MAX: f32 = 100.0;
    pub const GAUGE_START: f32 = 50.0;
    /// Gauge change for a pickup of the needed kind
    pub const GAUGE_MATCH_GAIN: f32 = 10.0;
    /// Gauge change for a pickup of any other kind
    pub const GAUGE_MISMATCH_PENALTY: f32 = 6.0;
    /// Every Nth pickup of one kind fires a skill
    pub const SKILL_THRESHOLD: u32 = 3;
    pub const SKILL_BONUS: f32 = 15.0;
    /// Wait between resolution and the return to the maze
    pub const RESOLUTION_DELAY_SECS: f32 = 2.0;

    /// Falling item spawner
    pub const SPAWN_INTERVAL_SECS: f32 = 2.0;
    pub const SPAWN_RANGE_X: f32 = 8.0;
    pub const SPAWN_HEIGHT: f32 = 10.0;
    pub const SWORD_SPAWN_RATE: f32 = 0.33;
    pub const SHIELD_SPAWN_RATE: f32 = 0.33;
    pub const FALL_SPEED: f32 = 5.0;
    pub const DESPAWN_Y: f32 = -10.0;

    /// Catcher (minigame avatar)
    pub const CATCHER_SPEED: f32 = 10.0;
    pub const CATCHER_BOUND_X: f32 = 8.0;
    pub const CATCHER_Y: f32 = -4.0;
    pub const CATCH_RADIUS: f32 = 1.0;

    /// Floor height the player is snapped to on restore
    pub const GROUND_Y: f32 = 1.5;
    /// Maze player movement
    pub const PLAYER_WALK_SPEED: f32 = 8.0;
    pub const PLAYER_DASH_SPEED: f32 = 15.0;
    pub const PLAYER_MAX_STAMINA: f32 = 3.0;
    pub const STAMINA_REGEN_RATE: f32 = 1.0;
    pub const PLAYER_RADIUS: f32 = 0.5;
    pub const ENEMY_RADIUS: f32 = 0.5;
    pub const GOAL_RADIUS: f32 = 1.0;
    /// Playable area is a square of this half-size around the origin
    pub const MAZE_HALF_EXTENT: f32 = 15.0;

    /// Restore offsets after an encounter
    pub const RETREAT_DISTANCE: f32 = 2.0;
    pub const RETREAT_SCAN_RADIUS: f32 = 4.0;
    pub const SUCCESS_NUDGE: f32 = 1.0;

    /// Enemy placement
    pub const MAX_ENEMIES: usize = 10;
    pub const MIN_ENEMY_SPACING: f32 = 3.0;

    /// Goal reached -> result screen
    pub const GOAL_DELAY_SECS: f32 = 2.0;
    /// Result screen sequence before input is accepted
    pub const RESULT_INTRO_SECS: f32 = 1.0;
    pub const RESULT_CELEBRATION_SECS: f32 = 3.0;
}

/// Convert a duration in seconds to whole simulation ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    ((secs / consts::SIM_DT).round() as u32).max(1)
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn ground_xz(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Horizontal distance between two world positions
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    ground_xz(a).distance(ground_xz(b))
}

/// Unit direction from `from` to `to` on the ground plane (zero if coincident)
#[inline]
pub fn horizontal_direction(from: Vec3, to: Vec3) -> Vec3 {
    let d = ground_xz(to) - ground_xz(from);
    let d = d.normalize_or_zero();
    Vec3::new(d.x, 0.0, d.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_ticks() {
        assert_eq!(secs_to_ticks(1.0), 60);
        assert_eq!(secs_to_ticks(2.0), 120);
        assert_eq!(secs_to_ticks(0.0), 1);
    }

    #[test]
    fn test_horizontal_direction_ignores_height() {
        let dir = horizontal_direction(Vec3::new(0.0, 5.0, 0.0), Vec3::new(3.0, -2.0, 4.0));
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert_eq!(dir.y, 0.0);
        assert!((dir.x - 0.6).abs() < 1e-6);
        assert!((dir.z - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_horizontal_direction_coincident_is_zero() {
        let p = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(horizontal_direction(p, p + Vec3::Y), Vec3::ZERO);
    }
}
