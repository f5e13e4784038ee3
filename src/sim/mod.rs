//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (enemies in spawn order, items by ID)
//! - No rendering or platform dependencies

pub mod gauge;
pub mod maze;
pub mod minigame;
pub mod screens;
pub mod spawner;
pub mod state;

pub use gauge::{EquipmentCounts, EquipmentKind, Gauge, PickupReport, apply_pickup};
pub use maze::{
    CameraView, MazeInput, MazeLayout, MazePhase, MazeState, Player, retreat_position,
    success_restore_position,
};
pub use minigame::{FallingItem, MiniGameInput, MiniGamePhase, MiniGameState};
pub use screens::{ResultStage, ResultState, ScreenInput, TitleState};
pub use spawner::{ItemSpawner, place_enemies};
pub use state::{Enemy, EnemyId, GameEvent, Outcome, SavedPose};
