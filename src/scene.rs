//! Scene identities and typed transition requests
//!
//! A transition carries everything the next scene needs as its payload, so a
//! scene never has to fish cross-scene signals out of global storage.

use serde::{Deserialize, Serialize};

use crate::session::RunStats;
use crate::sim::state::{EnemyId, Outcome};

/// Logical scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scene {
    Title,
    Maze,
    MiniGame,
    Result,
}

impl Scene {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scene::Title => "TitleScene",
            Scene::Maze => "MazeScene",
            Scene::MiniGame => "MiniGameScene",
            Scene::Result => "ResultScene",
        }
    }

    /// Background music track for this scene
    pub fn bgm_cue(&self) -> &'static str {
        match self {
            Scene::Title => "bgm/title",
            Scene::Maze => "bgm/maze",
            Scene::MiniGame => "bgm/minigame",
            Scene::Result => "bgm/result",
        }
    }
}

/// Issued by the encounter trigger; names the enemy being fought
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTicket {
    pub enemy: EnemyId,
}

/// Result of one minigame, carried back to the maze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub enemy: EnemyId,
    pub outcome: Outcome,
}

/// Why the maze scene is being loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeEntry {
    /// New run from the title screen (or a reload)
    Fresh,
    /// Back from a minigame
    Returning(Resolution),
}

impl MazeEntry {
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            MazeEntry::Fresh => None,
            MazeEntry::Returning(resolution) => Some(resolution),
        }
    }
}

/// Shown on the result screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub stats: RunStats,
    /// Time spent walking the maze (minigames excluded)
    pub clear_secs: f32,
}

/// Request to load a scene, with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum SceneRequest {
    Title,
    Maze(MazeEntry),
    MiniGame(EncounterTicket),
    Result(RunSummary),
}

impl SceneRequest {
    pub fn scene(&self) -> Scene {
        match self {
            SceneRequest::Title => Scene::Title,
            SceneRequest::Maze(_) => Scene::Maze,
            SceneRequest::MiniGame(_) => Scene::MiniGame,
            SceneRequest::Result(_) => Scene::Result,
        }
    }
}

/// A scene request that fires after `delay_ticks` more ticks
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub request: SceneRequest,
    pub delay_ticks: u32,
}

impl Transition {
    pub fn now(request: SceneRequest) -> Self {
        Self {
            request,
            delay_ticks: 0,
        }
    }

    pub fn after(request: SceneRequest, delay_ticks: u32) -> Self {
        Self {
            request,
            delay_ticks,
        }
    }

    /// Count down one tick; true once the request should be applied
    pub fn advance(&mut self) -> bool {
        if self.delay_ticks == 0 {
            return true;
        }
        self.delay_ticks -= 1;
        self.delay_ticks == 0
    }
}
