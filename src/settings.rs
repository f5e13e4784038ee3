//! Game settings and preferences
//!
//! Persisted separately from run state under `SETTINGS_KEY`.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence::{KeyValueStore, SETTINGS_KEY, load_json, save_json};
use crate::sim::CameraView;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Controls ===
    /// How movement input maps onto the maze
    pub camera_view: CameraView,
    /// Let the player walk itself (attract mode, soak tests)
    pub autopilot: bool,

    // === HUD ===
    /// Show the minigame countdown
    pub show_timer: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Background music volume before the master multiplier (0.0 - 1.0)
    pub bgm_volume: f32,
    /// Cross-fade between scene tracks
    pub fade_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_view: CameraView::TopDown,
            autopilot: false,

            show_timer: true,

            // Quiet BGM
            master_volume: 1.0,
            bgm_volume: 0.05,
            fade_secs: 1.0,
        }
    }
}

impl Settings {
    /// Effective music volume after the master multiplier
    pub fn music_volume(&self) -> f32 {
        (self.master_volume * self.bgm_volume).clamp(0.0, 1.0)
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        let settings: Self = load_json(store, SETTINGS_KEY);
        log::info!("Settings: {:?} camera, music {:.2}", settings.camera_view, settings.music_volume());
        settings
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_json(store, SETTINGS_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
