//! Maze Encounter entry point
//!
//! Native: plays one autopiloted run headlessly and logs what happens.
//! Web: the library's `wasm_start` does the setup; this is just a stub.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use maze_encounter::consts::SIM_DT;
    use maze_encounter::game::FrameInput;
    use maze_encounter::persistence::{KeyValueStore, SETTINGS_KEY};
    use maze_encounter::platform::{init_logging, open_default_store};
    use maze_encounter::sim::GameEvent;
    use maze_encounter::{Game, Scene, Tuning};

    /// Give up if the run has not finished in ten simulated minutes
    const MAX_TICKS: u64 = 60 * 60 * 10;

    fn seed_from_env() -> u64 {
        let arg = std::env::args().nth(1);
        let var = std::env::var("MAZE_SEED").ok();
        match arg.or(var) {
            Some(text) => match text.trim().parse() {
                Ok(seed) => seed,
                Err(_) => {
                    log::warn!("Ignoring invalid seed {text:?}");
                    rand::random()
                }
            },
            None => rand::random(),
        }
    }

    pub fn run() {
        init_logging();

        let seed = seed_from_env();
        let data_dir = std::env::var_os("MAZE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("save"));
        let tuning = std::env::var_os("MAZE_TUNING")
            .map(|path| Tuning::load_or_default(&PathBuf::from(path)))
            .unwrap_or_default();

        log::info!("Maze Encounter (headless) starting, seed {seed}");
        let mut game = Game::new(seed, open_default_store(&data_dir), tuning);
        // Write the defaults out so there is a settings entry to edit
        if game.session.store().get(SETTINGS_KEY).is_none() {
            game.save_settings();
        }

        let mut input = FrameInput {
            confirm: true,
            ..Default::default()
        };
        input.maze.view = game.settings.camera_view;
        input.maze.autopilot = true;
        input.minigame.autopilot = true;
        let mut visited_result = false;
        let mut last_timer = None;

        while game.time_ticks < MAX_TICKS {
            game.update(SIM_DT, &input);
            // Keep clicking; the screens ignore it until they are ready
            input.confirm = true;

            for event in game.drain_events() {
                log_event(&event);
                if event == GameEvent::SceneEntered(Scene::Result) {
                    visited_result = true;
                }
            }
            let timer = game.hud_timer();
            if timer != last_timer {
                if let Some(secs) = timer.filter(|s| s % 10 == 0) {
                    log::debug!("Minigame time left: {secs}s");
                }
                last_timer = timer;
            }
            if visited_result && game.current_scene() == Scene::Title {
                break;
            }
        }

        if !visited_result {
            log::warn!("Run did not reach the goal within {MAX_TICKS} ticks");
        }
        let stats = game.session.stats();
        log::info!(
            "Finished after {} ticks: {} encounters won, {} lost",
            game.time_ticks,
            stats.encounters_won,
            stats.encounters_lost
        );
        match game.best_runs.best_time() {
            Some(best) => log::info!("Best clear time: {best:.1}s"),
            None => log::info!("No clears recorded yet"),
        }
        for (i, entry) in game.best_runs.entries.iter().enumerate() {
            log::info!(
                "#{:<2} {:>6.1}s  won {} lost {}  (seed {})",
                i + 1,
                entry.clear_secs,
                entry.encounters_won,
                entry.encounters_lost,
                entry.seed
            );
        }
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::ItemSpawned { .. } => {}
            GameEvent::ItemCollected {
                kind,
                matched,
                gauge,
            } => log::debug!("Caught {} (match: {matched}) gauge {gauge:.0}", kind.as_str()),
            GameEvent::MusicCue { track, volume, .. } => {
                log::debug!("Music {track} at {volume:.2}")
            }
            other => log::info!("{other:?}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start, this is just to satisfy the compiler
}
