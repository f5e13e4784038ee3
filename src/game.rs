//! Frame loop driver
//!
//! Owns the active scene, the cross-scene `Session` and at most one pending
//! transition. Front ends feed it wall-clock frame times and input; it runs
//! fixed simulation steps and hands back events to render or play.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::best_runs::BestRuns;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::KeyValueStore;
use crate::scene::{Scene, SceneRequest, Transition};
use crate::session::Session;
use crate::settings::Settings;
use crate::sim::{
    GameEvent, MazeInput, MazeLayout, MazeState, MiniGameInput, MiniGameState, ResultState,
    ScreenInput, TitleState,
};
use crate::tuning::Tuning;

/// The loaded scene and its state
#[derive(Debug, Clone)]
pub enum SceneState {
    Title(TitleState),
    Maze(MazeState),
    MiniGame(MiniGameState),
    Result(ResultState),
}

impl SceneState {
    pub fn scene(&self) -> Scene {
        match self {
            SceneState::Title(_) => Scene::Title,
            SceneState::Maze(_) => Scene::Maze,
            SceneState::MiniGame(_) => Scene::MiniGame,
            SceneState::Result(_) => Scene::Result,
        }
    }
}

/// Everything the player can do in one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub maze: MazeInput,
    pub minigame: MiniGameInput,
    /// One-shot; consumed by the first substep of the frame
    pub confirm: bool,
}

pub struct Game {
    pub scene: SceneState,
    pub session: Session,
    pub settings: Settings,
    pub best_runs: BestRuns,
    tuning: Tuning,
    layout: MazeLayout,
    seed: u64,
    rng: Pcg32,
    pending: Option<Transition>,
    accumulator: f32,
    events: Vec<GameEvent>,
    pub time_ticks: u64,
}

impl Game {
    /// Start at the title screen. Settings and best runs come from `store`,
    /// which also keeps the removal target across restarts.
    pub fn new(seed: u64, store: Box<dyn KeyValueStore>, tuning: Tuning) -> Self {
        let session = Session::new(store);
        let settings = Settings::load(session.store());
        let best_runs = BestRuns::load(session.store());

        let mut game = Self {
            scene: SceneState::Title(TitleState::new()),
            session,
            settings,
            best_runs,
            tuning,
            layout: MazeLayout::default(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            pending: None,
            accumulator: 0.0,
            events: Vec::new(),
            time_ticks: 0,
        };
        game.entered(None);
        game
    }

    pub fn with_layout(mut self, layout: MazeLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn current_scene(&self) -> Scene {
        self.scene.scene()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Request waiting for its delay to run out
    pub fn pending(&self) -> Option<&Transition> {
        self.pending.as_ref()
    }

    pub fn maze(&self) -> Option<&MazeState> {
        match &self.scene {
            SceneState::Maze(maze) => Some(maze),
            _ => None,
        }
    }

    pub fn minigame(&self) -> Option<&MiniGameState> {
        match &self.scene {
            SceneState::MiniGame(minigame) => Some(minigame),
            _ => None,
        }
    }

    /// Minigame countdown in whole seconds, when the HUD should show it
    pub fn hud_timer(&self) -> Option<u32> {
        if !self.settings.show_timer {
            return None;
        }
        self.minigame().map(MiniGameState::remaining_secs)
    }

    /// Run simulation ticks for one rendered frame. Returns the substep count.
    pub fn update(&mut self, frame_dt: f32, input: &FrameInput) -> u32 {
        let dt = frame_dt.min(0.1);
        self.accumulator += dt;

        let mut input = input.clone();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(&input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.confirm = false;
        }
        substeps
    }

    /// Advance exactly one fixed step
    pub fn tick(&mut self, input: &FrameInput) {
        self.time_ticks += 1;
        let events = &mut self.events;
        let session = &mut self.session;
        let screen = ScreenInput {
            confirm: input.confirm,
        };

        let requested = match &mut self.scene {
            SceneState::Title(title) => title.tick(&screen, session),
            SceneState::Maze(maze) => {
                let mut maze_input = input.maze.clone();
                maze_input.autopilot |= self.settings.autopilot;
                maze.tick(&maze_input, SIM_DT, session, events)
            }
            SceneState::MiniGame(minigame) => {
                let mut minigame_input = input.minigame.clone();
                minigame_input.autopilot |= self.settings.autopilot;
                minigame.tick(&minigame_input, SIM_DT, session, events)
            }
            SceneState::Result(result) => result.tick(&screen, session),
        };

        if let Some(transition) = requested {
            if let Some(pending) = &self.pending {
                log::debug!(
                    "Ignoring {} request, {} already pending",
                    transition.request.scene().as_str(),
                    pending.request.scene().as_str()
                );
            } else {
                log::debug!(
                    "{} requested in {} ticks",
                    transition.request.scene().as_str(),
                    transition.delay_ticks
                );
                self.pending = Some(transition);
            }
        }

        let ready = self.pending.as_mut().is_some_and(Transition::advance);
        if ready {
            if let Some(transition) = self.pending.take() {
                self.apply(transition.request);
            }
        }
    }

    /// Take everything that happened since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(self.session.store_mut()) {
            log::warn!("Could not save settings: {e}");
        }
    }

    /// Load the requested scene
    fn apply(&mut self, request: SceneRequest) {
        let from = self.scene.scene();
        self.scene = match request {
            SceneRequest::Title => SceneState::Title(TitleState::new()),
            SceneRequest::Maze(entry) => SceneState::Maze(MazeState::enter(
                &self.layout,
                &self.tuning.maze,
                &mut self.session,
                &entry,
                &mut self.events,
            )),
            SceneRequest::MiniGame(ticket) => {
                let seed: u64 = self.rng.random();
                SceneState::MiniGame(MiniGameState::new(
                    ticket,
                    seed,
                    self.tuning.minigame.clone(),
                ))
            }
            SceneRequest::Result(summary) => {
                let rank = self.best_runs.add_run(&summary, self.seed);
                if let Some(rank) = rank {
                    log::info!("New best run #{rank}: {:.1}s", summary.clear_secs);
                    self.events.push(GameEvent::NewBestRun { rank });
                    if let Err(e) = self.best_runs.save(self.session.store_mut()) {
                        log::warn!("Could not save best runs: {e}");
                    }
                }
                SceneState::Result(ResultState::new(summary, rank, &self.tuning.result))
            }
        };
        self.entered(Some(from));
    }

    fn entered(&mut self, from: Option<Scene>) {
        let to = self.scene.scene();
        match from {
            Some(from) => log::info!("Scene {} -> {}", from.as_str(), to.as_str()),
            None => log::info!("Scene {}", to.as_str()),
        }
        self.events.push(GameEvent::SceneEntered(to));
        if from != Some(to) {
            self.events.push(GameEvent::MusicCue {
                track: to.bgm_cue(),
                volume: self.settings.music_volume(),
                fade_secs: self.settings.fade_secs,
            });
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("scene", &self.current_scene())
            .field("session", &self.session)
            .field("pending", &self.pending)
            .field("time_ticks", &self.time_ticks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::scene::MazeEntry;
    use glam::Vec3;

    fn game() -> Game {
        Game::new(7, Box::new(MemoryStore::new()), Tuning::default())
    }

    fn confirm() -> FrameInput {
        FrameInput {
            confirm: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_on_title_with_music() {
        let mut game = game();
        assert_eq!(game.current_scene(), Scene::Title);
        let events = game.drain_events();
        assert_eq!(events[0], GameEvent::SceneEntered(Scene::Title));
        assert!(matches!(
            events[1],
            GameEvent::MusicCue {
                track: "bgm/title",
                ..
            }
        ));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_confirm_starts_maze() {
        let mut game = game();
        game.tick(&confirm());
        assert_eq!(game.current_scene(), Scene::Maze);
        assert!(game.pending().is_none());
        assert_eq!(game.maze().map(|m| m.enemies.len()), Some(8));
    }

    #[test]
    fn test_substeps_capped() {
        let mut game = game();
        let input = FrameInput::default();
        assert_eq!(game.update(0.0, &input), 0);
        assert!(game.update(10.0, &input) <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_confirm_consumed_by_first_substep() {
        let mut game = game();
        game.update(0.05, &confirm());
        assert_eq!(game.current_scene(), Scene::Maze);
    }

    #[test]
    fn test_contact_loads_minigame_with_ticket() {
        let mut game = game();
        game.tick(&confirm());
        if let SceneState::Maze(maze) = &mut game.scene {
            maze.player.pos = Vec3::new(5.0, 1.5, 4.5);
        }
        game.tick(&FrameInput::default());

        assert_eq!(game.current_scene(), Scene::MiniGame);
        let minigame = game.minigame().expect("minigame loaded");
        assert_eq!(minigame.enemy.as_str(), "Enemy_01");
        assert!(game.session.in_progress());
    }

    #[test]
    fn test_second_request_ignored_while_pending() {
        let mut game = game();
        game.tick(&confirm());
        game.pending = Some(Transition::after(SceneRequest::Title, 5));
        if let SceneState::Maze(maze) = &mut game.scene {
            maze.player.pos = Vec3::new(5.0, 1.5, 4.5);
        }
        game.tick(&FrameInput::default());
        assert_eq!(game.current_scene(), Scene::Maze);
        assert_eq!(game.pending().map(|t| &t.request), Some(&SceneRequest::Title));

        for _ in 0..4 {
            game.tick(&FrameInput::default());
        }
        assert_eq!(game.current_scene(), Scene::Title);
    }

    #[test]
    fn test_hud_timer_follows_setting() {
        let mut game = game();
        assert_eq!(game.hud_timer(), None);
        game.tick(&confirm());
        if let SceneState::Maze(maze) = &mut game.scene {
            maze.player.pos = Vec3::new(5.0, 1.5, 4.5);
        }
        game.tick(&FrameInput::default());
        assert_eq!(game.hud_timer(), Some(60));

        game.settings.show_timer = false;
        assert_eq!(game.hud_timer(), None);
    }

    #[test]
    fn test_save_settings_persists() {
        let mut game = game();
        game.settings.master_volume = 0.25;
        game.save_settings();
        assert_eq!(Settings::load(game.session.store()).master_volume, 0.25);
    }

    #[test]
    fn test_maze_reload_keeps_music() {
        let mut game = game();
        game.tick(&confirm());
        game.drain_events();
        game.apply(SceneRequest::Maze(MazeEntry::Fresh));
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::SceneEntered(Scene::Maze)));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::MusicCue { .. })));
    }
}
