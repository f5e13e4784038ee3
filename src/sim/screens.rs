//! Title and result screens

use crate::scene::{MazeEntry, RunSummary, SceneRequest, Transition};
use crate::session::Session;
use crate::tuning::ResultTuning;

/// Input commands for the menu-style screens
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenInput {
    /// Start button / click / any key
    pub confirm: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TitleState {
    started: bool,
    pub time_ticks: u64,
}

impl TitleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, input: &ScreenInput, session: &mut Session) -> Option<Transition> {
        self.time_ticks += 1;
        if !input.confirm || self.started {
            return None;
        }
        self.started = true;
        // A new run never inherits a pending removal or a saved pose
        session.reset_run();
        log::info!("Starting a new run");
        Some(Transition::now(SceneRequest::Maze(MazeEntry::Fresh)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStage {
    /// Clear banner fading in
    Intro,
    /// Celebration effects playing
    Celebrating,
    /// Click to return to the title
    AwaitingInput,
}

#[derive(Debug, Clone)]
pub struct ResultState {
    pub summary: RunSummary,
    /// Leaderboard rank earned by this run, if any
    pub rank: Option<usize>,
    ticks: u32,
    returning: bool,
    tuning: ResultTuning,
}

impl ResultState {
    pub fn new(summary: RunSummary, rank: Option<usize>, tuning: &ResultTuning) -> Self {
        log::info!(
            "Result: cleared in {:.1}s, {} won / {} lost",
            summary.clear_secs,
            summary.stats.encounters_won,
            summary.stats.encounters_lost
        );
        Self {
            summary,
            rank,
            ticks: 0,
            returning: false,
            tuning: tuning.clone(),
        }
    }

    pub fn stage(&self) -> ResultStage {
        if self.ticks < self.tuning.intro_ticks() {
            ResultStage::Intro
        } else if self.ticks < self.tuning.unlock_ticks() {
            ResultStage::Celebrating
        } else {
            ResultStage::AwaitingInput
        }
    }

    pub fn tick(&mut self, input: &ScreenInput, session: &mut Session) -> Option<Transition> {
        let before = self.stage();
        self.ticks = self.ticks.saturating_add(1);
        if self.stage() != before {
            log::debug!("Result screen: {:?} -> {:?}", before, self.stage());
        }

        if before != ResultStage::AwaitingInput || !input.confirm || self.returning {
            return None;
        }
        self.returning = true;
        session.reset_run();
        Some(Transition::now(SceneRequest::Title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{DELETE_TARGET_ENEMY_KEY, KeyValueStore, MemoryStore};
    use crate::session::RunStats;
    use crate::sim::state::{EnemyId, Outcome, SavedPose};
    use glam::{Quat, Vec3};

    fn dirty_session() -> Session {
        let mut session = Session::new(Box::new(MemoryStore::new()));
        let enemy = EnemyId::new("Enemy_03");
        session.arm_encounter(
            &enemy,
            SavedPose {
                position: Vec3::new(8.0, 1.5, -3.0),
                rotation: Quat::IDENTITY,
            },
        );
        session.resolve(&enemy, Outcome::Success);
        session
    }

    #[test]
    fn test_title_start_resets_run() {
        let mut session = dirty_session();
        let mut title = TitleState::new();

        assert!(title.tick(&ScreenInput::default(), &mut session).is_none());
        let t = title
            .tick(&ScreenInput { confirm: true }, &mut session)
            .expect("start");
        assert_eq!(t.request, SceneRequest::Maze(MazeEntry::Fresh));
        assert!(session.removal_target().is_none());
        assert!(session.saved_pose().is_none());
        assert!(session.store().get(DELETE_TARGET_ENEMY_KEY).is_none());

        // Second press while loading does nothing
        assert!(title.tick(&ScreenInput { confirm: true }, &mut session).is_none());
    }

    #[test]
    fn test_result_ignores_input_until_unlocked() {
        let tuning = ResultTuning::default();
        let mut session = dirty_session();
        let summary = RunSummary {
            stats: RunStats::default(),
            clear_secs: 12.5,
        };
        let mut result = ResultState::new(summary, Some(1), &tuning);
        let click = ScreenInput { confirm: true };

        assert_eq!(result.stage(), ResultStage::Intro);
        for _ in 0..tuning.unlock_ticks() {
            assert!(result.tick(&click, &mut session).is_none());
        }
        assert_eq!(result.stage(), ResultStage::AwaitingInput);
        assert!(session.removal_target().is_some());

        let t = result.tick(&click, &mut session).expect("back to title");
        assert_eq!(t.request, SceneRequest::Title);
        assert!(session.removal_target().is_none());
        assert!(result.tick(&click, &mut session).is_none());
    }

    #[test]
    fn test_result_stages_advance() {
        let tuning = ResultTuning::default();
        let mut session = Session::new(Box::new(MemoryStore::new()));
        let summary = RunSummary {
            stats: RunStats::default(),
            clear_secs: 1.0,
        };
        let mut result = ResultState::new(summary, None, &tuning);
        for _ in 0..tuning.intro_ticks() {
            result.tick(&ScreenInput::default(), &mut session);
        }
        assert_eq!(result.stage(), ResultStage::Celebrating);
    }
}
