//! Fastest-clear leaderboard
//!
//! Persisted under `BEST_RUNS_KEY`, tracks the top 10 clear times.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence::{BEST_RUNS_KEY, KeyValueStore, load_json, save_json};
use crate::scene::RunSummary;

/// Maximum number of runs to keep
pub const MAX_BEST_RUNS: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRunEntry {
    /// Seconds spent in the maze
    pub clear_secs: f32,
    pub encounters_won: u32,
    pub encounters_lost: u32,
    /// Seed the run was played with
    pub seed: u64,
}

/// Leaderboard, fastest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestRuns {
    pub entries: Vec<BestRunEntry>,
}

impl BestRuns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a clear time makes the board
    pub fn qualifies(&self, clear_secs: f32) -> bool {
        if !clear_secs.is_finite() || clear_secs <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_BEST_RUNS {
            return true;
        }
        self.entries.last().is_none_or(|e| clear_secs < e.clear_secs)
    }

    /// Rank a clear time would achieve (1-indexed)
    pub fn potential_rank(&self, clear_secs: f32) -> Option<usize> {
        if !self.qualifies(clear_secs) {
            return None;
        }
        let rank = self.entries.iter().position(|e| clear_secs < e.clear_secs);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run; returns the rank achieved (1-indexed)
    pub fn add_run(&mut self, summary: &RunSummary, seed: u64) -> Option<usize> {
        let rank = self.potential_rank(summary.clear_secs)?;
        self.entries.insert(
            rank - 1,
            BestRunEntry {
                clear_secs: summary.clear_secs,
                encounters_won: summary.stats.encounters_won,
                encounters_lost: summary.stats.encounters_lost,
                seed,
            },
        );
        self.entries.truncate(MAX_BEST_RUNS);
        Some(rank)
    }

    pub fn best_time(&self) -> Option<f32> {
        self.entries.first().map(|e| e.clear_secs)
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        let runs: Self = load_json(store, BEST_RUNS_KEY);
        log::info!("Loaded {} best runs", runs.entries.len());
        runs
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        save_json(store, BEST_RUNS_KEY, self)?;
        log::info!("Best runs saved ({} entries)", self.entries.len());
        Ok(())
    }
}
