//! Timed item-collection minigame
//!
//! Items of three equipment kinds fall down a 2D lane. Catching the session's
//! needed kind fills the gauge, anything else drains it, and every Nth pickup
//! of one kind fires a flat bonus. The session ends exactly once: gauge full,
//! gauge empty, or timer expiry.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::gauge::{EquipmentCounts, EquipmentKind, Gauge, apply_pickup};
use super::spawner::ItemSpawner;
use super::state::{EnemyId, GameEvent, Outcome};
use crate::scene::{EncounterTicket, MazeEntry, SceneRequest, Transition};
use crate::session::Session;
use crate::tuning::MiniGameTuning;

/// Minigame lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiniGamePhase {
    Running,
    /// Terminal; spawning has stopped and the return to the maze is scheduled
    Resolved(Outcome),
}

/// A falling collectible
#[derive(Debug, Clone, PartialEq)]
pub struct FallingItem {
    pub id: u32,
    pub kind: EquipmentKind,
    pub pos: Vec2,
}

/// Input commands for a single minigame tick
#[derive(Debug, Clone, Default)]
pub struct MiniGameInput {
    /// Horizontal axis in [-1, 1]
    pub axis: f32,
    /// Let the catcher steer itself toward needed items
    pub autopilot: bool,
}

#[derive(Debug, Clone)]
pub struct MiniGameState {
    pub enemy: EnemyId,
    pub needed: EquipmentKind,
    pub gauge: Gauge,
    pub counts: EquipmentCounts,
    pub catcher_x: f32,
    /// Active items (sorted by id)
    pub items: Vec<FallingItem>,
    pub phase: MiniGamePhase,
    pub remaining_ticks: u32,
    pub time_ticks: u64,
    spawner: ItemSpawner,
    rng: Pcg32,
    next_id: u32,
    tuning: MiniGameTuning,
}

impl MiniGameState {
    /// Start a session against the ticket's enemy. Counts and gauge start
    /// fresh; the needed kind is drawn from `seed`.
    pub fn new(ticket: EncounterTicket, seed: u64, tuning: MiniGameTuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let needed = EquipmentKind::ALL[rng.random_range(0..EquipmentKind::ALL.len())];
        log::info!(
            "Minigame vs {}: collect {} (gauge {}/{})",
            ticket.enemy,
            needed.as_str(),
            tuning.gauge_start,
            tuning.gauge_max
        );
        Self {
            enemy: ticket.enemy,
            needed,
            gauge: Gauge::new(tuning.gauge_start, tuning.gauge_max),
            counts: EquipmentCounts::default(),
            catcher_x: 0.0,
            items: Vec::new(),
            phase: MiniGamePhase::Running,
            remaining_ticks: tuning.duration_ticks(),
            time_ticks: 0,
            spawner: ItemSpawner::new(tuning.spawn_interval_ticks()),
            rng,
            next_id: 1,
            tuning,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            MiniGamePhase::Running => None,
            MiniGamePhase::Resolved(outcome) => Some(outcome),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == MiniGamePhase::Running
    }

    pub fn is_spawning(&self) -> bool {
        self.spawner.is_active()
    }

    /// Remaining time rounded to whole seconds for the HUD
    pub fn remaining_secs(&self) -> u32 {
        (self.remaining_ticks as f32 * crate::consts::SIM_DT).round() as u32
    }

    pub fn tuning(&self) -> &MiniGameTuning {
        &self.tuning
    }

    /// Add an item at an explicit position
    pub fn spawn_item(&mut self, kind: EquipmentKind, pos: Vec2) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(FallingItem { id, kind, pos });
        id
    }

    /// Score one caught item. Ignored once the session has resolved.
    /// Returns the outcome if this pickup ended the session.
    pub fn collect(&mut self, kind: EquipmentKind, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        if !self.is_running() {
            log::debug!("Ignoring {} caught after resolution", kind.as_str());
            return None;
        }

        let report = apply_pickup(
            &mut self.gauge,
            &mut self.counts,
            self.needed,
            kind,
            &self.tuning,
        );
        log::debug!(
            "Caught {} ({}): gauge {} -> {}",
            kind.as_str(),
            if report.matched { "needed" } else { "wrong" },
            report.gauge_before,
            report.gauge_after
        );
        events.push(GameEvent::ItemCollected {
            kind,
            matched: report.matched,
            gauge: report.gauge_after,
        });
        if report.skill {
            log::info!("{} activated!", kind.skill_name());
            events.push(GameEvent::SkillActivated { kind });
        }

        match report.ending(self.gauge.max()) {
            Some(outcome) => self.resolve(outcome, events),
            None => None,
        }
    }

    /// Enter a terminal outcome. Only the first call has any effect.
    pub fn resolve(&mut self, outcome: Outcome, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        if !self.is_running() {
            return None;
        }
        self.phase = MiniGamePhase::Resolved(outcome);
        self.spawner.stop();
        log::info!("{}", outcome.banner());
        events.push(GameEvent::SpawningStopped);
        events.push(GameEvent::MiniGameResolved {
            enemy: self.enemy.clone(),
            outcome,
        });
        Some(outcome)
    }

    /// Timer expiry: success only if the gauge is already full
    fn time_up(&mut self, events: &mut Vec<GameEvent>) -> Option<Outcome> {
        let outcome = if self.gauge.is_full() {
            Outcome::TimeoutSuccess
        } else {
            Outcome::TimeoutFailure
        };
        self.resolve(outcome, events)
    }

    /// Advance one fixed step. When the session resolves, the session flags
    /// are updated before the delayed return to the maze is requested.
    pub fn tick(
        &mut self,
        input: &MiniGameInput,
        dt: f32,
        session: &mut Session,
        events: &mut Vec<GameEvent>,
    ) -> Option<Transition> {
        self.time_ticks += 1;

        // Catcher movement
        let axis = if input.autopilot {
            self.autopilot_axis()
        } else {
            input.axis
        };
        let bound = self.tuning.catcher_bound_x;
        self.catcher_x =
            (self.catcher_x + axis.clamp(-1.0, 1.0) * self.tuning.catcher_speed * dt).clamp(-bound, bound);

        // Spawning
        if self.spawner.tick() {
            let roll: f32 = self.rng.random();
            let kind = EquipmentKind::from_roll(roll, self.tuning.sword_rate, self.tuning.shield_rate);
            let range = self.tuning.spawn_range_x;
            let x = self.rng.random_range(-range..=range);
            self.spawn_item(kind, Vec2::new(x, self.tuning.spawn_height));
            events.push(GameEvent::ItemSpawned { kind });
        }

        // Falling and despawn
        let fall = self.tuning.fall_speed * dt;
        for item in &mut self.items {
            item.pos.y -= fall;
        }
        let despawn_y = self.tuning.despawn_y;
        self.items.retain(|item| item.pos.y >= despawn_y);

        // Catching
        let catcher = Vec2::new(self.catcher_x, self.tuning.catcher_y);
        let radius = self.tuning.catch_radius;
        let mut caught = Vec::new();
        self.items.retain(|item| {
            if item.pos.distance(catcher) <= radius {
                caught.push(item.kind);
                false
            } else {
                true
            }
        });

        let mut resolved = None;
        for kind in caught {
            if let Some(outcome) = self.collect(kind, events) {
                resolved = Some(outcome);
            }
        }

        // Countdown
        if self.is_running() {
            self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
            if self.remaining_ticks == 0 {
                resolved = self.time_up(events);
            }
        }

        resolved.map(|outcome| {
            let resolution = session.resolve(&self.enemy, outcome);
            Transition::after(
                SceneRequest::Maze(MazeEntry::Returning(resolution)),
                self.tuning.resolution_delay_ticks(),
            )
        })
    }

    /// Steer toward the lowest needed item still above the catcher
    fn autopilot_axis(&self) -> f32 {
        let catcher_y = self.tuning.catcher_y;
        let target = self
            .items
            .iter()
            .filter(|item| item.kind == self.needed && item.pos.y >= catcher_y)
            .min_by(|a, b| {
                a.pos
                    .y
                    .partial_cmp(&b.pos.y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        match target {
            Some(item) => {
                let dx = item.pos.x - self.catcher_x;
                if dx.abs() < 0.1 { 0.0 } else { dx.signum() }
            }
            None => 0.0,
        }
    }
}
