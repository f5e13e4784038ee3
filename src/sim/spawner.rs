//! Enemy placement and falling item spawning

use std::collections::BTreeSet;

use glam::Vec3;

use super::state::{Enemy, EnemyId};
use crate::tuning::MazeTuning;

/// Place enemies on `points` in order, skipping points closer than
/// `min_enemy_spacing` to an already placed enemy and stopping at
/// `max_enemies`. Ids are assigned by placement slot before `defeated`
/// enemies are filtered out, so an enemy keeps its id across maze loads.
pub fn place_enemies(
    kind: &str,
    points: &[Vec3],
    tuning: &MazeTuning,
    defeated: &BTreeSet<EnemyId>,
) -> Vec<Enemy> {
    let mut placed: Vec<Enemy> = Vec::new();

    for &point in points {
        if placed.len() >= tuning.max_enemies {
            break;
        }
        let crowded = placed
            .iter()
            .any(|e| e.pos.distance(point) < tuning.min_enemy_spacing);
        if crowded {
            log::debug!("Skipping enemy point {point}: too close to another enemy");
            continue;
        }
        let id = EnemyId::for_slot(kind, placed.len() + 1);
        placed.push(Enemy::new(id, point));
    }

    let total = placed.len();
    placed.retain(|e| !defeated.contains(&e.id));
    log::info!(
        "Placed {} enemies ({} already defeated)",
        placed.len(),
        total - placed.len()
    );
    placed
}

/// Fixed-interval item spawner for the minigame
#[derive(Debug, Clone)]
pub struct ItemSpawner {
    interval_ticks: u32,
    timer_ticks: u32,
    active: bool,
}

impl ItemSpawner {
    pub fn new(interval_ticks: u32) -> Self {
        Self {
            interval_ticks: interval_ticks.max(1),
            timer_ticks: 0,
            active: true,
        }
    }

    /// Advance one tick; true when an item should spawn now
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.timer_ticks += 1;
        if self.timer_ticks >= self.interval_ticks {
            self.timer_ticks = 0;
            return true;
        }
        false
    }

    pub fn stop(&mut self) {
        if self.active {
            self.active = false;
            log::info!("Item spawning stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<Vec3> {
        vec![
            Vec3::new(5.0, 1.5, 5.0),
            Vec3::new(6.0, 1.5, 5.0), // too close to the first
            Vec3::new(-5.0, 1.5, 5.0),
            Vec3::new(8.0, 1.5, -3.0),
        ]
    }

    #[test]
    fn test_spacing_and_naming() {
        let enemies = place_enemies("Enemy", &points(), &MazeTuning::default(), &BTreeSet::new());
        let ids: Vec<&str> = enemies.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Enemy_01", "Enemy_02", "Enemy_03"]);
        assert_eq!(enemies[1].pos, Vec3::new(-5.0, 1.5, 5.0));
    }

    #[test]
    fn test_max_enemies() {
        let tuning = MazeTuning {
            max_enemies: 2,
            ..Default::default()
        };
        let enemies = place_enemies("Enemy", &points(), &tuning, &BTreeSet::new());
        assert_eq!(enemies.len(), 2);
    }

    #[test]
    fn test_defeated_keep_their_slot() {
        let defeated: BTreeSet<EnemyId> = [EnemyId::new("Enemy_01")].into_iter().collect();
        let enemies = place_enemies("Enemy", &points(), &MazeTuning::default(), &defeated);
        let ids: Vec<&str> = enemies.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["Enemy_02", "Enemy_03"]);
    }

    #[test]
    fn test_item_spawner_interval_and_stop() {
        let mut spawner = ItemSpawner::new(3);
        assert!(!spawner.tick());
        assert!(!spawner.tick());
        assert!(spawner.tick());
        assert!(!spawner.tick());

        spawner.stop();
        assert!(!spawner.is_active());
        for _ in 0..10 {
            assert!(!spawner.tick());
        }
    }
}
