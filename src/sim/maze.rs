//! Maze exploration: player movement, encounter trigger, goal, and the
//! re-entry handler that runs whenever the maze scene is loaded.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::spawner::place_enemies;
use super::state::{Enemy, EnemyId, GameEvent, SavedPose};
use crate::scene::{EncounterTicket, MazeEntry, RunSummary, SceneRequest, Transition};
use crate::session::Session;
use crate::tuning::MazeTuning;
use crate::{horizontal_direction, horizontal_distance};

/// How the player's camera is looking at the maze. Decides how input axes
/// map to world movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum CameraView {
    /// Overhead camera: axes map straight onto world x/z
    #[default]
    TopDown,
    /// Camera behind the player's eyes; `yaw` in radians around +Y,
    /// zero facing +Z
    FirstPerson { yaw: f32 },
}

impl CameraView {
    /// World-space ground movement for an input axis (x = strafe, y = forward)
    pub fn relative_move(&self, axis: Vec2) -> Vec3 {
        match *self {
            CameraView::TopDown => Vec3::new(axis.x, 0.0, axis.y),
            CameraView::FirstPerson { yaw } => {
                let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
                let right = Vec3::new(yaw.cos(), 0.0, -yaw.sin());
                right * axis.x + forward * axis.y
            }
        }
    }
}

/// Input commands for a single maze tick
#[derive(Debug, Clone, Default)]
pub struct MazeInput {
    /// Movement axes in [-1, 1]
    pub axis: Vec2,
    pub dash: bool,
    pub view: CameraView,
    /// Walk toward the goal without player input
    pub autopilot: bool,
}

/// Static maze content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeLayout {
    pub player_spawn: Vec3,
    pub goal: Vec3,
    /// Enemy name prefix
    pub enemy_kind: String,
    pub enemy_points: Vec<Vec3>,
}

impl Default for MazeLayout {
    fn default() -> Self {
        Self {
            player_spawn: Vec3::new(0.0, 1.5, -12.0),
            goal: Vec3::new(0.0, 1.5, 14.0),
            enemy_kind: "Enemy".to_string(),
            enemy_points: vec![
                Vec3::new(5.0, 1.5, 5.0),
                Vec3::new(-5.0, 1.5, 5.0),
                Vec3::new(8.0, 1.5, -3.0),
                Vec3::new(-8.0, 1.5, -3.0),
                Vec3::new(0.0, 1.5, 10.0),
                Vec3::new(3.0, 1.5, -8.0),
                Vec3::new(-7.0, 1.5, 8.0),
                Vec3::new(12.0, 1.5, 0.0),
            ],
        }
    }
}

/// The maze avatar
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec3,
    pub rot: Quat,
    pub stamina: f32,
    pub dashing: bool,
}

impl Player {
    pub fn pose(&self) -> SavedPose {
        SavedPose {
            position: self.pos,
            rotation: self.rot,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MazePhase {
    Exploring,
    /// Waiting for the minigame scene to load
    EncounterArmed(EnemyId),
    /// Player frozen until the result screen loads
    GoalReached,
}

#[derive(Debug, Clone)]
pub struct MazeState {
    pub player: Player,
    /// Live enemies in spawn order
    pub enemies: Vec<Enemy>,
    pub goal: Vec3,
    pub phase: MazePhase,
    pub time_ticks: u64,
    tuning: MazeTuning,
}

impl MazeState {
    /// Load the maze scene.
    ///
    /// Runs the removal pass before anything can trigger: the enemy named by
    /// the session's removal target is deleted and the target cleared. On a
    /// load without a removal, the in-progress flag is reset so a stale
    /// encounter cannot block the run. Finally the player pose is restored
    /// from the session if one was saved.
    pub fn enter(
        layout: &MazeLayout,
        tuning: &MazeTuning,
        session: &mut Session,
        entry: &MazeEntry,
        events: &mut Vec<GameEvent>,
    ) -> Self {
        let mut enemies = place_enemies(
            &layout.enemy_kind,
            &layout.enemy_points,
            tuning,
            session.defeated(),
        );

        let mut removed_at = None;
        match session.removal_target().cloned() {
            Some(target) => match enemies.iter().position(|e| e.id == target) {
                Some(index) => {
                    let enemy = enemies.remove(index);
                    log::info!("Removing defeated enemy {}", enemy.id);
                    session.complete_removal(&enemy.id);
                    removed_at = Some(enemy.pos);
                    events.push(GameEvent::EnemyRemoved { enemy: enemy.id });
                }
                None => {
                    session.clear_stale_target();
                    session.reset_in_progress();
                }
            },
            None => session.reset_in_progress(),
        }

        let succeeded = entry
            .resolution()
            .map(|r| r.outcome.is_success())
            .or(session.last_result())
            .unwrap_or(false);

        let (pos, rot) = match session.take_saved_pose() {
            Some(pose) => {
                let pos = if succeeded {
                    success_restore_position(&pose, removed_at, tuning)
                } else {
                    retreat_position(&pose, &enemies, tuning)
                };
                log::info!(
                    "Restoring player to {pos} (saved {}, {})",
                    pose.position,
                    if succeeded { "won" } else { "lost" }
                );
                events.push(GameEvent::PlayerRestored { position: pos });
                (pos, pose.rotation)
            }
            None => (layout.player_spawn, Quat::IDENTITY),
        };

        Self {
            player: Player {
                pos,
                rot,
                stamina: tuning.max_stamina,
                dashing: false,
            },
            enemies,
            goal: layout.goal,
            phase: MazePhase::Exploring,
            time_ticks: 0,
            tuning: tuning.clone(),
        }
    }

    pub fn enemy(&self, id: &EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| &e.id == id)
    }

    /// Advance one fixed step
    pub fn tick(
        &mut self,
        input: &MazeInput,
        dt: f32,
        session: &mut Session,
        events: &mut Vec<GameEvent>,
    ) -> Option<Transition> {
        self.time_ticks += 1;
        if self.phase != MazePhase::Exploring {
            return None;
        }
        session.record_maze_tick();

        self.move_player(input, dt);

        if let Some(transition) = self.check_encounters(session, events) {
            return Some(transition);
        }

        if horizontal_distance(self.player.pos, self.goal)
            <= self.tuning.player_radius + self.tuning.goal_radius
        {
            self.phase = MazePhase::GoalReached;
            self.player.dashing = false;
            log::info!("Maze cleared!");
            events.push(GameEvent::GoalReached);
            let stats = session.stats().clone();
            let clear_secs = stats.maze_ticks as f32 * crate::consts::SIM_DT;
            return Some(Transition::after(
                SceneRequest::Result(RunSummary { stats, clear_secs }),
                self.tuning.goal_delay_ticks(),
            ));
        }

        None
    }

    fn move_player(&mut self, input: &MazeInput, dt: f32) {
        let t = &self.tuning;
        let mut dir = if input.autopilot {
            horizontal_direction(self.player.pos, self.goal)
        } else {
            input.view.relative_move(input.axis)
        };
        if dir.length_squared() > 1.0 {
            dir = dir.normalize();
        }
        let moving = dir.length_squared() > 0.0;

        let can_dash = !t.use_stamina || self.player.stamina > 0.0;
        self.player.dashing = input.dash && can_dash && moving;
        if t.use_stamina {
            self.player.stamina = if self.player.dashing {
                (self.player.stamina - dt).max(0.0)
            } else {
                (self.player.stamina + t.stamina_regen_rate * dt).min(t.max_stamina)
            };
        }

        let speed = if self.player.dashing {
            t.dash_speed
        } else {
            t.walk_speed
        };
        let mut pos = self.player.pos + dir * speed * dt;
        pos.x = pos.x.clamp(-t.half_extent, t.half_extent);
        pos.z = pos.z.clamp(-t.half_extent, t.half_extent);
        pos.y = t.ground_y;
        self.player.pos = pos;

        if moving {
            self.player.rot = Quat::from_rotation_y(dir.x.atan2(dir.z));
        }
    }

    /// Encounter trigger. Arms at most one encounter per tick, first enemy in
    /// spawn order wins.
    fn check_encounters(
        &mut self,
        session: &mut Session,
        events: &mut Vec<GameEvent>,
    ) -> Option<Transition> {
        let reach = self.tuning.contact_distance();
        let pose = self.player.pose();

        for enemy in &mut self.enemies {
            if horizontal_distance(pose.position, enemy.pos) > reach {
                continue;
            }
            if session.is_removal_target(&enemy.id) {
                log::debug!("{} is pending removal, contact ignored", enemy.id);
                continue;
            }
            if enemy.triggered || session.in_progress() {
                log::debug!("Encounter in progress, contact with {} ignored", enemy.id);
                continue;
            }
            if !session.arm_encounter(&enemy.id, pose) {
                continue;
            }
            enemy.triggered = true;
            self.phase = MazePhase::EncounterArmed(enemy.id.clone());
            events.push(GameEvent::EncounterStarted {
                enemy: enemy.id.clone(),
            });
            return Some(Transition::now(SceneRequest::MiniGame(EncounterTicket {
                enemy: enemy.id.clone(),
            })));
        }
        None
    }
}

/// Success restore: the contact point at ground height, nudged away from the
/// enemy that was just removed
pub fn success_restore_position(
    pose: &SavedPose,
    removed_enemy: Option<Vec3>,
    tuning: &MazeTuning,
) -> Vec3 {
    let mut pos = Vec3::new(pose.position.x, tuning.ground_y, pose.position.z);
    if let Some(enemy_pos) = removed_enemy {
        let away = away_from(pose, enemy_pos);
        pos += away * tuning.success_nudge;
    }
    pos.y = tuning.ground_y;
    pos
}

/// Failure restore: step back from the first enemy within the scan radius so
/// the player does not immediately re-trigger it. With no enemy in range the
/// saved position is used as is.
pub fn retreat_position(pose: &SavedPose, enemies: &[Enemy], tuning: &MazeTuning) -> Vec3 {
    let mut pos = pose.position;
    let nearby = enemies
        .iter()
        .find(|e| horizontal_distance(pose.position, e.pos) < tuning.retreat_scan_radius);
    if let Some(enemy) = nearby {
        log::debug!(
            "Retreating from {} ({:.2}m away)",
            enemy.id,
            horizontal_distance(pose.position, enemy.pos)
        );
        pos += away_from(pose, enemy.pos) * tuning.retreat_distance;
    }
    pos.y = tuning.ground_y;
    pos
}

/// Horizontal unit vector pointing from `enemy_pos` to the saved position.
/// Falls back to the pose's backward direction when the two coincide.
fn away_from(pose: &SavedPose, enemy_pos: Vec3) -> Vec3 {
    let away = horizontal_direction(enemy_pos, pose.position);
    if away != Vec3::ZERO {
        return away;
    }
    let back = -(pose.rotation * Vec3::Z);
    Vec3::new(back.x, 0.0, back.z).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::persistence::{DELETE_TARGET_ENEMY_KEY, KeyValueStore, MemoryStore};
    use crate::scene::Resolution;
    use crate::sim::state::Outcome;

    fn session() -> Session {
        Session::new(Box::new(MemoryStore::new()))
    }

    fn pose_at(x: f32, z: f32) -> SavedPose {
        SavedPose {
            position: Vec3::new(x, 1.5, z),
            rotation: Quat::IDENTITY,
        }
    }

    fn fresh(session: &mut Session) -> MazeState {
        let mut events = Vec::new();
        MazeState::enter(
            &MazeLayout::default(),
            &MazeTuning::default(),
            session,
            &MazeEntry::Fresh,
            &mut events,
        )
    }

    fn stand_on(maze: &mut MazeState, id: &str) {
        let pos = maze.enemy(&EnemyId::new(id)).unwrap().pos;
        maze.player.pos = pos + Vec3::new(0.0, 0.0, -0.5);
    }

    #[test]
    fn test_camera_views() {
        let top = CameraView::TopDown.relative_move(Vec2::new(1.0, 0.5));
        assert_eq!(top, Vec3::new(1.0, 0.0, 0.5));

        let turned = CameraView::FirstPerson {
            yaw: std::f32::consts::FRAC_PI_2,
        }
        .relative_move(Vec2::new(0.0, 1.0));
        assert!((turned - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_fresh_entry_spawns_and_clears_stale_flag() {
        let mut session = session();
        // Left over from an encounter that never resolved
        session.arm_encounter(&EnemyId::new("Enemy_04"), pose_at(0.0, -12.0));
        session.take_saved_pose();
        session.clear_stale_target();
        assert!(session.in_progress());

        let maze = fresh(&mut session);
        assert_eq!(maze.enemies.len(), 8);
        assert!(!session.in_progress());
        assert_eq!(maze.player.pos, MazeLayout::default().player_spawn);
        assert_eq!(maze.phase, MazePhase::Exploring);
    }

    #[test]
    fn test_trigger_arms_once() {
        let mut session = session();
        let mut maze = fresh(&mut session);
        stand_on(&mut maze, "Enemy_01");

        let mut events = Vec::new();
        let input = MazeInput::default();
        let first = maze.tick(&input, SIM_DT, &mut session, &mut events);
        let transition = first.expect("contact arms an encounter");
        assert_eq!(transition.delay_ticks, 0);
        assert_eq!(
            transition.request,
            SceneRequest::MiniGame(EncounterTicket {
                enemy: EnemyId::new("Enemy_01")
            })
        );
        assert!(session.in_progress());
        assert_eq!(
            session.store().get(DELETE_TARGET_ENEMY_KEY).as_deref(),
            Some("Enemy_01")
        );
        assert!(session.saved_pose().is_some());

        for _ in 0..10 {
            assert!(maze.tick(&input, SIM_DT, &mut session, &mut events).is_none());
        }
        let started = events
            .iter()
            .filter(|e| matches!(e, GameEvent::EncounterStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_contact_ignored_while_in_progress() {
        let mut session = session();
        let mut maze = fresh(&mut session);
        session.arm_encounter(&EnemyId::new("Enemy_05"), pose_at(0.0, 10.0));
        stand_on(&mut maze, "Enemy_01");

        let mut events = Vec::new();
        for _ in 0..5 {
            assert!(maze.tick(&MazeInput::default(), SIM_DT, &mut session, &mut events).is_none());
        }
        assert!(events.is_empty());
        assert_eq!(maze.phase, MazePhase::Exploring);
    }

    #[test]
    fn test_removal_target_contact_ignored() {
        let mut session = session();
        let mut maze = fresh(&mut session);
        let enemy = EnemyId::new("Enemy_02");
        session.arm_encounter(&enemy, pose_at(-5.0, 4.0));
        session.resolve(&enemy, Outcome::Success);
        stand_on(&mut maze, "Enemy_02");

        let mut events = Vec::new();
        assert!(maze.tick(&MazeInput::default(), SIM_DT, &mut session, &mut events).is_none());
        assert!(!session.in_progress());
    }

    #[test]
    fn test_success_reentry_removes_only_target() {
        let mut session = session();
        let enemy = EnemyId::new("Enemy_05");
        session.arm_encounter(&enemy, pose_at(0.0, 9.0));
        let resolution = session.resolve(&enemy, Outcome::Success);

        let mut events = Vec::new();
        let maze = MazeState::enter(
            &MazeLayout::default(),
            &MazeTuning::default(),
            &mut session,
            &MazeEntry::Returning(resolution),
            &mut events,
        );

        assert_eq!(maze.enemies.len(), 7);
        assert!(maze.enemy(&enemy).is_none());
        for other in ["Enemy_01", "Enemy_02", "Enemy_03", "Enemy_04", "Enemy_06", "Enemy_07", "Enemy_08"] {
            assert!(maze.enemy(&EnemyId::new(other)).is_some(), "{other} should remain");
        }
        assert!(session.removal_target().is_none());
        assert!(session.store().get_non_empty(DELETE_TARGET_ENEMY_KEY).is_none());
        assert!(!session.in_progress());
        assert!(events.contains(&GameEvent::EnemyRemoved { enemy: enemy.clone() }));

        // Enemy_05 sits at z = 10; nudged 1m further away from it
        assert!((maze.player.pos - Vec3::new(0.0, 1.5, 8.0)).length() < 1e-5);

        // The defeated enemy stays gone on later loads
        let again = fresh(&mut session);
        assert!(again.enemy(&enemy).is_none());
        assert_eq!(again.enemies.len(), 7);
    }

    #[test]
    fn test_failure_reentry_keeps_enemy_and_retreats() {
        let mut session = session();
        let enemy = EnemyId::new("Enemy_05");
        session.arm_encounter(&enemy, pose_at(0.0, 9.0));
        let resolution = session.resolve(&enemy, Outcome::TimeoutFailure);

        let mut events = Vec::new();
        let maze = MazeState::enter(
            &MazeLayout::default(),
            &MazeTuning::default(),
            &mut session,
            &MazeEntry::Returning(resolution),
            &mut events,
        );

        assert_eq!(maze.enemies.len(), 8);
        assert!(maze.enemy(&enemy).is_some());
        assert!((maze.player.pos - Vec3::new(0.0, 1.5, 7.0)).length() < 1e-5);
        assert!(session.saved_pose().is_none());
    }

    #[test]
    fn test_retreat_without_nearby_enemy_keeps_position() {
        let enemies = vec![Enemy::new(EnemyId::new("Enemy_01"), Vec3::new(10.0, 1.5, 10.0))];
        let pose = SavedPose {
            position: Vec3::new(0.0, 3.0, 0.0),
            rotation: Quat::IDENTITY,
        };
        let pos = retreat_position(&pose, &enemies, &MazeTuning::default());
        assert_eq!(pos, Vec3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_retreat_uses_first_enemy_in_range() {
        let enemies = vec![
            Enemy::new(EnemyId::new("Enemy_01"), Vec3::new(3.0, 1.5, 0.0)),
            Enemy::new(EnemyId::new("Enemy_02"), Vec3::new(0.0, 1.5, 1.0)),
        ];
        let pos = retreat_position(&pose_at(0.0, 0.0), &enemies, &MazeTuning::default());
        assert!((pos - Vec3::new(-2.0, 1.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_coincident_enemy_falls_back_to_facing() {
        let pose = SavedPose {
            position: Vec3::new(1.0, 1.5, 1.0),
            rotation: Quat::IDENTITY,
        };
        let pos = success_restore_position(&pose, Some(pose.position), &MazeTuning::default());
        // Facing +Z, so backing off goes toward -Z
        assert!((pos - Vec3::new(1.0, 1.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_success_without_known_enemy_uses_contact_point() {
        let pose = SavedPose {
            position: Vec3::new(2.0, 4.0, -3.0),
            rotation: Quat::IDENTITY,
        };
        let pos = success_restore_position(&pose, None, &MazeTuning::default());
        assert_eq!(pos, Vec3::new(2.0, 1.5, -3.0));
    }

    #[test]
    fn test_stale_target_is_cleared() {
        let mut session = session();
        let ghost = EnemyId::new("Ghost_99");
        session.arm_encounter(&ghost, pose_at(0.0, 0.0));
        session.resolve(&ghost, Outcome::Success);

        let maze = fresh(&mut session);
        assert_eq!(maze.enemies.len(), 8);
        assert!(session.removal_target().is_none());
    }

    #[test]
    fn test_autopilot_reaches_goal() {
        let mut session = session();
        let layout = MazeLayout {
            enemy_points: Vec::new(),
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut maze = MazeState::enter(
            &layout,
            &MazeTuning::default(),
            &mut session,
            &MazeEntry::Fresh,
            &mut events,
        );

        let input = MazeInput {
            autopilot: true,
            ..Default::default()
        };
        let mut transition = None;
        for _ in 0..600 {
            if let Some(t) = maze.tick(&input, SIM_DT, &mut session, &mut events) {
                transition = Some(t);
                break;
            }
        }
        let transition = transition.expect("goal reached");
        assert_eq!(maze.phase, MazePhase::GoalReached);
        assert!(matches!(transition.request, SceneRequest::Result(_)));
        assert_eq!(transition.delay_ticks, MazeTuning::default().goal_delay_ticks());
        assert!(session.stats().maze_ticks > 0);

        // Frozen afterwards
        let frozen_at = maze.player.pos;
        maze.tick(&input, SIM_DT, &mut session, &mut events);
        assert_eq!(maze.player.pos, frozen_at);
    }

    #[test]
    fn test_dash_drains_stamina() {
        let mut session = session();
        let tuning = MazeTuning {
            use_stamina: true,
            ..Default::default()
        };
        let layout = MazeLayout {
            enemy_points: Vec::new(),
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut maze = MazeState::enter(&layout, &tuning, &mut session, &MazeEntry::Fresh, &mut events);
        let input = MazeInput {
            axis: Vec2::new(1.0, 0.0),
            dash: true,
            ..Default::default()
        };
        let start = maze.player.pos;
        maze.tick(&input, SIM_DT, &mut session, &mut events);
        assert!(maze.player.dashing);
        assert!(maze.player.stamina < tuning.max_stamina);
        assert!((maze.player.pos.x - start.x - tuning.dash_speed * SIM_DT).abs() < 1e-4);
    }

    #[test]
    fn test_resolution_unused_for_fresh_entry() {
        let entry = MazeEntry::Returning(Resolution {
            enemy: EnemyId::new("Enemy_01"),
            outcome: Outcome::Success,
        });
        assert!(entry.resolution().is_some());
        assert!(MazeEntry::Fresh.resolution().is_none());
    }
}
