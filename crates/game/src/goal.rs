//! Collectible goals (stars) and their timed spawner.

use engine_core::{Mat4, Quat, Transform, Vec3};
use rand::rngs::StdRng;
use rand::Rng;

use crate::level::LevelState;

/// Collision radius around a goal.
pub const GOAL_RADIUS: f32 = 0.4;
/// Spin per tick once goals rotate (radians).
pub const GOAL_SPIN: f32 = 0.02;
pub const GOAL_DRAW_SCALE: f32 = 0.5;
/// Milliseconds between spawns.
pub const SPAWN_DELAY_MS: f32 = 2000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub position: Vec3,
    pub radius: f32,
    pub angle: f32,
    pub hit: bool,
}

impl Goal {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            radius: GOAL_RADIUS,
            angle: 0.0,
            hit: false,
        }
    }

    pub fn update(&mut self, level: LevelState) {
        if level.goals_spin() {
            self.angle += GOAL_SPIN;
        }
    }

    /// Marks the goal hit when `point` is strictly inside its radius. A goal is hit
    /// at most once.
    pub fn check_collision(&mut self, point: Vec3) -> bool {
        if self.hit {
            return false;
        }
        if self.position.distance_squared(point) < self.radius * self.radius {
            self.hit = true;
            return true;
        }
        false
    }

    pub fn model_matrix(&self) -> Mat4 {
        Transform::from_position_rotation(self.position, Quat::from_rotation_y(self.angle))
            .with_uniform_scale(GOAL_DRAW_SCALE)
            .to_matrix()
    }
}

/// Drops a new goal ahead of the plane every [`SPAWN_DELAY_MS`].
pub struct GoalSpawner {
    timer_ms: f32,
    delay_ms: f32,
    rng: StdRng,
}

impl GoalSpawner {
    /// The timer starts full so the first update spawns immediately.
    pub fn new(rng: StdRng) -> Self {
        Self {
            timer_ms: SPAWN_DELAY_MS,
            delay_ms: SPAWN_DELAY_MS,
            rng,
        }
    }

    #[cfg(test)]
    pub fn timer_ms(&self) -> f32 {
        self.timer_ms
    }

    pub fn tick(&mut self, dt_ms: f32, plane_z: f32, level: LevelState) -> Option<Goal> {
        self.timer_ms += dt_ms;
        if self.timer_ms <= self.delay_ms {
            return None;
        }
        self.timer_ms = 0.0;

        let x = self.rng.gen_range(-5.0..5.0);
        let z = plane_z + self.rng.gen_range(0.0..10.0) + 5.0;
        let y = if level.free_flight() {
            self.rng.gen_range(-2.0..2.0)
        } else {
            -0.5
        };
        log::debug!("Spawned goal at ({:.2}, {:.2}, {:.2})", x, y, z);
        Some(Goal::new(Vec3::new(x, y, z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn collision_boundary() {
        let mut near = Goal::new(Vec3::new(0.3, -0.5, 0.0));
        assert!(near.check_collision(Vec3::new(0.0, -0.5, 0.0)));
        assert!(near.hit);
        // Already hit goals never collide again.
        assert!(!near.check_collision(Vec3::new(0.0, -0.5, 0.0)));

        let mut far = Goal::new(Vec3::new(0.5, -0.5, 0.0));
        assert!(!far.check_collision(Vec3::new(0.0, -0.5, 0.0)));
        assert!(!far.hit);
    }

    #[test]
    fn goals_spin_from_level_one() {
        let mut goal = Goal::new(Vec3::ZERO);
        goal.update(LevelState::new(0));
        assert_eq!(goal.angle, 0.0);
        goal.update(LevelState::new(1));
        goal.update(LevelState::new(2));
        assert!((goal.angle - 2.0 * GOAL_SPIN).abs() < 1e-6);
    }

    #[test]
    fn first_tick_spawns_then_waits() {
        let mut spawner = GoalSpawner::new(StdRng::seed_from_u64(7));
        assert!(spawner.tick(1.0, 0.0, LevelState::default()).is_some());
        assert_eq!(spawner.timer_ms(), 0.0);
        assert!(spawner.tick(1.0, 0.0, LevelState::default()).is_none());
        assert!(spawner.tick(1999.0, 0.0, LevelState::default()).is_none());
        assert!(spawner.tick(1.0, 0.0, LevelState::default()).is_some());
    }

    #[test]
    fn spawn_placement_bounds() {
        let mut spawner = GoalSpawner::new(StdRng::seed_from_u64(99));
        for _ in 0..200 {
            let goal = spawner.tick(2001.0, 10.0, LevelState::new(0)).unwrap();
            assert!((-5.0..5.0).contains(&goal.position.x));
            assert!((15.0..25.0).contains(&goal.position.z));
            assert_eq!(goal.position.y, -0.5);
        }
        for _ in 0..200 {
            let goal = spawner.tick(2001.0, 0.0, LevelState::new(2)).unwrap();
            assert!((-2.0..2.0).contains(&goal.position.y));
        }
    }

    #[test]
    fn model_matrix_scales_goal() {
        let goal = Goal::new(Vec3::new(1.0, 2.0, 3.0));
        let m = goal.model_matrix();
        assert!((m.transform_point3(Vec3::ZERO) - goal.position).length() < 1e-6);
        assert!((m.transform_vector3(Vec3::X).length() - GOAL_DRAW_SCALE).abs() < 1e-6);
    }
}
