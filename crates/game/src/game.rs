//! The game state machine: plane, goals, pickup effects, score and level.
//!
//! `Game` owns every entity and advances them once per tick. It never touches the
//! renderer; transitions the rest of the app cares about are queued as [`GameEvent`]s
//! and drained by the frame loop.

use engine_core::Vec3;
use input::FlightControls;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::effects::{GoalAnimation, GoalExplosion};
use crate::goal::{Goal, GoalSpawner};
use crate::level::LevelState;
use crate::plane::Plane;

/// Goals needed per level-up.
pub const GOALS_PER_LEVEL: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Emitted on every hit, after any level change from that hit.
    ScoreChanged { score: u32, level: LevelState },
    LevelUp(LevelState),
    /// Emitted once, when level 1 is first reached.
    LightingEnabled,
}

pub struct Game {
    plane: Plane,
    goals: Vec<Goal>,
    animations: Vec<GoalAnimation>,
    explosions: Vec<GoalExplosion>,
    score: u32,
    level: LevelState,
    lighting: bool,
    spawner: GoalSpawner,
    effect_rng: StdRng,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        Self {
            plane: Plane::new(),
            goals: Vec::new(),
            animations: Vec::new(),
            explosions: Vec::new(),
            score: 0,
            level: LevelState::default(),
            lighting: false,
            spawner: GoalSpawner::new(StdRng::seed_from_u64(seed)),
            effect_rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            events: Vec::new(),
        }
    }

    /// Advance one tick. `dt_ms` only drives the spawn timer; all motion is per tick.
    pub fn update(&mut self, dt_ms: f32, controls: FlightControls) {
        self.plane.update(controls, self.level);

        if let Some(goal) = self.spawner.tick(dt_ms, self.plane.position.z, self.level) {
            self.goals.push(goal);
        }

        // The level can change part-way through the scan; later goals see the new one.
        for i in 0..self.goals.len() {
            self.goals[i].update(self.level);
            if self.goals[i].check_collision(self.plane.position) {
                let position = self.goals[i].position;
                self.on_goal_hit(position);
            }
        }
        self.goals.retain(|g| !g.hit);

        for animation in &mut self.animations {
            animation.update();
        }
        self.animations.retain(|a| !a.is_done());

        for explosion in &mut self.explosions {
            explosion.update();
        }
        self.explosions.retain(|e| !e.is_done());
    }

    fn on_goal_hit(&mut self, position: Vec3) {
        self.score += 1;

        match self.level.value() {
            1 => self.animations.push(GoalAnimation::new(position)),
            2 => self
                .explosions
                .push(GoalExplosion::new(position, &mut self.effect_rng)),
            _ => {}
        }

        if self.score % GOALS_PER_LEVEL == 0 && !self.level.is_max() {
            self.level = self.level.advanced();
            log::info!("Level up: {}", self.level);
            self.events.push(GameEvent::LevelUp(self.level));
            if self.level.value() == 1 && !self.lighting {
                self.lighting = true;
                self.events.push(GameEvent::LightingEnabled);
            }
        }

        self.events.push(GameEvent::ScoreChanged {
            score: self.score,
            level: self.level,
        });
    }

    /// Take all events queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn animations(&self) -> &[GoalAnimation] {
        &self.animations
    }

    pub fn explosions(&self) -> &[GoalExplosion] {
        &self.explosions
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> LevelState {
        self.level
    }

    pub fn lighting(&self) -> bool {
        self.lighting
    }

    /// Place a goal directly (the spawner still runs on its own timer).
    #[cfg(test)]
    pub fn add_goal(&mut self, goal: Goal) {
        self.goals.push(goal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> FlightControls {
        FlightControls::default()
    }

    /// Puts a goal right where the plane will be after its next tick.
    fn goal_on_plane(game: &mut Game) {
        let p = game.plane().position;
        game.add_goal(Goal::new(p + Vec3::new(0.0, 0.0, 0.1)));
    }

    fn hit_once(game: &mut Game) {
        goal_on_plane(game);
        game.update(1.0, idle());
    }

    #[test]
    fn first_update_spawns_a_goal() {
        let mut game = Game::new(1);
        assert!(game.goals().is_empty());
        game.update(1.0, idle());
        assert_eq!(game.goals().len(), 1);
        game.update(1.0, idle());
        assert_eq!(game.goals().len(), 1);
    }

    #[test]
    fn third_hit_reaches_level_one_and_enables_lighting_once() {
        let mut game = Game::new(2);
        hit_once(&mut game);
        hit_once(&mut game);
        assert_eq!(game.level().value(), 0);
        assert!(!game.lighting());
        game.drain_events();

        hit_once(&mut game);
        assert_eq!(game.score(), 3);
        assert_eq!(game.level().value(), 1);
        assert!(game.lighting());
        let events = game.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::LevelUp(LevelState::new(1)),
                GameEvent::LightingEnabled,
                GameEvent::ScoreChanged {
                    score: 3,
                    level: LevelState::new(1)
                },
            ]
        );

        for _ in 0..6 {
            hit_once(&mut game);
        }
        let lighting_events = game
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::LightingEnabled)
            .count();
        assert_eq!(lighting_events, 0);
    }

    #[test]
    fn level_ratchets_and_saturates() {
        let mut game = Game::new(3);
        for _ in 0..5 {
            hit_once(&mut game);
        }
        assert_eq!(game.score(), 5);
        assert_eq!(game.level().value(), 1);

        hit_once(&mut game);
        assert_eq!(game.level().value(), 2);

        for _ in 0..6 {
            hit_once(&mut game);
        }
        assert_eq!(game.score(), 12);
        assert_eq!(game.level(), LevelState::MAX);
    }

    #[test]
    fn hit_effect_uses_level_before_advance() {
        let mut game = Game::new(4);
        for _ in 0..3 {
            hit_once(&mut game);
        }
        // Level 0 hits (including the one that advanced to 1) spawn no effect.
        assert!(game.animations().is_empty());
        assert!(game.explosions().is_empty());

        hit_once(&mut game);
        assert_eq!(game.animations().len(), 1);

        hit_once(&mut game);
        hit_once(&mut game);
        assert_eq!(game.level().value(), 2);
        assert!(game.explosions().is_empty());

        hit_once(&mut game);
        assert_eq!(game.explosions().len(), 1);
    }

    #[test]
    fn hit_goals_are_removed_and_effects_expire() {
        let mut game = Game::new(5);
        for _ in 0..4 {
            hit_once(&mut game);
        }
        assert!(game.goals().iter().all(|g| !g.hit));
        assert_eq!(game.animations().len(), 1);
        for _ in 0..60 {
            game.update(1.0, idle());
        }
        assert!(game.animations().is_empty());
    }

    #[test]
    fn every_hit_reports_score() {
        let mut game = Game::new(6);
        hit_once(&mut game);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::ScoreChanged {
                score: 1,
                level: LevelState::new(0)
            }]
        );
        assert!(game.drain_events().is_empty());
    }
}
