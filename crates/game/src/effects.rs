//! Transient goal-collection effects: the pulsing pickup animation (level 1) and the
//! particle burst (level 2). Both are tick-driven, not time-driven.

use engine_core::{Mat4, Transform, Vec3};
use rand::Rng;

pub const ANIMATION_LIFETIME: u32 = 60;
pub const PARTICLE_LIFE: u32 = 60;
pub const PARTICLES_PER_EXPLOSION: usize = 30;
/// Each velocity component is drawn from `[-PARTICLE_SPEED, PARTICLE_SPEED)`.
pub const PARTICLE_SPEED: f32 = 0.05;
pub const PARTICLE_DRAW_SCALE: f32 = 0.05;

/// Goal mesh that swells and shrinks where a goal was collected.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalAnimation {
    pub position: Vec3,
    pub time: u32,
    pub lifetime: u32,
}

impl GoalAnimation {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            time: 0,
            lifetime: ANIMATION_LIFETIME,
        }
    }

    pub fn update(&mut self) {
        self.time += 1;
    }

    pub fn is_done(&self) -> bool {
        self.time > self.lifetime
    }

    pub fn scale(&self) -> f32 {
        0.5 + (std::f32::consts::PI * self.time as f32 / self.lifetime as f32).sin()
    }

    pub fn model_matrix(&self) -> Mat4 {
        Transform::from_position(self.position)
            .with_uniform_scale(self.scale())
            .to_matrix()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub age: u32,
    pub life: u32,
}

impl Particle {
    pub fn new<R: Rng>(origin: Vec3, rng: &mut R) -> Self {
        let mut component = || rng.gen_range(-PARTICLE_SPEED..PARTICLE_SPEED);
        let velocity = Vec3::new(component(), component(), component());
        Self {
            position: origin,
            velocity,
            age: 0,
            life: PARTICLE_LIFE,
        }
    }

    pub fn update(&mut self) {
        self.age += 1;
        self.position += self.velocity;
    }

    pub fn is_dead(&self) -> bool {
        self.age > self.life
    }

    pub fn model_matrix(&self) -> Mat4 {
        Transform::from_position(self.position)
            .with_uniform_scale(PARTICLE_DRAW_SCALE)
            .to_matrix()
    }
}

/// A burst of particles from one collected goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalExplosion {
    pub particles: Vec<Particle>,
}

impl GoalExplosion {
    pub fn new<R: Rng>(origin: Vec3, rng: &mut R) -> Self {
        let particles = (0..PARTICLES_PER_EXPLOSION)
            .map(|_| Particle::new(origin, rng))
            .collect();
        Self { particles }
    }

    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.update();
        }
        self.particles.retain(|p| !p.is_dead());
    }

    pub fn is_done(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn animation_pulses_and_ends() {
        let mut anim = GoalAnimation::new(Vec3::ZERO);
        assert!((anim.scale() - 0.5).abs() < 1e-6);
        for _ in 0..30 {
            anim.update();
        }
        assert!((anim.scale() - 1.5).abs() < 1e-5);
        for _ in 0..30 {
            anim.update();
        }
        assert!(!anim.is_done());
        anim.update();
        assert!(anim.is_done());
    }

    #[test]
    fn particle_lives_sixty_updates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = Particle::new(Vec3::ZERO, &mut rng);
        for tick in 1..=60 {
            p.update();
            assert!(!p.is_dead(), "dead too early at update {}", tick);
        }
        p.update();
        assert!(p.is_dead());
    }

    #[test]
    fn particle_moves_by_fixed_velocity() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut p = Particle::new(Vec3::ONE, &mut rng);
        let v = p.velocity;
        assert!(v.abs().max_element() <= PARTICLE_SPEED);
        p.update();
        p.update();
        assert!((p.position - (Vec3::ONE + 2.0 * v)).length() < 1e-6);
    }

    #[test]
    fn explosion_empties_after_particle_life() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut explosion = GoalExplosion::new(Vec3::ZERO, &mut rng);
        assert_eq!(explosion.particles.len(), PARTICLES_PER_EXPLOSION);
        for _ in 0..60 {
            explosion.update();
        }
        assert!(!explosion.is_done());
        explosion.update();
        assert!(explosion.is_done());
    }
}
