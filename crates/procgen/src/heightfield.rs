//! Height field sampled by every terrain chunk.
//!
//! **Seed-based determinism:** the noise is derived only from the world seed, so the
//! same seed yields the same height at every (x, z) regardless of chunk load order.
//! Neighbouring chunks sample the same continuous function along their shared edge,
//! which is what keeps the seams closed.

use noise::{NoiseFn, Perlin};

/// Input scale applied to world coordinates before sampling noise.
pub const HEIGHT_FREQUENCY: f64 = 0.1;
/// Noise amplitude in world units.
pub const HEIGHT_AMPLITUDE: f64 = 3.0;
/// Constant offset; keeps the ground below the default flight altitude.
pub const HEIGHT_OFFSET: f64 = -4.0;

/// Derive a deterministic u32 noise seed from a world seed and an offset.
/// Same (seed, offset) always gives the same result so terrain is reproducible.
#[inline]
fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// Pure `height(x, z)` function backed by 2D Perlin noise.
#[derive(Clone)]
pub struct HeightField {
    perlin: Perlin,
    seed: u64,
}

impl std::fmt::Debug for HeightField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeightField").field("seed", &self.seed).finish()
    }
}

impl HeightField {
    pub fn new(world_seed: u64) -> Self {
        Self {
            perlin: Perlin::new(deterministic_noise_seed(world_seed, 0)),
            seed: world_seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `noise(x * 0.1, z * 0.1) * 3 - 4`.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        let n = self
            .perlin
            .get([x as f64 * HEIGHT_FREQUENCY, z as f64 * HEIGHT_FREQUENCY]);
        (n * HEIGHT_AMPLITUDE + HEIGHT_OFFSET) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_is_deterministic() {
        let field = HeightField::new(1234);
        let a = field.height(13.7, -42.25);
        let b = field.height(13.7, -42.25);
        assert_eq!(a, b);

        let other = HeightField::new(1234);
        assert_eq!(other.height(13.7, -42.25), a);
    }

    #[test]
    fn height_stays_in_noise_band() {
        let field = HeightField::new(7);
        for i in 0..200 {
            let x = i as f32 * 1.37 - 100.0;
            let z = i as f32 * -0.91 + 30.0;
            let h = field.height(x, z);
            assert!((-7.5..=-0.5).contains(&h), "height {} out of band at ({}, {})", h, x, z);
        }
    }

    #[test]
    fn adjacent_samples_are_close() {
        let field = HeightField::new(99);
        let step = 0.01;
        for i in 0..100 {
            let x = i as f32 * 0.73;
            let h0 = field.height(x, 5.0);
            let h1 = field.height(x + step, 5.0);
            assert!((h0 - h1).abs() < 0.1, "discontinuity at x = {}", x);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = HeightField::new(1);
        let b = HeightField::new(2);
        let differs = (0..50).any(|i| {
            let p = i as f32 * 2.3 + 0.5;
            a.height(p, p * 0.5) != b.height(p, p * 0.5)
        });
        assert!(differs);
    }
}
