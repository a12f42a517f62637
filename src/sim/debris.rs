//! Short-lived debris particles spawned by consumption
//!
//! Visual only; the pool is capped so bursts can never grow it unbounded.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::spread;
use crate::consts::*;

/// A debris particle
#[derive(Debug, Clone)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 at spawn, removed at or below 0
    pub life: f32,
    /// Index into `DEBRIS_GLYPH_SIZES`
    pub tier: usize,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl Debris {
    fn random(origin: Vec2, rng: &mut Pcg32) -> Self {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed = 1.5 + rng.random::<f32>() * 3.0;
        Self {
            pos: origin,
            // Slight upward kick so bursts arc before falling
            vel: Vec2::from_angle(angle) * speed - Vec2::Y,
            life: 1.0,
            tier: rng.random_range(0..DEBRIS_GLYPH_SIZES.len()),
            rotation: rng.random::<f32>() * std::f32::consts::TAU,
            rotation_speed: spread(rng, DEBRIS_SPIN_RANGE / 2.0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DebrisPool {
    items: Vec<Debris>,
}

impl DebrisPool {
    /// Spawn a burst of 4-6 particles at `origin`. Returns how many spawned.
    pub fn spawn_burst(&mut self, origin: Vec2, rng: &mut Pcg32) -> usize {
        let wanted = rng.random_range(DEBRIS_MIN_BURST..=DEBRIS_MAX_BURST) as usize;
        let count = wanted.min(MAX_DEBRIS.saturating_sub(self.items.len()));
        for _ in 0..count {
            self.items.push(Debris::random(origin, rng));
        }
        count
    }

    /// Integrate, apply gravity and drag, age, then compact out dead particles
    pub fn update(&mut self) {
        self.items.retain_mut(|d| {
            d.pos += d.vel;
            d.vel.y += DEBRIS_GRAVITY;
            d.vel.x *= DEBRIS_DRAG;
            d.rotation += d.rotation_speed;
            d.life -= DEBRIS_LIFE_STEP;
            d.life > 0.0
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Debris> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_burst_size_and_origin() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let mut pool = DebrisPool::default();
            let origin = Vec2::new(120.0, 80.0);
            let n = pool.spawn_burst(origin, &mut rng);
            assert!((4..=6).contains(&n));
            assert_eq!(pool.len(), n);
            for d in pool.iter() {
                assert_eq!(d.pos, origin);
                assert!(d.tier < DEBRIS_GLYPH_SIZES.len());
                assert_eq!(d.life, 1.0);
            }
        }
    }

    #[test]
    fn test_gravity_and_drag() {
        let mut pool = DebrisPool::default();
        pool.items.push(Debris {
            pos: Vec2::ZERO,
            vel: Vec2::new(2.0, -1.0),
            life: 1.0,
            tier: 0,
            rotation: 0.0,
            rotation_speed: 0.1,
        });
        pool.update();
        let d = &pool.items[0];
        assert_eq!(d.pos, Vec2::new(2.0, -1.0));
        assert!((d.vel.x - 1.96).abs() < 1e-6);
        assert!((d.vel.y - -0.95).abs() < 1e-6);
        assert!((d.life - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_particles_expire() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut pool = DebrisPool::default();
        pool.spawn_burst(Vec2::ZERO, &mut rng);
        for _ in 0..(1.0 / DEBRIS_LIFE_STEP) as usize + 1 {
            pool.update();
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_is_capped() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut pool = DebrisPool::default();
        for _ in 0..MAX_DEBRIS {
            pool.spawn_burst(Vec2::ZERO, &mut rng);
        }
        assert_eq!(pool.len(), MAX_DEBRIS);
        assert_eq!(pool.spawn_burst(Vec2::ZERO, &mut rng), 0);
    }
}
