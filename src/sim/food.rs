//! Food entities and their fixed-size pool
//!
//! Food is never deallocated: an eaten entity glides into the avatar and its
//! slot is reinitialised in place near the pointer.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{drift, random_point, spread};
use crate::clamp_to_bounds;
use crate::consts::*;

/// Food lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FoodState {
    /// Roaming and bouncing inside the surface
    Roaming,
    /// Gliding from `start` into the avatar at `target`
    Eaten { progress: f32, start: Vec2, target: Vec2 },
}

/// A food entity
#[derive(Debug, Clone)]
pub struct Food {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub state: FoodState,
}

impl Food {
    /// Random roaming food inside the surface margin
    pub fn random(size: Vec2, rng: &mut Pcg32) -> Self {
        let pos = random_point(rng, size, BOUNDS_MARGIN);
        Self {
            pos,
            vel: Vec2::new(
                spread(rng, FOOD_SPEED_RANGE),
                spread(rng, FOOD_SPEED_RANGE),
            ),
            rotation: rng.random::<f32>() * std::f32::consts::TAU,
            rotation_speed: spread(rng, FOOD_SPIN_RANGE / 2.0),
            state: FoodState::Roaming,
        }
    }

    pub fn is_eaten(&self) -> bool {
        matches!(self.state, FoodState::Eaten { .. })
    }

    /// Start the consumption glide toward `target`
    pub fn eat(&mut self, target: Vec2) {
        self.state = FoodState::Eaten {
            progress: 0.0,
            start: self.pos,
            target,
        };
    }

    /// Glide progress in [0, 1] (0 while roaming)
    pub fn eaten_progress(&self) -> f32 {
        match self.state {
            FoodState::Eaten { progress, .. } => progress.min(1.0),
            FoodState::Roaming => 0.0,
        }
    }

    /// Draw position: the roaming position, or the eased glide point
    pub fn glide_position(&self) -> Vec2 {
        match self.state {
            FoodState::Roaming => self.pos,
            FoodState::Eaten {
                progress,
                start,
                target,
            } => {
                let t = progress.min(1.0);
                start + (target - start) * (t * t)
            }
        }
    }

    /// Reinitialise this slot inside the respawn annulus around `pointer`
    pub fn respawn_near(&mut self, pointer: Vec2, size: Vec2, rng: &mut Pcg32) {
        *self = Food::random(size, rng);
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let dist = RESPAWN_INNER_RADIUS
            + rng.random::<f32>() * (RESPAWN_OUTER_RADIUS - RESPAWN_INNER_RADIUS);
        self.pos = clamp_to_bounds(pointer + Vec2::from_angle(angle) * dist, size, RESPAWN_MARGIN);
    }
}

/// Fixed-size food pool
#[derive(Debug, Clone, Default)]
pub struct FoodPool {
    items: Vec<Food>,
}

impl FoodPool {
    pub fn filled(count: usize, size: Vec2, rng: &mut Pcg32) -> Self {
        Self {
            items: (0..count).map(|_| Food::random(size, rng)).collect(),
        }
    }

    /// Advance every entity by one frame
    ///
    /// Roaming food drifts; eaten food advances its glide and is recycled near
    /// `pointer` once the glide completes. Returns the recycled slot indices.
    pub fn update(&mut self, size: Vec2, pointer: Vec2, rng: &mut Pcg32) -> Vec<usize> {
        let mut recycled = Vec::new();
        for (index, food) in self.items.iter_mut().enumerate() {
            if let FoodState::Eaten { progress, .. } = &mut food.state {
                *progress += 1.0 / EAT_DURATION_FRAMES;
                if *progress >= 1.0 {
                    food.respawn_near(pointer, size, rng);
                    recycled.push(index);
                    log::trace!("food respawned at {:?}", food.pos);
                }
                continue;
            }

            drift(&mut food.pos, &mut food.vel, size);
            food.rotation += food.rotation_speed;
        }
        recycled
    }

    pub fn iter(&self) -> impl Iterator<Item = &Food> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Food> {
        self.items.iter_mut()
    }

    /// Roaming (non-terminal) food only
    pub fn roaming(&self) -> impl Iterator<Item = &Food> {
        self.items.iter().filter(|f| !f.is_eaten())
    }

    pub fn as_slice(&self) -> &[Food] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Food {
        &mut self.items[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_random_food_inside_margin() {
        let mut rng = rng();
        let size = Vec2::new(640.0, 480.0);
        for _ in 0..200 {
            let f = Food::random(size, &mut rng);
            assert!(f.pos.x >= BOUNDS_MARGIN && f.pos.x <= size.x - BOUNDS_MARGIN);
            assert!(f.pos.y >= BOUNDS_MARGIN && f.pos.y <= size.y - BOUNDS_MARGIN);
            assert!(f.vel.x.abs() <= FOOD_SPEED_RANGE);
            assert!(f.rotation_speed.abs() <= FOOD_SPIN_RANGE / 2.0);
        }
    }

    #[test]
    fn test_glide_eases_quadratically() {
        let mut f = Food::random(Vec2::new(800.0, 600.0), &mut rng());
        f.pos = Vec2::new(100.0, 100.0);
        f.eat(Vec2::new(200.0, 100.0));
        if let FoodState::Eaten { progress, .. } = &mut f.state {
            *progress = 0.5;
        }
        assert!((f.glide_position().x - 125.0).abs() < 1e-4);
        // Stored position is untouched during the glide
        assert_eq!(f.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_eaten_food_recycles_after_duration() {
        let size = Vec2::new(1600.0, 1200.0);
        let mut rng = rng();
        let mut pool = FoodPool::filled(1, size, &mut rng);
        let pointer = Vec2::new(800.0, 600.0);
        pool.get_mut(0).eat(pointer);

        let mut last = 0.0;
        let mut frames = 0;
        while pool.as_slice()[0].is_eaten() {
            let progress = pool.as_slice()[0].eaten_progress();
            assert!(progress >= last, "progress must not decrease");
            last = progress;
            pool.update(size, pointer, &mut rng);
            frames += 1;
            assert!(frames <= EAT_DURATION_FRAMES as u32 + 1);
        }
        assert!(frames >= EAT_DURATION_FRAMES as u32 - 1);
        assert_eq!(pool.len(), 1);

        let dist = pool.as_slice()[0].pos.distance(pointer);
        assert!(dist >= RESPAWN_INNER_RADIUS - 1e-3 && dist <= RESPAWN_OUTER_RADIUS + 1e-3);
    }

    #[test]
    fn test_respawn_clamped_to_surface() {
        let size = Vec2::new(300.0, 300.0);
        let mut rng = rng();
        let mut f = Food::random(size, &mut rng);
        f.respawn_near(Vec2::new(150.0, 150.0), size, &mut rng);
        // Annulus lies entirely outside a 300px surface, so clamping applies
        assert!(f.pos.x >= RESPAWN_MARGIN && f.pos.x <= size.x - RESPAWN_MARGIN);
        assert!(f.pos.y >= RESPAWN_MARGIN && f.pos.y <= size.y - RESPAWN_MARGIN);
        assert_eq!(f.state, FoodState::Roaming);
    }
}
