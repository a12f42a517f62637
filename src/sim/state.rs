//! Simulation context and shared motion helpers
//!
//! The `World` owns every pool, the frame timers and the simulation RNG.
//! It is created on mount and dropped on unmount; nothing lives in ambient
//! scope.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::debris::DebrisPool;
use super::food::FoodPool;
use super::hazard::HazardPool;
use crate::clamp_to_bounds;
use crate::consts::*;

/// Outgoing simulation events, drained once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// A food entity was eaten
    Consumed,
    /// A hazard detonation was accepted
    Detonated,
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct World {
    /// Surface size in pixels
    pub size: Vec2,
    pub food: FoodPool,
    pub hazards: HazardPool,
    pub debris: DebrisPool,
    /// Frames of hazard immunity remaining
    pub hazard_cooldown: u32,
    /// Frames of screen shake remaining
    pub shake_frames: u32,
    /// Frames of avatar chew animation remaining
    pub chew_frames: u32,
    /// Simulation tick counter
    pub frame: u64,
    pub(crate) events: Vec<SimEvent>,
    pub(crate) rng: Pcg32,
}

impl World {
    /// Create a world with a full food pool
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        let size = Vec2::new(width, height);
        let mut rng = Pcg32::seed_from_u64(seed);
        let food = FoodPool::filled(FOOD_COUNT, size, &mut rng);

        Self {
            size,
            food,
            hazards: HazardPool::default(),
            debris: DebrisPool::default(),
            hazard_cooldown: 0,
            shake_frames: 0,
            chew_frames: 0,
            frame: 0,
            events: Vec::new(),
            rng,
        }
    }

    /// Track a new surface size; entities are re-clamped on the next update
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[SimEvent] {
        &self.events
    }
}

/// Uniform sample in `[-range, range)`
#[inline]
pub(crate) fn spread(rng: &mut Pcg32, range: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * range * 2.0
}

/// Uniform point inside the box shrunk by `margin`
pub(crate) fn random_point(rng: &mut Pcg32, size: Vec2, margin: f32) -> Vec2 {
    let span = (size - Vec2::splat(margin * 2.0)).max(Vec2::ZERO);
    Vec2::new(
        margin + rng.random::<f32>() * span.x,
        margin + rng.random::<f32>() * span.y,
    )
}

/// Integrate one frame of bouncing motion
///
/// Velocity flips sign on any axis outside the margin box, then the position
/// is clamped back into it.
pub(crate) fn drift(pos: &mut Vec2, vel: &mut Vec2, size: Vec2) {
    *pos += *vel;
    if pos.x < BOUNDS_MARGIN || pos.x > size.x - BOUNDS_MARGIN {
        vel.x = -vel.x;
    }
    if pos.y < BOUNDS_MARGIN || pos.y > size.y - BOUNDS_MARGIN {
        vel.y = -vel.y;
    }
    *pos = clamp_to_bounds(*pos, size, BOUNDS_MARGIN);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_fills_food() {
        let world = World::new(800.0, 600.0, 7);
        assert_eq!(world.food.len(), FOOD_COUNT);
        assert!(world.hazards.is_empty());
        assert!(world.debris.is_empty());
    }

    #[test]
    fn test_drift_reflects_and_clamps() {
        let size = Vec2::new(100.0, 100.0);
        let mut pos = Vec2::new(79.5, 50.0);
        let mut vel = Vec2::new(1.0, 0.25);
        drift(&mut pos, &mut vel, size);
        assert_eq!(pos.x, 80.0);
        assert_eq!(vel.x, -1.0);
        assert_eq!(vel.y, 0.25);
    }

    #[test]
    fn test_random_point_degenerate_surface() {
        let mut rng = Pcg32::seed_from_u64(1);
        let p = random_point(&mut rng, Vec2::new(10.0, 10.0), 20.0);
        assert_eq!(p, Vec2::splat(20.0));
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut world = World::new(800.0, 600.0, 7);
        world.events.push(SimEvent::Consumed);
        assert_eq!(world.drain_events(), vec![SimEvent::Consumed]);
        assert!(world.pending_events().is_empty());
    }
}
