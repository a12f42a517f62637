//! Hazard entities and their demand-driven pool
//!
//! Unlike food, hazards are truly removed once their explosion finishes; the
//! pool is rebalanced toward the configured target every frame.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{drift, random_point, spread};
use crate::consts::*;

/// Hazard lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HazardState {
    Armed,
    Exploding { progress: f32 },
}

/// A hazard entity
#[derive(Debug, Clone)]
pub struct Hazard {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub state: HazardState,
}

impl Hazard {
    /// Spawn a hazard away from the pointer
    ///
    /// Rejection-samples up to `HAZARD_SPAWN_ATTEMPTS` points; if none clears
    /// `HAZARD_SAFE_DISTANCE` the last sample is accepted so spawning always
    /// terminates.
    pub fn spawn(size: Vec2, pointer: Vec2, rng: &mut Pcg32) -> Self {
        let safe_sq = HAZARD_SAFE_DISTANCE * HAZARD_SAFE_DISTANCE;
        let mut pos = random_point(rng, size, HAZARD_SPAWN_MARGIN);
        for _ in 1..HAZARD_SPAWN_ATTEMPTS {
            if pos.distance_squared(pointer) > safe_sq {
                break;
            }
            pos = random_point(rng, size, HAZARD_SPAWN_MARGIN);
        }

        Self {
            pos,
            vel: Vec2::new(
                spread(rng, HAZARD_SPEED_RANGE),
                spread(rng, HAZARD_SPEED_RANGE),
            ),
            rotation: rng.random::<f32>() * std::f32::consts::TAU,
            rotation_speed: spread(rng, HAZARD_SPIN_RANGE / 2.0),
            state: HazardState::Armed,
        }
    }

    pub fn is_exploding(&self) -> bool {
        matches!(self.state, HazardState::Exploding { .. })
    }

    pub fn detonate(&mut self) {
        self.state = HazardState::Exploding { progress: 0.0 };
    }

    pub fn explode_progress(&self) -> f32 {
        match self.state {
            HazardState::Exploding { progress } => progress.min(1.0),
            HazardState::Armed => 0.0,
        }
    }

    /// Advance one frame. Returns false once the explosion has finished.
    fn step(&mut self, size: Vec2) -> bool {
        if let HazardState::Exploding { progress } = &mut self.state {
            *progress += 1.0 / EXPLODE_DURATION_FRAMES;
            return *progress < 1.0;
        }

        drift(&mut self.pos, &mut self.vel, size);
        self.rotation += self.rotation_speed;
        true
    }
}

/// Demand-driven hazard pool
#[derive(Debug, Clone, Default)]
pub struct HazardPool {
    items: Vec<Hazard>,
}

impl HazardPool {
    /// Advance every hazard and compact out finished explosions
    pub fn update(&mut self, size: Vec2) {
        self.items.retain_mut(|h| h.step(size));
    }

    /// Grow or shrink the armed population toward `target`
    ///
    /// Deficits are spawned away from the pointer; excess armed hazards are
    /// removed from the tail. Exploding hazards are never removed here.
    pub fn rebalance(&mut self, target: u32, size: Vec2, pointer: Vec2, rng: &mut Pcg32) {
        let target = target as usize;
        let armed = self.armed_count();

        if armed < target {
            for _ in 0..target - armed {
                self.items.push(Hazard::spawn(size, pointer, rng));
            }
        } else if armed > target {
            let mut to_remove = armed - target;
            let mut i = self.items.len();
            while i > 0 && to_remove > 0 {
                i -= 1;
                if !self.items[i].is_exploding() {
                    self.items.remove(i);
                    to_remove -= 1;
                }
            }
        }
    }

    pub fn armed_count(&self) -> usize {
        self.items.iter().filter(|h| !h.is_exploding()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Hazard> {
        self.items.iter_mut()
    }

    /// Armed (non-terminal) hazards only
    pub fn armed(&self) -> impl Iterator<Item = &Hazard> {
        self.items.iter().filter(|h| !h.is_exploding())
    }

    pub fn as_slice(&self) -> &[Hazard] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, hazard: Hazard) {
        self.items.push(hazard);
    }
}
