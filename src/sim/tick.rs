//! Per-frame simulation tick
//!
//! One call advances the world by exactly one display frame. Terminal
//! animations are measured in frames, so the simulation assumes a stable
//! refresh rate.

use glam::Vec2;

use super::interaction::{resolve_food, resolve_hazards};
use super::state::{SimEvent, World};
use crate::consts::*;

/// Inputs sampled once per frame
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Latest tracked pointer position (sentinel when absent)
    pub pointer: Vec2,
    /// Desired number of armed hazards
    pub hazard_target: u32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            pointer: POINTER_SENTINEL,
            hazard_target: 0,
        }
    }
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput) {
    world.frame += 1;
    world.shake_frames = world.shake_frames.saturating_sub(1);
    world.chew_frames = world.chew_frames.saturating_sub(1);

    // --- Food ---
    let recycled = world.food.update(world.size, input.pointer, &mut world.rng);
    for pos in resolve_food(&mut world.food, input.pointer, &recycled) {
        world.chew_frames = CHEW_FRAMES;
        world.debris.spawn_burst(pos, &mut world.rng);
        world.events.push(SimEvent::Consumed);
    }

    // --- Hazards ---
    world.hazards.update(world.size);
    if let Some(pos) = resolve_hazards(&mut world.hazards, &mut world.hazard_cooldown, input.pointer) {
        log::debug!("hazard detonated at ({:.0}, {:.0})", pos.x, pos.y);
        world.shake_frames = SHAKE_FRAMES;
        world.events.push(SimEvent::Detonated);
    }
    // Rebalance last so the armed count matches the target after every frame
    world
        .hazards
        .rebalance(input.hazard_target, world.size, input.pointer, &mut world.rng);

    // --- Debris ---
    world.debris.update();
}
