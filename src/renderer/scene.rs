//! Frame geometry builder
//!
//! Reads the world and sprite cache and emits one mesh in draw order:
//! connections, food, hazards, debris, avatar. The whole frame is offset by
//! the screen shake.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::connections;
use super::shapes::Mesh;
use super::vertex::colors;
use crate::consts::*;
use crate::input::InputTracker;
use crate::settings::Settings;
use crate::sim::World;
use crate::sprites::{SpriteCache, SpriteId};

const CIRCLE_SEGMENTS: u32 = 32;
const GLOW_SEGMENTS: u32 = 24;

/// Motion effects that can be switched off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStyle {
    pub shake: bool,
    pub tremble: bool,
}

impl SceneStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            shake: settings.effective_screen_shake(),
            tremble: !settings.reduced_motion,
        }
    }
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            shake: true,
            tremble: true,
        }
    }
}

/// Builds frame meshes. Owns the visual jitter RNG so shake and tremble never
/// touch the simulation stream.
pub struct SceneBuilder {
    rng: Pcg32,
}

impl SceneBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform in [-amount/2, amount/2)
    fn jitter(&mut self, amount: f32) -> f32 {
        (self.rng.random::<f32>() - 0.5) * amount
    }

    pub fn build(&mut self, world: &World, input: &InputTracker, sprites: &SpriteCache, style: SceneStyle) -> Mesh {
        let mut mesh = Mesh::new(sprites.atlas().white_uv());
        let pointer = input.position();

        let shake = if style.shake && world.shake_frames > 0 {
            let intensity = world.shake_frames as f32 * 0.6;
            Vec2::new(self.jitter(intensity), self.jitter(intensity))
        } else {
            Vec2::ZERO
        };

        for c in connections::collect(world, pointer) {
            mesh.line(c.from, c.to, c.width(), c.color());
        }

        self.food(&mut mesh, world, pointer, sprites, style);
        self.hazards(&mut mesh, world, pointer, sprites, style);

        for d in world.debris.iter() {
            if let Some(rect) = sprites.get(SpriteId::Debris(d.tier)) {
                mesh.sprite(rect, d.pos, d.rotation, 1.0, d.life.clamp(0.0, 1.0));
            }
        }

        if input.is_on_surface() {
            if let Some(rect) = sprites.get(SpriteId::Avatar) {
                let bounce = if world.chew_frames > 0 {
                    (world.chew_frames as f32 * 0.5).sin() * 3.0
                } else {
                    0.0
                };
                mesh.sprite(rect, pointer + Vec2::new(0.0, bounce), 0.0, 1.0, 1.0);
            }
        }

        mesh.translate_from(0, shake);
        mesh
    }

    fn food(&mut self, mesh: &mut Mesh, world: &World, pointer: Vec2, sprites: &SpriteCache, style: SceneStyle) {
        let Some(rect) = sprites.get(SpriteId::Food) else {
            return;
        };
        let glow_range = EAT_RADIUS * 3.5;

        for f in world.food.iter() {
            if f.is_eaten() {
                let t = f.eaten_progress();
                if t < 1.0 {
                    let scale = 1.0 - t;
                    mesh.sprite(rect, f.glide_position(), f.rotation + t * 8.0, scale, scale);
                }
                continue;
            }

            let dist = f.pos.distance(pointer);
            let mut center = f.pos;
            if dist < glow_range {
                let g = 1.0 - dist / glow_range;
                let mut color = colors::FOOD_GLOW;
                color[3] = g * 0.5;
                mesh.glow(f.pos, FOOD_GLYPH_SIZE as f32 * 0.3, 40.0 * g, color, GLOW_SEGMENTS);
                if style.tremble {
                    let tremble = g * 4.0;
                    center += Vec2::new(self.jitter(tremble), self.jitter(tremble));
                }
            }
            mesh.sprite(rect, center, f.rotation, 1.0, 1.0);
        }
    }

    fn hazards(&mut self, mesh: &mut Mesh, world: &World, pointer: Vec2, sprites: &SpriteCache, style: SceneStyle) {
        let Some(rect) = sprites.get(SpriteId::Hazard) else {
            return;
        };
        let glow_range = HAZARD_RADIUS * 3.0;

        for h in world.hazards.iter() {
            if h.is_exploding() {
                let t = h.explode_progress();
                let radius = t * 80.0;
                let alpha = 1.0 - t;

                let mut flash = colors::BLAST_FLASH;
                flash[3] *= alpha;
                mesh.circle(h.pos, radius, flash, CIRCLE_SEGMENTS);

                let mut ring = colors::BLAST_RING;
                ring[3] *= alpha;
                let half_width = (3.0 + (1.0 - t) * 4.0) / 2.0;
                mesh.ring(h.pos, (radius - half_width).max(0.0), radius + half_width, ring, CIRCLE_SEGMENTS);

                // Bomb shrinks away during the first part of the blast
                if t < 0.4 {
                    let scale = 1.0 - t * 2.5;
                    mesh.sprite(rect, h.pos, h.rotation + t * 12.0, scale, scale);
                }
                continue;
            }

            let dist = h.pos.distance(pointer);
            let mut center = h.pos;
            if dist < glow_range {
                let g = 1.0 - dist / glow_range;
                let mut color = colors::HAZARD_GLOW;
                color[3] = g * 0.5;
                mesh.glow(h.pos, HAZARD_GLYPH_SIZE as f32 * 0.3, 35.0 * g, color, GLOW_SEGMENTS);
                if style.tremble {
                    let tremble = g * 5.0;
                    center += Vec2::new(self.jitter(tremble), self.jitter(tremble));
                }
            }
            mesh.sprite(rect, center, h.rotation, 1.0, 1.0);
        }
    }
}
