//! Carrot Field - a pointer-driven background simulation
//!
//! Core modules:
//! - `sim`: Per-frame simulation (food, hazards, debris, interactions)
//! - `progression`: Milestone counter and reveal overlay state machine
//! - `session`: Simulation context owned by the host view
//! - `scheduler`: Update-then-render frame loop
//! - `sprites`: Glyph sprite cache and texture atlas
//! - `renderer`: Geometry building and the WebGPU pipeline
//! - `platform`: Browser host

pub mod error;
pub mod input;
pub mod platform;
pub mod progression;
pub mod renderer;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sim;
pub mod sprites;

pub use error::{SettingsError, SetupError};
pub use progression::{ActionStatus, Progression, ProgressionState};
pub use session::{Session, SimObserver};
pub use settings::{Milestones, Settings};

use glam::Vec2;

/// Simulation tuning constants (units are pixels and frames)
pub mod consts {
    use glam::Vec2;

    /// Pointer position used when no pointer is over the surface
    pub const POINTER_SENTINEL: Vec2 = Vec2::new(-200.0, -200.0);

    /// Food pool size (fixed, bounds the O(n²) connection pass)
    pub const FOOD_COUNT: usize = 60;
    pub const FOOD_SPEED_RANGE: f32 = 0.5;
    pub const FOOD_SPIN_RANGE: f32 = 0.02;
    pub const EAT_RADIUS: f32 = 60.0;
    pub const EAT_DURATION_FRAMES: f32 = 30.0;
    /// Avatar chew animation length after a bite
    pub const CHEW_FRAMES: u32 = EAT_DURATION_FRAMES as u32 + 10;

    /// Inner margin for bouncing entities
    pub const BOUNDS_MARGIN: f32 = 20.0;
    /// Margin used when placing a recycled food
    pub const RESPAWN_MARGIN: f32 = 30.0;
    pub const RESPAWN_INNER_RADIUS: f32 = 250.0;
    pub const RESPAWN_OUTER_RADIUS: f32 = 550.0;

    pub const HAZARD_SPEED_RANGE: f32 = 0.7;
    pub const HAZARD_SPIN_RANGE: f32 = 0.015;
    pub const HAZARD_RADIUS: f32 = 55.0;
    pub const EXPLODE_DURATION_FRAMES: f32 = 25.0;
    pub const HAZARD_SPAWN_MARGIN: f32 = 40.0;
    pub const HAZARD_SAFE_DISTANCE: f32 = 200.0;
    pub const HAZARD_SPAWN_ATTEMPTS: u32 = 10;
    /// ~1 second at 60 Hz
    pub const HAZARD_COOLDOWN_FRAMES: u32 = 60;
    pub const SHAKE_FRAMES: u32 = 20;

    pub const DEBRIS_MIN_BURST: u32 = 4;
    pub const DEBRIS_MAX_BURST: u32 = 6;
    pub const DEBRIS_GRAVITY: f32 = 0.05;
    pub const DEBRIS_DRAG: f32 = 0.98;
    pub const DEBRIS_LIFE_STEP: f32 = 0.02;
    pub const DEBRIS_SPIN_RANGE: f32 = 0.3;
    /// Hard cap on live debris particles
    pub const MAX_DEBRIS: usize = 512;

    pub const CONNECTION_DISTANCE: f32 = 180.0;
    /// Pointer connections reach further than food-to-food ones
    pub const POINTER_CONNECTION_DISTANCE: f32 = CONNECTION_DISTANCE * 1.5;

    /// Sprite glyphs and pixel sizes
    pub const FOOD_GLYPH: &str = "\u{1F955}";
    pub const AVATAR_GLYPH: &str = "\u{1F430}";
    pub const HAZARD_GLYPH: &str = "\u{1F4A3}";
    pub const FOOD_GLYPH_SIZE: u32 = 44;
    pub const AVATAR_GLYPH_SIZE: u32 = 56;
    pub const HAZARD_GLYPH_SIZE: u32 = 40;
    pub const DEBRIS_GLYPH_SIZES: [u32; 4] = [8, 12, 16, 20];
}

/// Clamp a point into a box shrunk by `margin` on every side.
///
/// The lower bound wins when the box is narrower than twice the margin, so
/// tiny surfaces never panic.
#[inline]
pub fn clamp_to_bounds(pos: Vec2, size: Vec2, margin: f32) -> Vec2 {
    Vec2::new(
        pos.x.min(size.x - margin).max(margin),
        pos.y.min(size.y - margin).max(margin),
    )
}

/// Linear fade used by every connection pass
#[inline]
pub fn fade_with_distance(distance: f32, max_distance: f32) -> f32 {
    (1.0 - distance / max_distance).clamp(0.0, 1.0)
}
