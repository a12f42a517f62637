//! Per-frame simulation module
//!
//! All entity logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Frame-counted timers only
//! - Seeded RNG only
//! - Stable iteration order (pool order)

pub mod debris;
pub mod food;
pub mod hazard;
pub mod interaction;
pub mod state;
pub mod tick;

pub use debris::{Debris, DebrisPool};
pub use food::{Food, FoodPool, FoodState};
pub use hazard::{Hazard, HazardPool, HazardState};
pub use interaction::{resolve_food, resolve_hazards};
pub use state::{SimEvent, World};
pub use tick::{TickInput, tick};
