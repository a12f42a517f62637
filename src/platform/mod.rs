//! Platform layer
//!
//! The browser host lives here. Everything it drives (simulation,
//! progression, geometry) is platform-independent and tested natively.

#[cfg(target_arch = "wasm32")]
pub mod glyphs;
#[cfg(target_arch = "wasm32")]
pub mod web;
