//! Pointer tracking and raw input notifications

use glam::Vec2;

use crate::consts::POINTER_SENTINEL;

/// Raw input notifications forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to surface coordinates (x, y)
    PointerMove { x: f32, y: f32 },
    /// Pointer left the tracked region
    PointerLeave,
    /// Mouse button pressed
    PointerDown,
    /// Key pressed
    KeyDown,
    /// Touch began at surface coordinates (x, y)
    TouchStart { x: f32, y: f32 },
}

impl InputEvent {
    /// Whether this counts as "any input" for dismissing the reveal overlay
    pub fn is_activation(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerDown | InputEvent::KeyDown | InputEvent::TouchStart { .. }
        )
    }
}

/// Latest known pointer position; only the newest sample matters
#[derive(Debug, Clone, Copy)]
pub struct InputTracker {
    pointer: Vec2,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self {
            pointer: POINTER_SENTINEL,
        }
    }
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    pub fn leave(&mut self) {
        self.pointer = POINTER_SENTINEL;
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMove { x, y } | InputEvent::TouchStart { x, y } => {
                self.move_to(x, y)
            }
            InputEvent::PointerLeave => self.leave(),
            InputEvent::PointerDown | InputEvent::KeyDown => {}
        }
    }

    pub fn position(&self) -> Vec2 {
        self.pointer
    }

    /// The avatar is only drawn once the pointer is on the surface
    pub fn is_on_surface(&self) -> bool {
        self.pointer.x > 0.0 && self.pointer.y > 0.0
    }
}
