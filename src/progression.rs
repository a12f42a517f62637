//! Milestone progression and the reveal overlay state machine
//!
//! Fed by `SimEvent::Consumed` (drained once per tick), input activations and
//! elapsed wall-clock time. It never looks at the entity pools. All changes go
//! through [`Progression::apply`].

use crate::settings::{Milestones, Settings};

/// Explicit progression state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressionState {
    /// Below the first milestone
    Idle,
    /// First milestone reached, action permitted
    Unlocked,
    /// Overlay animating open, progress 0 -> 1
    RevealOpening { progress: f32 },
    /// Overlay fully open, waiting for any input
    RevealHeld,
    /// Overlay animating closed from `from` to 0
    RevealClosing { progress: f32, from: f32 },
}

impl ProgressionState {
    pub fn is_revealing(&self) -> bool {
        matches!(
            self,
            ProgressionState::RevealOpening { .. }
                | ProgressionState::RevealHeld
                | ProgressionState::RevealClosing { .. }
        )
    }
}

/// Inputs to the transition function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// One consumption event
    Consumed,
    /// Pointer-down, key-down or touch-start
    Dismiss,
    /// Seconds elapsed since the previous `Elapsed`
    Elapsed(f32),
}

/// Whether the gated action may run, and why not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Permitted,
    Locked { remaining: u32 },
    Celebrating,
}

impl ActionStatus {
    pub fn is_permitted(&self) -> bool {
        matches!(self, ActionStatus::Permitted)
    }

    /// Human-readable disabled reason
    pub fn reason(&self) -> Option<String> {
        match self {
            ActionStatus::Permitted => None,
            ActionStatus::Locked { remaining: 1 } => Some("Eat 1 more carrot to unlock".to_string()),
            ActionStatus::Locked { remaining } => {
                Some(format!("Eat {} more carrots to unlock", remaining))
            }
            ActionStatus::Celebrating => Some("Unavailable while the celebration is showing".to_string()),
        }
    }
}

/// Overlay animation timing
#[derive(Debug, Clone, Copy)]
pub struct RevealTiming {
    pub open_secs: f32,
    pub close_secs: f32,
    /// Dismiss input during opening starts closing from the current progress
    pub allow_early_dismiss: bool,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            open_secs: 1.2,
            close_secs: 0.8,
            allow_early_dismiss: false,
        }
    }
}

/// Cumulative consumption counter with a one-shot reveal at the last milestone
#[derive(Debug, Clone)]
pub struct Progression {
    milestones: Milestones,
    timing: RevealTiming,
    count: u32,
    state: ProgressionState,
}

impl Progression {
    pub fn new(milestones: Milestones, timing: RevealTiming) -> Self {
        Self {
            milestones,
            timing,
            count: 0,
            state: ProgressionState::Idle,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.milestones.clone(),
            RevealTiming {
                open_secs: settings.reveal_open_secs,
                close_secs: settings.reveal_close_secs,
                allow_early_dismiss: settings.allow_early_dismiss,
            },
        )
    }

    /// The single transition function
    pub fn apply(&mut self, signal: Signal) {
        use ProgressionState::*;

        match (self.state, signal) {
            (state, Signal::Consumed) => {
                let before = self.count;
                self.count = self.count.saturating_add(1);
                if state.is_revealing() {
                    return;
                }
                let last = self.milestones.last();
                // Edge-triggered: only the step that first reaches the last milestone
                if before < last && self.count >= last {
                    log::info!("final milestone {} reached, revealing overlay", last);
                    self.state = RevealOpening { progress: 0.0 };
                } else {
                    self.state = self.resting_state();
                }
            }

            (RevealHeld, Signal::Dismiss) => {
                self.state = RevealClosing {
                    progress: 1.0,
                    from: 1.0,
                };
            }
            (RevealOpening { progress }, Signal::Dismiss) if self.timing.allow_early_dismiss => {
                self.state = RevealClosing {
                    progress,
                    from: progress,
                };
            }
            (_, Signal::Dismiss) => {}

            (RevealOpening { progress }, Signal::Elapsed(dt)) => {
                let progress = progress + dt.max(0.0) / self.timing.open_secs;
                self.state = if progress >= 1.0 {
                    RevealHeld
                } else {
                    RevealOpening { progress }
                };
            }
            (RevealClosing { progress, from }, Signal::Elapsed(dt)) => {
                // Same duration whatever the starting value
                let progress = progress - from * dt.max(0.0) / self.timing.close_secs;
                if progress <= 0.0 || from <= 0.0 {
                    log::info!("overlay dismissed, counter reset from {}", self.count);
                    self.count = 0;
                    self.state = Idle;
                } else {
                    self.state = RevealClosing { progress, from };
                }
            }
            (_, Signal::Elapsed(_)) => {}
        }
    }

    fn resting_state(&self) -> ProgressionState {
        if self.count >= self.milestones.first() {
            ProgressionState::Unlocked
        } else {
            ProgressionState::Idle
        }
    }

    pub fn state(&self) -> ProgressionState {
        self.state
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn milestones(&self) -> &Milestones {
        &self.milestones
    }

    pub fn current_milestone(&self) -> u32 {
        self.milestones.current(self.count)
    }

    pub fn action_status(&self) -> ActionStatus {
        match self.state {
            ProgressionState::Unlocked => ActionStatus::Permitted,
            ProgressionState::Idle => ActionStatus::Locked {
                remaining: self.milestones.first().saturating_sub(self.count),
            },
            _ => ActionStatus::Celebrating,
        }
    }

    pub fn action_permitted(&self) -> bool {
        self.action_status().is_permitted()
    }

    /// Raw overlay progress, `None` when no overlay is shown
    pub fn overlay_progress(&self) -> Option<f32> {
        match self.state {
            ProgressionState::RevealOpening { progress } => Some(progress),
            ProgressionState::RevealHeld => Some(1.0),
            ProgressionState::RevealClosing { progress, .. } => Some(progress),
            _ => None,
        }
    }

    /// Eased overlay opacity (ease-out cubic opening, ease-in cubic closing)
    pub fn overlay_opacity(&self) -> f32 {
        match self.state {
            ProgressionState::RevealOpening { progress } => {
                let inv = 1.0 - progress.clamp(0.0, 1.0);
                1.0 - inv * inv * inv
            }
            ProgressionState::RevealHeld => 1.0,
            ProgressionState::RevealClosing { progress, .. } => progress.clamp(0.0, 1.0).powi(3),
            _ => 0.0,
        }
    }
}
