//! Simulation context owned by the host view
//!
//! A `Session` is created on mount and dropped on unmount. It ties the world,
//! the input tracker and the progression machine together and forwards
//! simulation events to an optional observer.

use crate::error::SettingsError;
use crate::input::{InputEvent, InputTracker};
use crate::progression::{ActionStatus, Progression, Signal};
use crate::settings::Settings;
use crate::sim::{SimEvent, TickInput, World, tick};

/// Receives simulation events after each frame
pub trait SimObserver {
    /// `count` is the progression counter after this consumption
    fn on_consumed(&mut self, _count: u32) {}
    fn on_detonated(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

pub struct Session {
    world: World,
    progression: Progression,
    input: InputTracker,
    settings: Settings,
    observer: Box<dyn SimObserver>,
}

impl Session {
    pub fn new(width: f32, height: f32, settings: Settings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        log::info!(
            "session created: {}x{}, seed {}, {} hazards",
            width,
            height,
            seed,
            settings.hazard_count
        );
        Ok(Self {
            world: World::new(width, height, seed),
            progression: Progression::from_settings(&settings),
            input: InputTracker::new(),
            settings,
            observer: Box::new(NoopObserver),
        })
    }

    pub fn set_observer(&mut self, observer: Box<dyn SimObserver>) {
        self.observer = observer;
    }

    /// Track the pointer; activations also dismiss the reveal overlay
    pub fn handle_input(&mut self, event: InputEvent) {
        self.input.apply(&event);
        if event.is_activation() {
            self.progression.apply(Signal::Dismiss);
        }
    }

    /// Advance one display frame
    pub fn update(&mut self, dt: f32) {
        let input = TickInput {
            pointer: self.input.position(),
            hazard_target: self.settings.hazard_count,
        };
        tick(&mut self.world, &input);

        self.progression.apply(Signal::Elapsed(dt));
        for event in self.world.drain_events() {
            match event {
                SimEvent::Consumed => {
                    self.progression.apply(Signal::Consumed);
                    self.observer.on_consumed(self.progression.count());
                }
                SimEvent::Detonated => self.observer.on_detonated(),
            }
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.world.resize(width, height);
    }

    /// Takes effect on the next frame
    pub fn set_hazard_count(&mut self, count: u32) {
        if count != self.settings.hazard_count {
            log::info!("hazard count {} -> {}", self.settings.hazard_count, count);
            self.settings.hazard_count = count;
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn action_status(&self) -> ActionStatus {
        self.progression.action_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::ProgressionState;
    use crate::settings::Milestones;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        consumed: Vec<u32>,
        detonated: u32,
    }

    struct Recorder(Rc<RefCell<Log>>);

    impl SimObserver for Recorder {
        fn on_consumed(&mut self, count: u32) {
            self.0.borrow_mut().consumed.push(count);
        }

        fn on_detonated(&mut self) {
            self.0.borrow_mut().detonated += 1;
        }
    }

    fn session(settings: Settings) -> (Session, Rc<RefCell<Log>>) {
        let mut s = Session::new(1280.0, 720.0, settings, 42).unwrap();
        let log = Rc::new(RefCell::new(Log::default()));
        s.set_observer(Box::new(Recorder(log.clone())));
        (s, log)
    }

    /// Park all food far away except one under `at`
    fn bait(s: &mut Session, at: Vec2) {
        for f in s.world.food.iter_mut() {
            f.pos = Vec2::new(1200.0, 650.0);
            f.vel = Vec2::ZERO;
        }
        s.world.food.get_mut(0).pos = at;
    }

    #[test]
    fn test_consumption_reaches_observer_and_progression() {
        let (mut s, log) = session(Settings::default());
        let at = Vec2::new(300.0, 300.0);
        bait(&mut s, at);
        s.handle_input(InputEvent::PointerMove { x: at.x, y: at.y });
        s.update(1.0 / 60.0);

        assert_eq!(log.borrow().consumed, vec![1]);
        assert_eq!(s.progression().count(), 1);
        assert_eq!(s.action_status(), ActionStatus::Locked { remaining: 127 });
    }

    #[test]
    fn test_no_pointer_no_consumption() {
        let (mut s, log) = session(Settings::default());
        for _ in 0..120 {
            s.update(1.0 / 60.0);
        }
        assert!(log.borrow().consumed.is_empty());
        assert_eq!(log.borrow().detonated, 0);
        assert!(s.world().hazards.is_empty());
    }

    #[test]
    fn test_hazard_count_applies_next_frame() {
        let (mut s, _) = session(Settings::default());
        s.set_hazard_count(4);
        assert!(s.world().hazards.is_empty());
        s.update(1.0 / 60.0);
        assert_eq!(s.world().hazards.armed_count(), 4);
        s.set_hazard_count(1);
        s.update(1.0 / 60.0);
        assert_eq!(s.world().hazards.armed_count(), 1);
    }

    #[test]
    fn test_activation_dismisses_reveal() {
        let settings = Settings {
            milestones: Milestones::new(vec![1]).unwrap(),
            ..Default::default()
        };
        let (mut s, _) = session(settings);
        let at = Vec2::new(300.0, 300.0);
        bait(&mut s, at);
        s.handle_input(InputEvent::PointerMove { x: at.x, y: at.y });
        s.update(1.0 / 60.0);
        assert!(s.progression().state().is_revealing());

        // Open fully, then dismiss and run the close animation out
        s.handle_input(InputEvent::PointerLeave);
        for _ in 0..90 {
            s.update(1.0 / 60.0);
        }
        assert_eq!(s.progression().state(), ProgressionState::RevealHeld);
        s.handle_input(InputEvent::KeyDown);
        for _ in 0..60 {
            s.update(1.0 / 60.0);
        }
        assert_eq!(s.progression().state(), ProgressionState::Idle);
        assert_eq!(s.progression().count(), 0);
    }

    #[test]
    fn test_touch_drag_then_lift_parks_avatar() {
        let (mut s, log) = session(Settings::default());
        let start = Vec2::new(100.0, 100.0);
        let end = Vec2::new(600.0, 400.0);
        bait(&mut s, end);

        s.handle_input(InputEvent::TouchStart { x: start.x, y: start.y });
        s.update(1.0 / 60.0);
        assert!(log.borrow().consumed.is_empty());

        // Finger drags onto the food
        s.handle_input(InputEvent::PointerMove { x: end.x, y: end.y });
        s.update(1.0 / 60.0);
        assert_eq!(log.borrow().consumed.len(), 1);

        // Lifting removes the avatar; food drifting back under the old spot is safe
        s.handle_input(InputEvent::PointerLeave);
        assert!(!s.input().is_on_surface());
        for _ in 0..60 {
            s.update(1.0 / 60.0);
        }
        for f in s.world.food.iter_mut() {
            if !f.is_eaten() {
                f.pos = end;
            }
        }
        s.update(1.0 / 60.0);
        assert_eq!(log.borrow().consumed.len(), 1);
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let settings = Settings {
            reveal_close_secs: -1.0,
            ..Default::default()
        };
        assert!(Session::new(800.0, 600.0, settings, 1).is_err());
    }
}
