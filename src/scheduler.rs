//! Update-then-render frame loop
//!
//! Platform independent: the host owns the actual callback (requestAnimationFrame
//! in the browser, a plain loop natively) and calls [`FrameScheduler::advance`]
//! once per display frame.

/// Anything the scheduler can drive
pub trait FrameTarget {
    /// False while the drawing surface or sprites are not usable yet
    fn ready(&self) -> bool;
    /// Advance state by one frame; `dt` is wall-clock seconds since the last frame
    fn update(&mut self, dt: f32);
    fn render(&mut self);
}

/// Result of one scheduler step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Scheduler stopped, nothing ran
    Idle,
    /// Target not ready, frame skipped
    Skipped,
    Rendered,
}

/// Upper bound on `dt` so a backgrounded tab doesn't jump timers
pub const MAX_FRAME_DT: f32 = 0.1;

/// Assumed frame time before a previous timestamp exists
pub const NOMINAL_FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Default)]
pub struct FrameScheduler {
    running: bool,
    last_time_ms: Option<f64>,
    frames: u64,
    skipped: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin scheduling. A no-op if already running.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.last_time_ms = None;
            log::debug!("frame scheduler started");
        }
    }

    /// Stop scheduling. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::debug!(
                "frame scheduler stopped after {} frames ({} skipped)",
                self.frames,
                self.skipped
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Run one frame at timestamp `now_ms` (milliseconds, monotonic)
    pub fn advance(&mut self, target: &mut impl FrameTarget, now_ms: f64) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        let dt = match self.last_time_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
            None => NOMINAL_FRAME_DT,
        };
        self.last_time_ms = Some(now_ms);

        if !target.ready() {
            self.skipped += 1;
            return TickOutcome::Skipped;
        }

        target.update(dt);
        target.render();
        self.frames += 1;
        TickOutcome::Rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        ready: bool,
        calls: Vec<&'static str>,
        dts: Vec<f32>,
    }

    impl FrameTarget for Recorder {
        fn ready(&self) -> bool {
            self.ready
        }

        fn update(&mut self, dt: f32) {
            self.calls.push("update");
            self.dts.push(dt);
        }

        fn render(&mut self) {
            self.calls.push("render");
        }
    }

    #[test]
    fn test_update_runs_before_render() {
        let mut target = Recorder {
            ready: true,
            ..Default::default()
        };
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        assert_eq!(scheduler.advance(&mut target, 0.0), TickOutcome::Rendered);
        assert_eq!(scheduler.advance(&mut target, 16.0), TickOutcome::Rendered);
        assert_eq!(target.calls, vec!["update", "render", "update", "render"]);
        assert_eq!(scheduler.frames(), 2);
    }

    #[test]
    fn test_not_ready_skips_frame() {
        let mut target = Recorder::default();
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        assert_eq!(scheduler.advance(&mut target, 0.0), TickOutcome::Skipped);
        assert!(target.calls.is_empty());

        target.ready = true;
        assert_eq!(scheduler.advance(&mut target, 16.0), TickOutcome::Rendered);
        assert_eq!(scheduler.skipped(), 1);
    }

    #[test]
    fn test_stopped_scheduler_is_idle() {
        let mut target = Recorder {
            ready: true,
            ..Default::default()
        };
        let mut scheduler = FrameScheduler::new();
        assert_eq!(scheduler.advance(&mut target, 0.0), TickOutcome::Idle);

        scheduler.start();
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.advance(&mut target, 16.0), TickOutcome::Idle);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut target = Recorder {
            ready: true,
            ..Default::default()
        };
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        scheduler.advance(&mut target, 1000.0);
        scheduler.advance(&mut target, 1016.0);
        scheduler.advance(&mut target, 9000.0);
        assert_eq!(target.dts[0], NOMINAL_FRAME_DT);
        assert!((target.dts[1] - 0.016).abs() < 1e-6);
        assert_eq!(target.dts[2], MAX_FRAME_DT);
    }

    #[test]
    fn test_restart_resets_clock() {
        let mut target = Recorder {
            ready: true,
            ..Default::default()
        };
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        scheduler.advance(&mut target, 0.0);
        scheduler.stop();
        scheduler.start();
        scheduler.advance(&mut target, 50_000.0);
        assert_eq!(target.dts[1], NOMINAL_FRAME_DT);
    }
}
