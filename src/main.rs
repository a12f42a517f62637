//! Carrot Field entry point
//!
//! On the web this mounts the background on `#canvas`. Natively it runs the
//! simulation headless along a scripted pointer path and logs what happened.

#[cfg(target_arch = "wasm32")]
mod wasm_host {
    use std::cell::RefCell;

    use carrot_field::platform::web::Background;
    use wasm_bindgen::prelude::*;

    thread_local! {
        // Keeps the frame loop alive for the lifetime of the page
        static MOUNTED: RefCell<Option<Background>> = const { RefCell::new(None) };
    }

    pub async fn run() {
        match Background::mount("canvas".into(), JsValue::UNDEFINED).await {
            Ok(background) => MOUNTED.with(|m| *m.borrow_mut() = Some(background)),
            Err(e) => log::error!("Failed to start: {:?}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_host::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use carrot_field::input::InputEvent;
    use carrot_field::scheduler::{FrameScheduler, FrameTarget, NOMINAL_FRAME_DT};
    use carrot_field::{Session, Settings, SimObserver};

    const WIDTH: f32 = 1280.0;
    const HEIGHT: f32 = 720.0;
    const FRAMES: u32 = 60 * 30;

    #[derive(Default)]
    struct Tally {
        consumed: u32,
        detonated: u32,
    }

    struct Logger(std::rc::Rc<std::cell::RefCell<Tally>>);

    impl SimObserver for Logger {
        fn on_consumed(&mut self, count: u32) {
            self.0.borrow_mut().consumed += 1;
            log::debug!("consumed, counter now {}", count);
        }

        fn on_detonated(&mut self) {
            self.0.borrow_mut().detonated += 1;
            log::debug!("detonated");
        }
    }

    /// Drives the session with a pointer sweeping a Lissajous curve
    struct Script {
        session: Session,
        t: f32,
    }

    impl FrameTarget for Script {
        fn ready(&self) -> bool {
            true
        }

        fn update(&mut self, dt: f32) {
            self.t += dt;
            let x = WIDTH * 0.5 + (self.t * 0.7).sin() * WIDTH * 0.4;
            let y = HEIGHT * 0.5 + (self.t * 1.1).cos() * HEIGHT * 0.4;
            self.session.handle_input(InputEvent::PointerMove { x, y });
            self.session.update(dt);
        }

        fn render(&mut self) {}
    }

    pub fn run() {
        let settings = Settings {
            hazard_count: 3,
            seed: Some(42),
            ..Settings::default()
        };
        let seed = settings.seed.unwrap_or_default();
        let mut session = match Session::new(WIDTH, HEIGHT, settings, seed) {
            Ok(session) => session,
            Err(e) => {
                log::error!("invalid settings: {}", e);
                return;
            }
        };
        let tally = std::rc::Rc::new(std::cell::RefCell::new(Tally::default()));
        session.set_observer(Box::new(Logger(tally.clone())));

        let mut script = Script { session, t: 0.0 };
        let mut scheduler = FrameScheduler::new();
        scheduler.start();
        let step_ms = f64::from(NOMINAL_FRAME_DT) * 1000.0;
        for i in 0..=FRAMES {
            scheduler.advance(&mut script, f64::from(i) * step_ms);
        }
        scheduler.stop();

        let tally = tally.borrow();
        let progression = script.session.progression();
        log::info!(
            "{} frames: {} consumed, {} detonated, counter {} / {}, state {:?}",
            scheduler.frames(),
            tally.consumed,
            tally.detonated,
            progression.count(),
            progression.current_milestone(),
            progression.state()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Carrot Field (native, headless) starting...");
    log::info!("Rendering needs a browser - run with `trunk serve` for the web version");
    headless::run();
}
