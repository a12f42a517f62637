//! Browser host: mounts the background on a canvas and drives it with
//! requestAnimationFrame

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, TouchEvent, Window};

use super::glyphs::CanvasRasterizer;
use crate::error::SetupError;
use crate::input::InputEvent;
use crate::renderer::{RenderState, SceneBuilder, SceneStyle};
use crate::scheduler::{FrameScheduler, FrameTarget};
use crate::session::{Session, SimObserver};
use crate::settings::Settings;
use crate::sprites::SpriteCache;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn window() -> Result<Window, SetupError> {
    web_sys::window().ok_or_else(|| SetupError::BackendUnavailable("no window".into()))
}

/// Install the console logger (safe to call more than once)
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Options object accepted by `Background.mount`
#[derive(Debug, Default)]
struct MountOptions {
    settings: Option<Settings>,
    /// Element whose opacity follows the reveal overlay
    overlay_id: Option<String>,
}

/// Events raised during a frame, dispatched after the host borrow is released
#[derive(Debug, Default)]
struct Pending {
    consumed: u32,
    detonated: u32,
}

struct QueueObserver(Rc<RefCell<Pending>>);

impl SimObserver for QueueObserver {
    fn on_consumed(&mut self, _count: u32) {
        self.0.borrow_mut().consumed += 1;
    }

    fn on_detonated(&mut self) {
        self.0.borrow_mut().detonated += 1;
    }
}

#[derive(Default)]
struct Callbacks {
    consumed: Option<js_sys::Function>,
    detonated: Option<js_sys::Function>,
}

fn invoke(callback: &Option<js_sys::Function>, times: u32) {
    if let Some(f) = callback {
        for _ in 0..times {
            if let Err(e) = f.call0(&JsValue::NULL) {
                log::warn!("observer callback threw: {:?}", e);
            }
        }
    }
}

/// Scene sizes derived from the canvas element
#[derive(Debug, Clone, Copy)]
struct SurfaceSize {
    css_width: f32,
    css_height: f32,
    dpr: f32,
}

impl SurfaceSize {
    fn measure(window: &Window, canvas: &HtmlCanvasElement) -> Self {
        Self {
            css_width: canvas.client_width().max(1) as f32,
            css_height: canvas.client_height().max(1) as f32,
            dpr: window.device_pixel_ratio() as f32,
        }
    }

    fn physical(&self) -> (u32, u32) {
        (
            (self.css_width * self.dpr).round() as u32,
            (self.css_height * self.dpr).round() as u32,
        )
    }
}

/// Everything one frame touches
struct View {
    session: Session,
    renderer: Option<RenderState>,
    sprites: SpriteCache,
    scene: SceneBuilder,
    style: SceneStyle,
    canvas: HtmlCanvasElement,
    overlay: Option<HtmlElement>,
    last_opacity: Option<f32>,
}

impl View {
    fn resize(&mut self, size: SurfaceSize) {
        let (w, h) = size.physical();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.session.resize(size.css_width, size.css_height);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(w, h, size.dpr);
        }
    }

    /// Mirror the reveal overlay onto the host element
    fn update_overlay(&mut self) {
        let Some(el) = self.overlay.as_ref() else {
            return;
        };
        let opacity = self
            .session
            .progression()
            .overlay_progress()
            .map(|_| self.session.progression().overlay_opacity());
        if opacity == self.last_opacity {
            return;
        }
        self.last_opacity = opacity;

        let style = el.style();
        let applied = match opacity {
            Some(o) => style
                .set_property("visibility", "visible")
                .and_then(|_| style.set_property("opacity", &format!("{:.3}", o))),
            None => style
                .set_property("visibility", "hidden")
                .and_then(|_| style.set_property("opacity", "0")),
        };
        if let Err(e) = applied {
            log::warn!("Overlay style error: {:?}", e);
        }
    }
}

impl FrameTarget for View {
    fn ready(&self) -> bool {
        self.renderer.is_some()
    }

    fn update(&mut self, dt: f32) {
        self.session.update(dt);
        self.update_overlay();
    }

    fn render(&mut self) {
        let mesh = self
            .scene
            .build(self.session.world(), self.session.input(), &self.sprites, self.style);
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        match renderer.render(&mesh.vertices) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, rendering disabled");
                self.renderer = None;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

struct Host {
    scheduler: FrameScheduler,
    view: View,
}

/// Removes its event listener when dropped
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(target: &EventTarget, kind: &'static str, handler: impl FnMut(Event) + 'static) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Handle returned to JavaScript
#[wasm_bindgen]
pub struct Background {
    host: Rc<RefCell<Host>>,
    pending: Rc<RefCell<Pending>>,
    callbacks: Rc<RefCell<Callbacks>>,
    frame: FrameClosure,
    raf_id: Rc<Cell<Option<i32>>>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl Background {
    /// Mount on the canvas with id `canvas_id`. `options` is a settings object
    /// (or undefined to use stored settings).
    pub async fn mount(canvas_id: String, options: JsValue) -> Result<Background, JsValue> {
        init_logging();
        Self::try_mount(&canvas_id, options).await.map_err(|e| {
            log::error!("mount failed: {}", e);
            js_error(e)
        })
    }

    pub fn set_hazard_count(&self, count: u32) {
        self.host.borrow_mut().view.session.set_hazard_count(count);
    }

    pub fn on_consumed(&self, callback: Option<js_sys::Function>) {
        self.callbacks.borrow_mut().consumed = callback;
    }

    pub fn on_detonated(&self, callback: Option<js_sys::Function>) {
        self.callbacks.borrow_mut().detonated = callback;
    }

    pub fn action_permitted(&self) -> bool {
        self.host.borrow().view.session.action_status().is_permitted()
    }

    /// Disabled reason, or undefined when the action is permitted
    pub fn action_status(&self) -> Option<String> {
        self.host.borrow().view.session.action_status().reason()
    }

    pub fn consumed_count(&self) -> u32 {
        self.host.borrow().view.session.progression().count()
    }

    pub fn current_milestone(&self) -> u32 {
        self.host.borrow().view.session.progression().current_milestone()
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.host.borrow().view.session.progression().overlay_opacity()
    }

    /// Persist the active settings to LocalStorage
    pub fn save_settings(&self) {
        self.host.borrow().view.session.settings().save();
    }

    /// Stop the frame loop and remove all listeners. Safe to call twice.
    pub fn unmount(&mut self) {
        if let Ok(mut host) = self.host.try_borrow_mut() {
            host.scheduler.stop();
        }
        if let (Some(id), Some(window)) = (self.raf_id.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        if let Some(closure) = self.frame.borrow_mut().take() {
            // May be running right now (unmount from an observer callback)
            wasm_bindgen_futures::spawn_local(async move { drop(closure) });
        }
        if !self.listeners.is_empty() {
            self.listeners.clear();
            log::info!("background unmounted");
        }
    }
}

impl Background {
    async fn try_mount(canvas_id: &str, options: JsValue) -> Result<Background, SetupError> {
        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| SetupError::BackendUnavailable("no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| SetupError::BackendUnavailable(format!("no element #{}", canvas_id)))?
            .dyn_into()
            .map_err(|_| SetupError::BackendUnavailable(format!("#{} is not a canvas", canvas_id)))?;

        let options = parse_options(options)?;
        // Mount options win over stored settings
        let settings = options.settings.unwrap_or_else(Settings::load);
        let overlay = options
            .overlay_id
            .as_deref()
            .and_then(|id| document.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        let size = SurfaceSize::measure(&window, &canvas);
        let (width, height) = size.physical();
        canvas.set_width(width);
        canvas.set_height(height);

        let sprites = SpriteCache::build(&mut CanvasRasterizer::new(&document)?)?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = RenderState::new(surface, &adapter, width, height, size.dpr, sprites.atlas()).await?;

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let style = SceneStyle::from_settings(&settings);
        let pending = Rc::new(RefCell::new(Pending::default()));
        let mut session = Session::new(size.css_width, size.css_height, settings, seed)?;
        session.set_observer(Box::new(QueueObserver(pending.clone())));

        let host = Rc::new(RefCell::new(Host {
            scheduler: FrameScheduler::new(),
            view: View {
                session,
                renderer: Some(renderer),
                sprites,
                scene: SceneBuilder::new(seed.rotate_left(17) ^ 0x9e37_79b9),
                style,
                canvas,
                overlay,
                last_opacity: None,
            },
        }));

        let listeners = install_listeners(&window, &document, &host)
            .map_err(|e| SetupError::BackendUnavailable(format!("add listener: {:?}", e)))?;

        let background = Background {
            host,
            pending,
            callbacks: Rc::new(RefCell::new(Callbacks::default())),
            frame: Rc::new(RefCell::new(None)),
            raf_id: Rc::new(Cell::new(None)),
            listeners,
        };
        background.start_loop(&window);
        log::info!("background mounted on #{} ({}x{}, seed {})", canvas_id, width, height, seed);
        Ok(background)
    }

    fn start_loop(&self, window: &Window) {
        self.host.borrow_mut().scheduler.start();

        let host = self.host.clone();
        let pending = self.pending.clone();
        let callbacks = self.callbacks.clone();
        let frame = self.frame.clone();
        let raf_id = self.raf_id.clone();
        let window_loop = window.clone();

        *self.frame.borrow_mut() = Some(Closure::new(move |time: f64| {
            raf_id.set(None);
            let running = {
                let mut host = host.borrow_mut();
                let Host { scheduler, view } = &mut *host;
                scheduler.advance(view, time);
                scheduler.is_running()
            };

            // Host borrow released: callbacks may call back into the handle
            let Pending { consumed, detonated } = std::mem::take(&mut *pending.borrow_mut());
            {
                let callbacks = callbacks.borrow();
                invoke(&callbacks.consumed, consumed);
                invoke(&callbacks.detonated, detonated);
            }

            if running && host.try_borrow().is_ok_and(|h| h.scheduler.is_running()) {
                request_frame(&window_loop, &frame, &raf_id);
            }
        }));

        request_frame(window, &self.frame, &self.raf_id);
    }
}

impl Drop for Background {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn request_frame(window: &Window, frame: &FrameClosure, raf_id: &Rc<Cell<Option<i32>>>) {
    if let Some(closure) = frame.borrow().as_ref() {
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => raf_id.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }
}

fn parse_options(options: JsValue) -> Result<MountOptions, SetupError> {
    if options.is_undefined() || options.is_null() {
        return Ok(MountOptions::default());
    }
    let json = js_sys::JSON::stringify(&options)
        .ok()
        .and_then(|s| s.as_string())
        .ok_or_else(|| SetupError::BackendUnavailable("options are not serializable".into()))?;
    let value: serde_json::Value = serde_json::from_str(&json).map_err(crate::SettingsError::from)?;
    // Only treat the object as settings when it carries settings fields
    let has_settings = value
        .as_object()
        .is_some_and(|o| o.keys().any(|k| k != "overlay_id"));
    let overlay_id = value.get("overlay_id").and_then(|v| v.as_str()).map(str::to_owned);
    let settings = if has_settings {
        Some(Settings::from_json(&json)?)
    } else {
        None
    };
    Ok(MountOptions { settings, overlay_id })
}

/// Surface coordinates of a viewport point
fn to_surface(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        client_x as f32 - rect.left() as f32,
        client_y as f32 - rect.top() as f32,
    )
}

/// Surface coordinates of the first active touch, if any
fn first_touch(host: &Rc<RefCell<Host>>, event: &Event) -> Option<(f32, f32)> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    let h = host.try_borrow().ok()?;
    Some(to_surface(&h.view.canvas, touch.client_x(), touch.client_y()))
}

fn install_listeners(
    window: &Window,
    document: &web_sys::Document,
    host: &Rc<RefCell<Host>>,
) -> Result<Vec<Listener>, JsValue> {
    let forward = |host: &Rc<RefCell<Host>>, event: InputEvent| {
        if let Ok(mut h) = host.try_borrow_mut() {
            h.view.session.handle_input(event);
        }
    };

    let mut listeners = Vec::new();

    {
        let host = host.clone();
        listeners.push(Listener::new(window, "mousemove", move |e: Event| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                let (x, y) = {
                    let h = host.borrow();
                    to_surface(&h.view.canvas, e.client_x(), e.client_y())
                };
                forward(&host, InputEvent::PointerMove { x, y });
            }
        })?);
    }
    {
        let host = host.clone();
        listeners.push(Listener::new(document, "mouseleave", move |_| {
            forward(&host, InputEvent::PointerLeave);
        })?);
    }
    {
        let host = host.clone();
        listeners.push(Listener::new(window, "mousedown", move |_| {
            forward(&host, InputEvent::PointerDown);
        })?);
    }
    {
        let host = host.clone();
        listeners.push(Listener::new(window, "keydown", move |_| {
            forward(&host, InputEvent::KeyDown);
        })?);
    }
    {
        let host = host.clone();
        listeners.push(Listener::new(window, "touchstart", move |e: Event| {
            if let Some((x, y)) = first_touch(&host, &e) {
                forward(&host, InputEvent::TouchStart { x, y });
            }
        })?);
    }
    {
        let host = host.clone();
        listeners.push(Listener::new(window, "touchmove", move |e: Event| {
            if let Some((x, y)) = first_touch(&host, &e) {
                forward(&host, InputEvent::PointerMove { x, y });
            }
        })?);
    }
    for kind in ["touchend", "touchcancel"] {
        let host = host.clone();
        listeners.push(Listener::new(window, kind, move |e: Event| {
            // Follow a remaining finger, otherwise the pointer is gone
            match first_touch(&host, &e) {
                Some((x, y)) => forward(&host, InputEvent::PointerMove { x, y }),
                None => forward(&host, InputEvent::PointerLeave),
            }
        })?);
    }
    {
        let host = host.clone();
        let window_resize = window.clone();
        listeners.push(Listener::new(window, "resize", move |_| {
            if let Ok(mut h) = host.try_borrow_mut() {
                let size = SurfaceSize::measure(&window_resize, &h.view.canvas);
                h.view.resize(size);
                log::debug!("resized to {}x{}", size.css_width, size.css_height);
            }
        })?);
    }

    Ok(listeners)
}
