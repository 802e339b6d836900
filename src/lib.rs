//! Scroll-synchronised scene orchestration.
//!
//! The core (scroll smoothing, region triggers, reveals, frame-rate
//! monitoring and the frame scheduler) is platform independent and runs under
//! plain `cargo test`. The `wasm` module binds it to the browser.

pub mod config;
pub mod easing;
pub mod error;
pub mod events;
pub mod experience;
pub mod geometry;
pub mod host;
pub mod perf;
pub mod regions;
pub mod reveal;
pub mod runtime;
pub mod scene;
pub mod scheduler;
pub mod scroll;
pub mod sections;

pub use config::ExperienceConfig;
pub use error::{Error, Result};
pub use experience::Experience;
pub use runtime::Runtime;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub use wasm::App;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, EventTarget, HtmlCanvasElement, Window};

    use crate::config::ExperienceConfig;
    use crate::events::HostEvent;
    use crate::experience::Experience;
    use crate::host::{Clock, ElementRef, Layout, TimeSource};
    use crate::regions::RegionKind;
    use crate::runtime::Runtime;
    use crate::sections::{self, SectionOptions};

    mod dom;
    mod frame_loop;
    mod render;

    use dom::{DomChrome, DomLayout, PerformanceTime, Registry};
    use frame_loop::FrameLoop;
    use render::WebGlHost;

    impl From<crate::Error> for JsValue {
        fn from(err: crate::Error) -> Self {
            js_sys::Error::new(&err.to_string()).into()
        }
    }

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();
    }

    struct Listener {
        target: EventTarget,
        kind: &'static str,
        callback: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl Listener {
        fn attach(
            target: EventTarget,
            kind: &'static str,
            callback: impl FnMut(web_sys::Event) + 'static,
        ) -> Result<Self, JsValue> {
            let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut(web_sys::Event)>);
            target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
            Ok(Self { target, kind, callback })
        }

        fn detach(&self) {
            let removed = self
                .target
                .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
            if let Err(err) = removed {
                log::debug!("removing `{}` listener failed: {err:?}", self.kind);
            }
        }
    }

    /// Browser entry point. Construct with an optional JSON configuration.
    #[wasm_bindgen]
    pub struct App {
        runtime: Rc<RefCell<Runtime>>,
        frame_loop: Rc<FrameLoop>,
        time: Rc<PerformanceTime>,
        listeners: Vec<Listener>,
    }

    #[wasm_bindgen]
    impl App {
        #[wasm_bindgen(constructor)]
        pub fn new(config: Option<String>) -> Result<App, JsValue> {
            let config = match config {
                Some(json) => ExperienceConfig::from_json(&json)?,
                None => ExperienceConfig::default(),
            };
            if console_log::init_with_level(config.level()?).is_err() {
                log::debug!("logger already installed");
            }

            let window = web_sys::window().ok_or("no window")?;
            let document = window.document().ok_or("no document")?;
            let registry = Rc::new(Registry::new(document.clone()));
            let time = Rc::new(PerformanceTime::new(&window)?);

            let layout = DomLayout::new(window.clone(), registry.clone());
            let viewport = layout.viewport();
            let chrome = DomChrome::new(window.clone(), document.clone(), registry.clone(), &config.nav_selector);
            let mut experience = Experience::new(config.clone(), Box::new(layout), Box::new(chrome))?;

            mount_sections(&mut experience, &config, &document, time.clone(), viewport);
            for element in dom::select_all(&document, &config.highlight_selector) {
                let id = element.id();
                if !id.is_empty() {
                    experience.add_region(ElementRef::new(id), RegionKind::Secondary);
                }
            }
            for (i, element) in dom::select_all(&document, &config.reveal_selector).into_iter().enumerate() {
                let key = format!("reveal-{i}");
                registry.register(&key, element);
                experience.bind_reveal(ElementRef::new(key));
            }
            experience.prime();
            log::info!(
                "experience ready: {} region(s), {} reveal(s), sections {:?}",
                experience.regions().len(),
                experience.reveals().bindings().len(),
                experience.section_kinds(),
            );

            let runtime = Rc::new(RefCell::new(Runtime::new(experience)));
            let frame_loop = Rc::new(FrameLoop::new(runtime.clone()));
            let listeners = subscribe(&window, &document, &runtime, &frame_loop, time.clone(), &config.nav_selector)?;

            let app = App {
                runtime,
                frame_loop,
                time,
                listeners,
            };
            app.start()?;
            Ok(app)
        }

        /// Arms the frame loop; a no-op while already running.
        pub fn start(&self) -> Result<(), JsValue> {
            self.runtime.borrow_mut().start(self.time.now_ms());
            self.frame_loop.sync()
        }

        pub fn stop(&self) -> Result<(), JsValue> {
            self.runtime.borrow_mut().stop();
            self.frame_loop.sync()
        }

        /// Frames ticked since construction.
        #[wasm_bindgen(js_name = frameCount)]
        pub fn frame_count(&self) -> f64 {
            self.runtime.borrow().scheduler.frames() as f64
        }

        #[wasm_bindgen(js_name = goToSection)]
        pub fn go_to_section(&self, id: &str) -> bool {
            self.runtime.borrow_mut().experience.go_to_section(id)
        }

        #[wasm_bindgen(js_name = currentSection)]
        pub fn current_section(&self) -> Option<String> {
            self.runtime.borrow().experience.current_section().map(str::to_owned)
        }

        #[wasm_bindgen(js_name = performanceStats)]
        pub fn performance_stats(&self) -> Result<JsValue, JsValue> {
            let stats = self.runtime.borrow().experience.performance_stats();
            let json = serde_json::to_string(&stats).map_err(|e| JsValue::from_str(&e.to_string()))?;
            js_sys::JSON::parse(&json)
        }

        pub fn dispose(&mut self) {
            self.runtime.borrow_mut().stop();
            self.frame_loop.dispose();
            for listener in self.listeners.drain(..) {
                listener.detach();
            }
            self.runtime.borrow_mut().experience.dispose();
        }
    }

    /// Creates a section for every configured region whose canvas exists.
    fn mount_sections(
        experience: &mut Experience,
        config: &ExperienceConfig,
        document: &Document,
        time: Rc<PerformanceTime>,
        viewport: crate::host::Viewport,
    ) {
        let time: Rc<dyn TimeSource> = time;
        for (i, region) in config.regions.iter().enumerate() {
            let id = experience.add_region(ElementRef::new(region.id.as_str()), region.kind);
            let (Some(kind), Some(canvas_id)) = (region.section, region.canvas.as_deref()) else {
                continue;
            };
            let Some(canvas) = document
                .get_element_by_id(canvas_id)
                .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            else {
                log::warn!("canvas `{canvas_id}` missing; {kind:?} section skipped");
                continue;
            };
            match WebGlHost::new(canvas) {
                Ok(host) => {
                    let options = SectionOptions {
                        seed: config.seed.wrapping_add(i as u64),
                        max_pixel_ratio: config.max_pixel_ratio,
                    };
                    let runtime = sections::build(kind, Box::new(host), Clock::new(time.clone()), viewport, options);
                    experience.attach_section(id, runtime);
                }
                Err(err) => log::warn!("{kind:?} section skipped: {err}"),
            }
        }
    }

    fn subscribe(
        window: &Window,
        document: &Document,
        runtime: &Rc<RefCell<Runtime>>,
        frame_loop: &Rc<FrameLoop>,
        time: Rc<PerformanceTime>,
        nav_selector: &str,
    ) -> Result<Vec<Listener>, JsValue> {
        let mut listeners = Vec::new();

        let (rt, win) = (runtime.clone(), window.clone());
        listeners.push(Listener::attach(window.clone().into(), "scroll", move |_| {
            let offset = win.scroll_y().unwrap_or(0.0);
            match rt.try_borrow_mut() {
                Ok(mut rt) => {
                    rt.dispatch(HostEvent::Scroll { offset });
                }
                Err(_) => log::debug!("scroll at {offset} dropped while busy"),
            }
        })?);

        let rt = runtime.clone();
        listeners.push(Listener::attach(window.clone().into(), "resize", move |_| {
            if let Ok(mut rt) = rt.try_borrow_mut() {
                rt.dispatch(HostEvent::Resize);
            }
        })?);

        let (rt, fl, doc) = (runtime.clone(), frame_loop.clone(), document.clone());
        listeners.push(Listener::attach(document.clone().into(), "visibilitychange", move |_| {
            let event = HostEvent::Visibility {
                hidden: doc.hidden(),
                now_ms: time.now_ms(),
            };
            if let Ok(mut rt) = rt.try_borrow_mut() {
                rt.dispatch(event);
            }
            if let Err(err) = fl.sync() {
                log::error!("frame loop sync failed: {err:?}");
            }
        })?);

        for link in dom::select_all(document, nav_selector) {
            let Some(target) = link
                .get_attribute("href")
                .and_then(|href| href.strip_prefix('#').map(str::to_owned))
            else {
                continue;
            };
            let rt = runtime.clone();
            listeners.push(Listener::attach(link.into(), "click", move |event| {
                event.prevent_default();
                if let Ok(mut rt) = rt.try_borrow_mut() {
                    rt.experience.go_to_section(&target);
                }
            })?);
        }

        Ok(listeners)
    }
}
