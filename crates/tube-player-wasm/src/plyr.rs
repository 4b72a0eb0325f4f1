//! Plyr playback engine
//!
//! Binds the global `Plyr` class loaded by the host page and drives it
//! through [`PlaybackEngine`]. Event callbacks are wasm-bindgen closures held
//! in a registry keyed by [`ListenerId`]. A closure that detaches itself is
//! still running when it asks to be removed, so it is retired and dropped on
//! the next registry change instead.

use crate::warn;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tube_player_core::{
    EngineEvent, EngineFactory, Error, EventContext, Listener, ListenerId, PlaybackControl,
    PlaybackEngine, PlaybackOptions, PlaybackSource, Result,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlVideoElement;

#[wasm_bindgen]
extern "C" {
    /// A Plyr instance
    #[derive(Debug, Clone)]
    pub type Plyr;

    #[wasm_bindgen(constructor, catch)]
    fn new(target: &HtmlVideoElement, options: &JsValue) -> std::result::Result<Plyr, JsValue>;

    #[wasm_bindgen(method, getter, js_name = currentTime)]
    fn js_current_time(this: &Plyr) -> f64;

    #[wasm_bindgen(method, setter, js_name = currentTime)]
    fn js_set_current_time(this: &Plyr, seconds: f64);

    #[wasm_bindgen(method, getter, js_name = duration)]
    fn js_duration(this: &Plyr) -> f64;

    #[wasm_bindgen(method, getter, js_name = paused)]
    fn js_paused(this: &Plyr) -> bool;

    /// Returns the promise from `HTMLMediaElement.play()`
    #[wasm_bindgen(method, js_name = play)]
    fn js_play(this: &Plyr) -> JsValue;

    #[wasm_bindgen(method, js_name = pause)]
    fn js_pause(this: &Plyr);

    #[wasm_bindgen(method, getter, js_name = muted)]
    fn js_muted(this: &Plyr) -> bool;

    #[wasm_bindgen(method, setter, js_name = muted)]
    fn js_set_muted(this: &Plyr, muted: bool);

    #[wasm_bindgen(method, getter, js_name = volume)]
    fn js_volume(this: &Plyr) -> f64;

    #[wasm_bindgen(method, setter, js_name = volume)]
    fn js_set_volume(this: &Plyr, volume: f64);

    #[wasm_bindgen(method, getter, js_name = speed)]
    fn js_speed(this: &Plyr) -> f64;

    #[wasm_bindgen(method, setter, js_name = speed)]
    fn js_set_speed(this: &Plyr, speed: f64);

    #[wasm_bindgen(method, getter, js_name = "loop")]
    fn js_loop(this: &Plyr) -> bool;

    #[wasm_bindgen(method, setter, js_name = "loop")]
    fn js_set_loop(this: &Plyr, looping: bool);

    #[wasm_bindgen(method, getter, js_name = pip)]
    fn js_pip(this: &Plyr) -> bool;

    #[wasm_bindgen(method, setter, js_name = pip)]
    fn js_set_pip(this: &Plyr, active: bool);

    /// Current source URL, empty when none is bound
    #[wasm_bindgen(method, getter, js_name = source)]
    fn js_source(this: &Plyr) -> JsValue;

    #[wasm_bindgen(method, setter, js_name = source)]
    fn js_set_source(this: &Plyr, source: &JsValue);

    #[wasm_bindgen(method, js_name = on)]
    fn js_on(this: &Plyr, event: &str, callback: &js_sys::Function);

    #[wasm_bindgen(method, js_name = off)]
    fn js_off(this: &Plyr, event: &str, callback: &js_sys::Function);

    #[wasm_bindgen(method, js_name = destroy)]
    fn js_destroy(this: &Plyr);
}

impl PlaybackControl for Plyr {
    fn current_time(&self) -> f64 {
        self.js_current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.js_set_current_time(seconds);
    }

    fn duration(&self) -> Option<f64> {
        // Plyr reports 0 until metadata has loaded
        let duration = self.js_duration();
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }

    fn play(&mut self) {
        catch_play_rejection(self.js_play());
    }

    fn pause(&mut self) {
        self.js_pause();
    }

    fn is_paused(&self) -> bool {
        self.js_paused()
    }

    fn muted(&self) -> bool {
        self.js_muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.js_set_muted(muted);
    }

    fn volume(&self) -> f64 {
        self.js_volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.js_set_volume(volume.clamp(0.0, 1.0));
    }

    fn speed(&self) -> f64 {
        self.js_speed()
    }

    fn set_speed(&mut self, speed: f64) {
        self.js_set_speed(speed);
    }

    fn looping(&self) -> bool {
        self.js_loop()
    }

    fn set_looping(&mut self, looping: bool) {
        self.js_set_loop(looping);
    }

    fn pip(&self) -> bool {
        self.js_pip()
    }

    fn set_pip(&mut self, active: bool) {
        self.js_set_pip(active);
    }
}

thread_local! {
    static PLAY_REJECTED: Closure<dyn FnMut(JsValue)> = Closure::new(|reason: JsValue| {
        warn(&format!("Playback request rejected: {:?}", reason));
    });
}

/// Log a rejected `play()` promise instead of leaving it unhandled
fn catch_play_rejection(result: JsValue) {
    if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
        PLAY_REJECTED.with(|on_rejected| {
            let _ = promise.catch(on_rejected);
        });
    }
}

/// Convert a serializable value into a plain JS object
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| Error::InvalidConfig(e.to_string()))
}

struct Registration {
    event: EngineEvent,
    function: js_sys::Function,
    _closure: Closure<dyn FnMut(JsValue)>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    live: HashMap<ListenerId, Registration>,
    retired: Vec<Registration>,
}

impl Registry {
    fn release(&mut self, plyr: &Plyr, id: ListenerId) -> bool {
        match self.live.remove(&id) {
            Some(registration) => {
                plyr.js_off(registration.event.as_str(), &registration.function);
                self.retired.push(registration);
                true
            }
            None => false,
        }
    }

    /// Drop closures released since the last change
    fn sweep(&mut self) {
        self.retired.clear();
    }
}

/// [`PlaybackEngine`] backed by a Plyr instance
pub struct PlyrEngine {
    plyr: Plyr,
    registry: Rc<RefCell<Registry>>,
}

impl PlyrEngine {
    pub fn new(plyr: Plyr) -> Self {
        Self {
            plyr,
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }

    /// Number of listeners currently attached
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().live.len()
    }
}

impl PlaybackControl for PlyrEngine {
    fn current_time(&self) -> f64 {
        self.plyr.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.plyr.set_current_time(seconds);
    }

    fn duration(&self) -> Option<f64> {
        self.plyr.duration()
    }

    fn play(&mut self) {
        self.plyr.play();
    }

    fn pause(&mut self) {
        self.plyr.pause();
    }

    fn is_paused(&self) -> bool {
        self.plyr.is_paused()
    }

    fn muted(&self) -> bool {
        self.plyr.muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.plyr.set_muted(muted);
    }

    fn volume(&self) -> f64 {
        self.plyr.volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.plyr.set_volume(volume);
    }

    fn speed(&self) -> f64 {
        self.plyr.speed()
    }

    fn set_speed(&mut self, speed: f64) {
        self.plyr.set_speed(speed);
    }

    fn looping(&self) -> bool {
        self.plyr.looping()
    }

    fn set_looping(&mut self, looping: bool) {
        self.plyr.set_looping(looping);
    }

    fn pip(&self) -> bool {
        self.plyr.pip()
    }

    fn set_pip(&mut self, active: bool) {
        self.plyr.set_pip(active);
    }
}

impl PlaybackEngine for PlyrEngine {
    fn source(&self) -> Option<String> {
        self.plyr.js_source().as_string().filter(|s| !s.is_empty())
    }

    fn set_source(&mut self, source: &PlaybackSource) {
        match to_js(&source.to_plyr()) {
            Ok(value) => self.plyr.js_set_source(&value),
            Err(e) => warn(&format!("Failed to convert source {}: {}", source.uri, e)),
        }
    }

    fn on(&mut self, event: EngineEvent, mut listener: Listener) -> ListenerId {
        let mut registry = self.registry.borrow_mut();
        registry.sweep();
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);

        let plyr = self.plyr.clone();
        let weak: Weak<RefCell<Registry>> = Rc::downgrade(&self.registry);
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            let mut control = plyr.clone();
            let mut ctx = EventContext::new(event, id, &mut control);
            listener(&mut ctx);
            if ctx.is_detached() {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().release(&plyr, id);
                }
            }
        });

        let function: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
        self.plyr.js_on(event.as_str(), &function);
        registry.live.insert(
            id,
            Registration {
                event,
                function,
                _closure: closure,
            },
        );
        id
    }

    fn off(&mut self, id: ListenerId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let removed = registry.release(&self.plyr, id);
        registry.sweep();
        removed
    }

    fn destroy(&mut self) {
        let mut registry = self.registry.borrow_mut();
        let ids: Vec<ListenerId> = registry.live.keys().copied().collect();
        for id in ids {
            registry.release(&self.plyr, id);
        }
        registry.sweep();
        self.plyr.js_destroy();
    }
}

/// Builds Plyr engines on a video element it owns
pub struct PlyrFactory {
    video: HtmlVideoElement,
}

impl PlyrFactory {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self { video }
    }
}

impl EngineFactory for PlyrFactory {
    fn create(
        &self,
        source: &PlaybackSource,
        options: &PlaybackOptions,
    ) -> Result<Box<dyn PlaybackEngine>> {
        let js_options = to_js(&options.to_plyr())?;
        let plyr = Plyr::new(&self.video, &js_options)
            .map_err(|e| Error::engine(format!("Plyr construction failed: {:?}", e)))?;

        plyr.js_set_source(&to_js(&source.to_plyr())?);
        Ok(Box::new(PlyrEngine::new(plyr)))
    }
}
