//! Playback engine abstraction
//!
//! The player never decodes video itself. It drives an external engine (Plyr
//! in the browser, [`SimulatedEngine`] in tests and the CLI) through two
//! traits:
//!
//! - [`PlaybackControl`]: the command surface shared by the adapter and the
//!   context menu
//! - [`PlaybackEngine`]: control plus source binding and event subscription
//!
//! Subscriptions return a [`ListenerId`] token that can be released with
//! [`PlaybackEngine::off`]. A listener may also ask to be removed from inside
//! its own invocation through [`EventContext::detach`].

mod handle;
mod simulated;

pub use handle::PlaybackHandle;
pub use simulated::{EngineCall, SimulatedEngine};

use crate::options::PlaybackOptions;
use crate::source::PlaybackSource;
use crate::types::EngineEvent;
use crate::Result;
use std::fmt;

/// Token identifying a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Callback invoked when an engine event fires
pub type Listener = Box<dyn FnMut(&mut EventContext<'_>)>;

/// Context handed to a listener for the duration of one invocation
pub struct EventContext<'a> {
    event: EngineEvent,
    listener: ListenerId,
    control: &'a mut dyn PlaybackControl,
    detach: bool,
}

impl<'a> EventContext<'a> {
    pub fn new(
        event: EngineEvent,
        listener: ListenerId,
        control: &'a mut dyn PlaybackControl,
    ) -> Self {
        Self {
            event,
            listener,
            control,
            detach: false,
        }
    }

    pub fn event(&self) -> EngineEvent {
        self.event
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener
    }

    /// Commands for the engine that fired the event
    pub fn control(&mut self) -> &mut dyn PlaybackControl {
        &mut *self.control
    }

    /// Remove the running listener once it returns
    pub fn detach(&mut self) {
        self.detach = true;
    }

    pub fn is_detached(&self) -> bool {
        self.detach
    }
}

/// Commands accepted by a live engine
pub trait PlaybackControl {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Move the playback position
    fn set_current_time(&mut self, seconds: f64);

    /// Media duration, once metadata is known
    fn duration(&self) -> Option<f64>;

    fn play(&mut self);

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    fn muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Volume in `0.0..=1.0`
    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    /// Playback rate, 1.0 being normal speed
    fn speed(&self) -> f64;

    fn set_speed(&mut self, speed: f64);

    fn looping(&self) -> bool;

    fn set_looping(&mut self, looping: bool);

    /// Whether picture-in-picture is active
    fn pip(&self) -> bool;

    fn set_pip(&mut self, active: bool);
}

/// A playback engine bound to a visual surface
pub trait PlaybackEngine: PlaybackControl {
    /// URI of the bound source, `None` until the engine has one
    fn source(&self) -> Option<String>;

    /// Replace the bound source
    fn set_source(&mut self, source: &PlaybackSource);

    /// Register a listener for `event`
    fn on(&mut self, event: EngineEvent, listener: Listener) -> ListenerId;

    /// Release a listener; returns false if it was not registered
    fn off(&mut self, id: ListenerId) -> bool;

    /// Tear down the engine and its surface bindings
    fn destroy(&mut self) {}
}

/// Creates engines against a surface the factory owns
pub trait EngineFactory {
    fn create(
        &self,
        source: &PlaybackSource,
        options: &PlaybackOptions,
    ) -> Result<Box<dyn PlaybackEngine>>;
}

impl<F> EngineFactory for F
where
    F: Fn(&PlaybackSource, &PlaybackOptions) -> Result<Box<dyn PlaybackEngine>>,
{
    fn create(
        &self,
        source: &PlaybackSource,
        options: &PlaybackOptions,
    ) -> Result<Box<dyn PlaybackEngine>> {
        self(source, options)
    }
}

impl PlaybackControl for Box<dyn PlaybackEngine> {
    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        (**self).set_current_time(seconds)
    }

    fn duration(&self) -> Option<f64> {
        (**self).duration()
    }

    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }

    fn muted(&self) -> bool {
        (**self).muted()
    }

    fn set_muted(&mut self, muted: bool) {
        (**self).set_muted(muted)
    }

    fn volume(&self) -> f64 {
        (**self).volume()
    }

    fn set_volume(&mut self, volume: f64) {
        (**self).set_volume(volume)
    }

    fn speed(&self) -> f64 {
        (**self).speed()
    }

    fn set_speed(&mut self, speed: f64) {
        (**self).set_speed(speed)
    }

    fn looping(&self) -> bool {
        (**self).looping()
    }

    fn set_looping(&mut self, looping: bool) {
        (**self).set_looping(looping)
    }

    fn pip(&self) -> bool {
        (**self).pip()
    }

    fn set_pip(&mut self, active: bool) {
        (**self).set_pip(active)
    }
}
