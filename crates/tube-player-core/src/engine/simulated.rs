//! In-process engine used by tests and the CLI
//!
//! Behaves like a browser media engine without decoding anything: events are
//! fired explicitly with [`SimulatedEngine::emit`], and every subscription
//! and seek is recorded so callers can assert on them.

use super::{EngineFactory, EventContext, Listener, ListenerId, PlaybackControl, PlaybackEngine};
use crate::options::PlaybackOptions;
use crate::source::PlaybackSource;
use crate::types::EngineEvent;
use crate::Result;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Calls recorded by the simulated engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum EngineCall {
    Create,
    SetSource { uri: String },
    On { event: EngineEvent, id: u64 },
    Off { id: u64, removed: bool },
    SetCurrentTime { seconds: f64 },
    Destroy,
}

struct Registration {
    id: ListenerId,
    event: EngineEvent,
    /// `None` while the listener is being invoked
    listener: Option<Listener>,
}

#[derive(Default)]
struct State {
    source: Option<String>,
    auto_bind: bool,
    options: Option<PlaybackOptions>,
    current_time: f64,
    duration: Option<f64>,
    paused: bool,
    muted: bool,
    volume: f64,
    speed: f64,
    looping: bool,
    pip: bool,
    destroyed: bool,
    next_id: u64,
    listeners: Vec<Registration>,
    calls: Vec<EngineCall>,
}

/// Simulated playback engine
///
/// Clones share state: keep one clone as a probe and hand another to the
/// player, then drive events through the probe.
#[derive(Clone)]
pub struct SimulatedEngine {
    state: Rc<RefCell<State>>,
}

impl SimulatedEngine {
    /// Engine that binds whatever source it is created with
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Engine that reports no source until [`bind_source`](Self::bind_source)
    pub fn without_source() -> Self {
        Self::build(false)
    }

    fn build(auto_bind: bool) -> Self {
        let state = State {
            auto_bind,
            paused: true,
            volume: 1.0,
            speed: 1.0,
            ..Default::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Bind a source URI directly
    pub fn bind_source(&self, uri: impl Into<String>) {
        self.state.borrow_mut().source = Some(uri.into());
    }

    /// Report a media duration, as a metadata load would
    pub fn set_duration(&self, seconds: f64) {
        self.state.borrow_mut().duration = Some(seconds);
    }

    /// Fire `event`, returning how many listeners ran
    pub fn emit(&self, event: EngineEvent) -> usize {
        let pending: Vec<(ListenerId, Listener)> = {
            let mut state = self.state.borrow_mut();
            state
                .listeners
                .iter_mut()
                .filter(|r| r.event == event)
                .filter_map(|r| r.listener.take().map(|l| (r.id, l)))
                .collect()
        };

        trace!(event = %event, listeners = pending.len(), "Simulated emit");

        let count = pending.len();
        for (id, mut listener) in pending {
            let mut control = self.clone();
            let mut ctx = EventContext::new(event, id, &mut control);
            listener(&mut ctx);
            let detached = ctx.is_detached();

            let mut state = self.state.borrow_mut();
            if detached {
                state.listeners.retain(|r| r.id != id);
                state.calls.push(EngineCall::Off { id: id.0, removed: true });
            } else if let Some(slot) = state.listeners.iter_mut().find(|r| r.id == id) {
                slot.listener = Some(listener);
            }
        }
        count
    }

    /// Fire several events in order
    pub fn emit_all(&self, events: &[EngineEvent]) -> usize {
        events.iter().map(|e| self.emit(*e)).sum()
    }

    /// Number of live listeners for `event`
    pub fn listener_count(&self, event: EngineEvent) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|r| r.event == event)
            .count()
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of `on` calls recorded
    pub fn subscribe_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, EngineCall::On { .. }))
            .count()
    }

    /// Every value written to `currentTime`
    pub fn seeks(&self) -> Vec<f64> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::SetCurrentTime { seconds } => Some(*seconds),
                _ => None,
            })
            .collect()
    }

    /// Options the engine was created with
    pub fn options(&self) -> Option<PlaybackOptions> {
        self.state.borrow().options.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for SimulatedEngine {
    fn create(
        &self,
        source: &PlaybackSource,
        options: &PlaybackOptions,
    ) -> Result<Box<dyn PlaybackEngine>> {
        {
            let mut state = self.state.borrow_mut();
            if state.auto_bind {
                state.source = Some(source.uri.clone());
            }
            state.options = Some(options.clone());
            state.paused = !options.autoplay;
            state.destroyed = false;
            state.calls.push(EngineCall::Create);
        }
        Ok(Box::new(self.clone()))
    }
}

impl PlaybackControl for SimulatedEngine {
    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        let seconds = match state.duration {
            Some(duration) => seconds.clamp(0.0, duration),
            None => seconds.max(0.0),
        };
        state.current_time = seconds;
        state.calls.push(EngineCall::SetCurrentTime { seconds });
    }

    fn duration(&self) -> Option<f64> {
        self.state.borrow().duration
    }

    fn play(&mut self) {
        self.state.borrow_mut().paused = false;
    }

    fn pause(&mut self) {
        self.state.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn muted(&self) -> bool {
        self.state.borrow().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.borrow_mut().volume = volume.clamp(0.0, 1.0);
    }

    fn speed(&self) -> f64 {
        self.state.borrow().speed
    }

    fn set_speed(&mut self, speed: f64) {
        self.state.borrow_mut().speed = speed;
    }

    fn looping(&self) -> bool {
        self.state.borrow().looping
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }

    fn pip(&self) -> bool {
        self.state.borrow().pip
    }

    fn set_pip(&mut self, active: bool) {
        self.state.borrow_mut().pip = active;
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    fn set_source(&mut self, source: &PlaybackSource) {
        let mut state = self.state.borrow_mut();
        state.source = Some(source.uri.clone());
        state.current_time = 0.0;
        state.duration = None;
        state.calls.push(EngineCall::SetSource {
            uri: source.uri.clone(),
        });
    }

    fn on(&mut self, event: EngineEvent, listener: Listener) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        state.listeners.push(Registration {
            id,
            event,
            listener: Some(listener),
        });
        state.calls.push(EngineCall::On { event, id: id.0 });
        id
    }

    fn off(&mut self, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|r| r.id != id);
        let removed = state.listeners.len() != before;
        state.calls.push(EngineCall::Off { id: id.0, removed });
        removed
    }

    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        state.listeners.clear();
        state.destroyed = true;
        state.calls.push(EngineCall::Destroy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_runs_matching_listeners() {
        let probe = SimulatedEngine::new();
        let mut engine = probe.clone();

        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        engine.on(
            EngineEvent::Ready,
            Box::new(move |_: &mut EventContext<'_>| *counter.borrow_mut() += 1),
        );

        assert_eq!(probe.emit(EngineEvent::Ready), 1);
        assert_eq!(probe.emit(EngineEvent::LoadedMetadata), 0);
        assert_eq!(probe.emit(EngineEvent::Ready), 1);
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn test_detach_from_inside_listener() {
        let probe = SimulatedEngine::new();
        let mut engine = probe.clone();

        engine.on(
            EngineEvent::LoadedMetadata,
            Box::new(|ctx: &mut EventContext<'_>| {
                ctx.detach();
                ctx.control().set_current_time(5.0);
            }),
        );

        assert_eq!(probe.emit(EngineEvent::LoadedMetadata), 1);
        assert_eq!(probe.emit(EngineEvent::LoadedMetadata), 0);
        assert_eq!(probe.listener_count(EngineEvent::LoadedMetadata), 0);
        assert_eq!(probe.seeks(), vec![5.0]);
    }

    #[test]
    fn test_off_releases_listener() {
        let mut engine = SimulatedEngine::new();
        let id = engine.on(EngineEvent::Ready, Box::new(|_: &mut EventContext<'_>| {}));
        assert!(engine.off(id));
        assert!(!engine.off(id));
        assert_eq!(engine.listener_count(EngineEvent::Ready), 0);
    }

    #[test]
    fn test_seek_clamped_to_duration() {
        let mut engine = SimulatedEngine::new();
        engine.set_duration(10.0);
        engine.set_current_time(42.0);
        assert_eq!(engine.current_time(), 10.0);
        engine.set_current_time(-1.0);
        assert_eq!(engine.current_time(), 0.0);
    }

    #[test]
    fn test_factory_binds_source() {
        let probe = SimulatedEngine::new();
        let source = PlaybackSource::resolve("https://v/a.mp4", "", &crate::cdn::NoCdn);
        let engine = probe.create(&source, &PlaybackOptions::default()).unwrap();
        assert_eq!(engine.source().as_deref(), Some("https://v/a.mp4"));

        let unbound = SimulatedEngine::without_source();
        let engine = unbound.create(&source, &PlaybackOptions::default()).unwrap();
        assert_eq!(engine.source(), None);
    }
}
