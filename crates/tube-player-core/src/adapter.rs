//! Player adapter - binds declarative props to an imperative engine
//!
//! Mounts the engine on the first render and keeps one derived behaviour
//! alive afterwards: jumping to the requested start time. Engines can report
//! `ready` before the timeline is known, so the seek is applied on `ready`
//! and again on `loadedmetadata`.
//!
//! Every render re-runs the seek effect. The tokens from the previous run are
//! released first, so the adapter never owns more than one `ready` and one
//! `loadedmetadata` listener. The metadata seek fires at most once per mount,
//! even across source changes.

use crate::engine::{EngineFactory, EventContext, ListenerId, PlaybackHandle};
use crate::options::PlaybackOptions;
use crate::source::PlaybackSource;
use crate::types::{EngineEvent, PlayerId, SeekTarget};
use crate::Result;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

/// Adapter between player props and a playback engine
pub struct PlayerAdapter {
    id: PlayerId,
    handle: PlaybackHandle,
    factory: Box<dyn EngineFactory>,
    /// Fixed at mount, later `time` props are ignored
    seek: Option<SeekTarget>,
    /// Source currently bound to the engine
    source: Option<PlaybackSource>,
    /// Tokens registered by the last effect run
    subscriptions: Vec<ListenerId>,
    /// Set once the metadata seek has run; reset only by a fresh mount
    metadata_applied: Rc<Cell<bool>>,
    renders: u64,
}

impl PlayerAdapter {
    /// Create an adapter that will populate `handle` when it mounts
    pub fn new(id: PlayerId, handle: PlaybackHandle, factory: Box<dyn EngineFactory>) -> Self {
        Self {
            id,
            handle,
            factory,
            seek: None,
            source: None,
            subscriptions: Vec::new(),
            metadata_applied: Rc::new(Cell::new(false)),
            renders: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn handle(&self) -> &PlaybackHandle {
        &self.handle
    }

    pub fn is_mounted(&self) -> bool {
        self.seek.is_some() && self.handle.is_mounted()
    }

    /// Seek target captured at mount
    pub fn seek_target(&self) -> Option<SeekTarget> {
        self.seek
    }

    /// Listener tokens currently owned by the adapter
    pub fn subscriptions(&self) -> &[ListenerId] {
        &self.subscriptions
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Apply one render pass
    #[instrument(skip(self, source, options), fields(player = %self.id))]
    pub fn render(
        &mut self,
        source: &PlaybackSource,
        options: &PlaybackOptions,
        time: Option<f64>,
    ) -> Result<()> {
        self.renders += 1;

        match self.seek {
            None => self.mount(source, options, time)?,
            Some(seek) => {
                let requested = SeekTarget::from_option(time);
                if requested != seek {
                    debug!(
                        mounted = seek.seconds(),
                        requested = requested.seconds(),
                        "Ignoring seek target change after mount"
                    );
                }
                self.sync_source(source)?;
            }
        }

        self.run_seek_effect()
    }

    fn mount(
        &mut self,
        source: &PlaybackSource,
        options: &PlaybackOptions,
        time: Option<f64>,
    ) -> Result<()> {
        let engine = self.factory.create(source, options)?;
        self.handle.populate(engine)?;

        let seek = SeekTarget::from_option(time);
        self.seek = Some(seek);
        self.source = Some(source.clone());
        self.metadata_applied = Rc::new(Cell::new(false));

        info!(
            player = %self.id,
            source = %source.uri,
            seek = seek.seconds(),
            autoplay = options.autoplay,
            "Player mounted"
        );
        Ok(())
    }

    fn sync_source(&mut self, source: &PlaybackSource) -> Result<()> {
        if self.source.as_ref() == Some(source) {
            return Ok(());
        }

        self.handle.with_engine(|engine| engine.set_source(source))?;
        self.source = Some(source.clone());

        info!(player = %self.id, source = %source.uri, "Source changed");
        Ok(())
    }

    /// Release the previous listeners and register fresh seek listeners
    fn run_seek_effect(&mut self) -> Result<()> {
        let target = self.seek.unwrap_or_default().seconds();
        let metadata_applied = self.metadata_applied.clone();
        let id = self.id;
        let subscriptions = &mut self.subscriptions;

        self.handle.with_engine(|engine| {
            for token in subscriptions.drain(..) {
                if !engine.off(token) {
                    debug!(player = %id, %token, "Listener already released");
                }
            }

            if engine.source().is_none() {
                debug!(player = %id, "Engine has no source yet, skipping seek listeners");
                return;
            }

            let ready = engine.on(
                EngineEvent::Ready,
                Box::new(move |ctx: &mut EventContext<'_>| {
                    debug!(seconds = target, "Applying seek on ready");
                    ctx.control().set_current_time(target);
                }),
            );
            subscriptions.push(ready);

            if metadata_applied.get() {
                return;
            }

            let applied = metadata_applied.clone();
            let loaded = engine.on(
                EngineEvent::LoadedMetadata,
                Box::new(move |ctx: &mut EventContext<'_>| {
                    ctx.detach();
                    if applied.replace(true) {
                        return;
                    }
                    debug!(seconds = target, "Applying seek on loadedmetadata");
                    ctx.control().set_current_time(target);
                }),
            );
            subscriptions.push(loaded);
        })
    }

    /// Release listeners and tear down the engine
    #[instrument(skip(self), fields(player = %self.id))]
    pub fn unmount(&mut self) -> Result<()> {
        let Some(mut engine) = self.handle.take()? else {
            warn!(player = %self.id, "Unmount without a mounted engine");
            return Ok(());
        };

        for token in self.subscriptions.drain(..) {
            engine.off(token);
        }
        engine.destroy();

        self.seek = None;
        self.source = None;
        info!(player = %self.id, renders = self.renders, "Player unmounted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdn::NoCdn;
    use crate::engine::{PlaybackEngine, SimulatedEngine};

    fn adapter(engine: &SimulatedEngine) -> PlayerAdapter {
        PlayerAdapter::new(
            PlayerId::new(),
            PlaybackHandle::new(),
            Box::new(engine.clone()),
        )
    }

    fn source(uri: &str) -> PlaybackSource {
        PlaybackSource::resolve(uri, "", &NoCdn)
    }

    #[test]
    fn test_mount_populates_handle() {
        let engine = SimulatedEngine::new();
        let mut adapter = adapter(&engine);
        assert!(!adapter.is_mounted());

        adapter
            .render(&source("https://v/a.mp4"), &PlaybackOptions::default(), Some(3.0))
            .unwrap();

        assert!(adapter.is_mounted());
        assert!(adapter.handle().is_mounted());
        assert_eq!(adapter.seek_target().unwrap().seconds(), 3.0);
        assert_eq!(adapter.subscriptions().len(), 2);
    }

    #[test]
    fn test_rerender_keeps_single_listener_set() {
        let engine = SimulatedEngine::new();
        let mut adapter = adapter(&engine);
        let src = source("https://v/a.mp4");

        for _ in 0..5 {
            adapter.render(&src, &PlaybackOptions::default(), None).unwrap();
        }

        assert_eq!(engine.listener_count(EngineEvent::Ready), 1);
        assert_eq!(engine.listener_count(EngineEvent::LoadedMetadata), 1);
        assert_eq!(adapter.render_count(), 5);
    }

    #[test]
    fn test_metadata_seek_not_rearmed_by_rerender() {
        let engine = SimulatedEngine::new();
        let mut adapter = adapter(&engine);
        let src = source("https://v/a.mp4");

        adapter.render(&src, &PlaybackOptions::default(), Some(7.0)).unwrap();
        engine.emit(EngineEvent::LoadedMetadata);
        adapter.render(&src, &PlaybackOptions::default(), Some(7.0)).unwrap();

        assert_eq!(engine.listener_count(EngineEvent::LoadedMetadata), 0);
        assert_eq!(engine.emit(EngineEvent::LoadedMetadata), 0);
        assert_eq!(engine.seeks(), vec![7.0]);
    }

    #[test]
    fn test_time_change_after_mount_ignored() {
        let engine = SimulatedEngine::new();
        let mut adapter = adapter(&engine);
        let src = source("https://v/a.mp4");

        adapter.render(&src, &PlaybackOptions::default(), Some(10.0)).unwrap();
        adapter.render(&src, &PlaybackOptions::default(), Some(99.0)).unwrap();
        engine.emit(EngineEvent::Ready);

        assert_eq!(engine.seeks(), vec![10.0]);
    }

    #[test]
    fn test_source_change_does_not_rearm_metadata_seek() {
        let engine = SimulatedEngine::new();
        let mut adapter = adapter(&engine);

        adapter
            .render(&source("https://v/a.mp4"), &PlaybackOptions::default(), Some(4.0))
            .unwrap();
        engine.emit(EngineEvent::LoadedMetadata);

        adapter
            .render(&source("https://v/b.mp4"), &PlaybackOptions::default(), Some(4.0))
            .unwrap();
        assert_eq!(engine.source().as_deref(), Some("https://v/b.mp4"));
        assert_eq!(engine.listener_count(EngineEvent::LoadedMetadata), 0);
        assert_eq!(engine.listener_count(EngineEvent::Ready), 1);

        assert_eq!(engine.emit(EngineEvent::LoadedMetadata), 0);
        assert_eq!(engine.seeks(), vec![4.0]);
    }

    #[test]
    fn test_remount_rearms_metadata_seek() {
        let engine = SimulatedEngine::new();
        let mut adapter = adapter(&engine);
        let src = source("https://v/a.mp4");

        adapter.render(&src, &PlaybackOptions::default(), Some(6.0)).unwrap();
        engine.emit(EngineEvent::LoadedMetadata);
        adapter.unmount().unwrap();

        adapter.render(&src, &PlaybackOptions::default(), Some(6.0)).unwrap();
        assert_eq!(engine.emit(EngineEvent::LoadedMetadata), 1);
        assert_eq!(engine.seeks(), vec![6.0, 6.0]);
    }

    #[test]
    fn test_unmount_releases_everything() {
        let engine = SimulatedEngine::new();
        let mut adapter = adapter(&engine);
        adapter
            .render(&source("https://v/a.mp4"), &PlaybackOptions::default(), None)
            .unwrap();

        adapter.unmount().unwrap();

        assert!(!adapter.handle().is_mounted());
        assert!(engine.is_destroyed());
        assert_eq!(engine.listener_count(EngineEvent::Ready), 0);
        assert!(adapter.subscriptions().is_empty());

        // A second unmount is a no-op
        adapter.unmount().unwrap();
    }

    #[test]
    fn test_factory_error_propagates() {
        let failing = |_: &PlaybackSource, _: &PlaybackOptions| {
            Err::<Box<dyn crate::engine::PlaybackEngine>, _>(crate::Error::engine("no surface"))
        };
        let mut adapter = PlayerAdapter::new(PlayerId::new(), PlaybackHandle::new(), Box::new(failing));

        let err = adapter
            .render(&source("https://v/a.mp4"), &PlaybackOptions::default(), None)
            .unwrap_err();
        assert_eq!(err.error_code(), "ENGINE_INIT");
        assert!(!adapter.is_mounted());
    }
}
