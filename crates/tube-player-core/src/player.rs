//! Video player facade
//!
//! The outward-facing component. Takes props, assembles the engine options
//! and source, and composes the adapter with the context menu.
//!
//! ```rust
//! use tube_player_core::{SimulatedEngine, VideoPlayer, VideoPlayerProps};
//!
//! let engine = SimulatedEngine::new();
//! let props = VideoPlayerProps::new("https://cdn.example/video.mp4", "ipfs://bafyposter")
//!     .with_time(42.0);
//! let mut player = VideoPlayer::new(props, engine.clone());
//! let view = player.render().unwrap();
//! assert_eq!(view.surface_class, "plyr-react plyr");
//! ```

use crate::adapter::PlayerAdapter;
use crate::cdn::{CdnResolver, ImageCdn};
use crate::context_menu::{
    ContextMenuController, ContextMenuEvent, ContextMenuState, ContextMenuView, MenuAction,
    MenuTransition,
};
use crate::engine::{EngineFactory, PlaybackHandle};
use crate::metadata::PublicationMetadata;
use crate::options::PlaybackOptions;
use crate::source::PlaybackSource;
use crate::types::{AspectRatio, Control, PlayerId, DEFAULT_CONTROLS};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Classes always applied to the wrapper element
pub const WRAPPER_CLASS: &str = "wrapper overflow-hidden rounded-xl";

/// Classes applied to the video surface
pub const SURFACE_CLASS: &str = "plyr-react plyr";

/// Props accepted by [`VideoPlayer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPlayerProps {
    pub source: String,
    #[serde(default)]
    pub poster: String,
    #[serde(default = "default_controls")]
    pub controls: Vec<Control>,
    #[serde(default = "default_auto_play")]
    pub auto_play: bool,
    #[serde(default)]
    pub ratio: AspectRatio,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapper_class_name: Option<String>,
}

fn default_controls() -> Vec<Control> {
    DEFAULT_CONTROLS.to_vec()
}

fn default_auto_play() -> bool {
    true
}

impl VideoPlayerProps {
    pub fn new(source: impl Into<String>, poster: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            poster: poster.into(),
            controls: default_controls(),
            auto_play: true,
            ratio: AspectRatio::default(),
            time: None,
            wrapper_class_name: None,
        }
    }

    /// Parse props from a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Props for a publication, resolving storage URLs through `gateways`
    pub fn from_metadata(metadata: &PublicationMetadata, gateways: &ImageCdn) -> Result<Self> {
        let media = metadata.playable_media()?;
        let source = gateways
            .sanitize(&media.url)
            .map(|u| u.to_string())
            .unwrap_or_else(|| media.url.clone());

        let mut props = Self::new(source, metadata.cover_url());
        if let Some(seconds) = metadata
            .attribute("startTime")
            .and_then(|v| v.parse::<f64>().ok())
        {
            props.time = Some(seconds);
        }
        Ok(props)
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    /// Parse controls from their engine identifiers
    pub fn with_control_names<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self> {
        self.controls = names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<Vec<Control>>>()?;
        Ok(self)
    }

    pub fn with_auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn with_ratio(mut self, ratio: AspectRatio) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_time(mut self, seconds: f64) -> Self {
        self.time = Some(seconds);
        self
    }

    pub fn with_wrapper_class(mut self, class: impl Into<String>) -> Self {
        self.wrapper_class_name = Some(class.into());
        self
    }

    /// Engine options for these props
    pub fn options(&self) -> PlaybackOptions {
        PlaybackOptions {
            controls: self.controls.clone(),
            autoplay: self.auto_play,
            autopause: true,
            tooltips_enabled: true,
            ratio: self.ratio,
        }
    }
}

/// Description of one rendered frame of the component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub wrapper_class: String,
    pub surface_class: &'static str,
    pub source: PlaybackSource,
    pub options: PlaybackOptions,
    pub menu: Option<ContextMenuView>,
}

/// Video player component
pub struct VideoPlayer {
    id: PlayerId,
    props: VideoPlayerProps,
    cdn: Box<dyn CdnResolver>,
    handle: PlaybackHandle,
    adapter: PlayerAdapter,
    menu: ContextMenuController,
}

impl VideoPlayer {
    /// Create a player that mounts engines from `factory`
    pub fn new(props: VideoPlayerProps, factory: impl EngineFactory + 'static) -> Self {
        Self::with_handle(props, factory, PlaybackHandle::new())
    }

    /// Create a player that populates a caller-owned handle
    pub fn with_handle(
        props: VideoPlayerProps,
        factory: impl EngineFactory + 'static,
        handle: PlaybackHandle,
    ) -> Self {
        let id = PlayerId::new();
        Self {
            id,
            props,
            cdn: Box::new(ImageCdn::default()),
            adapter: PlayerAdapter::new(id, handle.clone(), Box::new(factory)),
            handle,
            menu: ContextMenuController::new(),
        }
    }

    /// Use a different poster CDN
    pub fn with_cdn(mut self, cdn: impl CdnResolver + 'static) -> Self {
        self.cdn = Box::new(cdn);
        self
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn props(&self) -> &VideoPlayerProps {
        &self.props
    }

    /// Shared handle to the mounted engine
    pub fn handle(&self) -> PlaybackHandle {
        self.handle.clone()
    }

    pub fn adapter(&self) -> &PlayerAdapter {
        &self.adapter
    }

    pub fn menu_state(&self) -> ContextMenuState {
        self.menu.state()
    }

    /// Replace the props; takes effect on the next render
    pub fn set_props(&mut self, props: VideoPlayerProps) {
        self.props = props;
    }

    /// Resolved source for the current props
    pub fn source(&self) -> PlaybackSource {
        PlaybackSource::resolve(&self.props.source, &self.props.poster, self.cdn.as_ref())
    }

    /// Render the component, mounting the engine on first call
    #[instrument(skip(self), fields(player = %self.id))]
    pub fn render(&mut self) -> Result<PlayerView> {
        let source = self.source();
        let options = self.props.options();
        self.adapter.render(&source, &options, self.props.time)?;

        let menu = match self.menu.state() {
            ContextMenuState::Visible { position } => {
                match ContextMenuView::build(position, &self.handle) {
                    Ok(view) => Some(view),
                    Err(e) => {
                        warn!(error = %e, "Context menu not rendered");
                        None
                    }
                }
            }
            ContextMenuState::Hidden => None,
        };

        Ok(PlayerView {
            wrapper_class: class_names(&[Some(WRAPPER_CLASS), self.props.wrapper_class_name.as_deref()]),
            surface_class: SURFACE_CLASS,
            source,
            options,
            menu,
        })
    }

    /// Right-click on the video surface
    pub fn on_context_menu(&mut self, event: &mut ContextMenuEvent) -> MenuTransition {
        self.menu.on_context_menu(event)
    }

    /// Dismiss the context menu
    pub fn hide_context_menu(&mut self) -> MenuTransition {
        self.menu.hide()
    }

    /// Run a menu command on the engine, then dismiss the menu
    pub fn select_menu_action(&mut self, action: MenuAction) -> Result<()> {
        self.handle.with(|control| action.apply(control))?;
        self.menu.hide();
        Ok(())
    }

    /// Tear the component down
    pub fn unmount(&mut self) -> Result<()> {
        self.menu.hide();
        self.adapter.unmount()
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        if self.adapter.is_mounted() {
            if let Err(e) = self.adapter.unmount() {
                warn!(player = %self.id, error = %e, "Failed to unmount on drop");
            }
        }
    }
}

/// Join class names, skipping empty entries
pub fn class_names(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
