//! Tube Player Core - Video player component for Tube
//!
//! This crate provides the playback component used by the Tube front-end:
//! - Poster resolution through the image CDN, with source fallback
//! - Engine options assembled from component props
//! - A player adapter that mounts the engine and restores the start position
//! - A right-click context menu backed by the live engine
//! - Publication metadata parsing for building props
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Tube Player Core                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │                    ┌──────────────┐                             │
//! │                    │ VideoPlayer  │  props → view               │
//! │                    │   (facade)   │                             │
//! │                    └──────┬───────┘                             │
//! │         ┌─────────────────┼─────────────────┐                   │
//! │  ┌──────┴───────┐  ┌──────┴───────┐  ┌──────┴───────┐           │
//! │  │    Source    │  │    Player    │  │ Context Menu │           │
//! │  │   Resolver   │  │   Adapter    │  │  Controller  │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │  ┌──────┴───────┐  ┌──────┴─────────────────┴──────┐            │
//! │  │  Image CDN   │  │       Playback Handle         │            │
//! │  └──────────────┘  └──────────────┬────────────────┘            │
//! │                                   │                             │
//! │                         ┌─────────┴─────────┐                   │
//! │                         │  Playback Engine  │  Plyr / simulated │
//! │                         └───────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate is single-threaded and has no async runtime, so it builds for
//! `wasm32-unknown-unknown` as-is.

pub mod error;
pub mod types;
pub mod cdn;
pub mod source;
pub mod options;
pub mod engine;
pub mod adapter;
pub mod context_menu;
pub mod metadata;
pub mod player;

pub use error::{Error, Result};
pub use types::*;
pub use cdn::{CdnConfig, CdnResolver, ImageCdn, NoCdn};
pub use source::{resolve_poster, MediaType, PlaybackSource};
pub use options::{PlaybackOptions, PlyrOptions};
pub use engine::{
    EngineCall, EngineFactory, EventContext, Listener, ListenerId, PlaybackControl,
    PlaybackEngine, PlaybackHandle, SimulatedEngine,
};
pub use adapter::PlayerAdapter;
pub use context_menu::{
    ContextMenuController, ContextMenuEvent, ContextMenuState, ContextMenuView, MenuAction,
    MenuItem, MenuTransition,
};
pub use metadata::PublicationMetadata;
pub use player::{PlayerView, VideoPlayer, VideoPlayerProps};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "Tube Player Core initialized");
}
