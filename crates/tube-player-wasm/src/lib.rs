//! Tube Player WASM - Browser binding for the Tube video player
//!
//! Drives the Plyr JavaScript player from the Rust component:
//! - `PlyrEngine` implements the playback engine on a Plyr instance
//! - `TubePlayer` mounts the component into a container element
//!
//! ## Usage
//!
//! ```javascript
//! import init, { TubePlayer } from '@tube/player-wasm';
//!
//! await init();
//! const player = new TubePlayer(container, {
//!   source: 'https://cdn.example/video.mp4',
//!   poster: 'ipfs://bafyposter',
//!   time: 42,
//! });
//! player.onMenuChange((menu) => renderMenu(menu));
//! ```
//!
//! The `Plyr` class must be available globally before a player is mounted.

use wasm_bindgen::prelude::*;

mod component;
mod plyr;

pub use component::TubePlayer;
pub use plyr::{Plyr, PlyrEngine, PlyrFactory};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&format!("[Tube Player] v{} initialized", tube_player_core::VERSION).into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    tube_player_core::VERSION.to_string()
}

/// Default control names, in display order
#[wasm_bindgen(js_name = defaultControls)]
pub fn default_controls() -> Vec<JsValue> {
    tube_player_core::DEFAULT_CONTROLS
        .iter()
        .map(|c| JsValue::from_str(c.as_str()))
        .collect()
}

pub(crate) fn warn(message: &str) {
    web_sys::console::warn_1(&format!("[Tube Player] {}", message).into());
}
