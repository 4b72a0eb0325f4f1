//! Engine options assembled from player props

use crate::types::{AspectRatio, Control, DEFAULT_CONTROLS};
use serde::{Deserialize, Serialize};

/// Declarative options passed to the engine at mount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackOptions {
    pub controls: Vec<Control>,
    pub autoplay: bool,
    pub autopause: bool,
    pub tooltips_enabled: bool,
    pub ratio: AspectRatio,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            controls: DEFAULT_CONTROLS.to_vec(),
            autoplay: true,
            autopause: true,
            tooltips_enabled: true,
            ratio: AspectRatio::default(),
        }
    }
}

impl PlaybackOptions {
    /// True when the engine's built-in context menu is suppressed
    pub fn disables_context_menu(&self) -> bool {
        self.controls.contains(&Control::DisableContextMenu)
    }

    /// Options object in the shape the Plyr engine expects
    pub fn to_plyr(&self) -> PlyrOptions {
        PlyrOptions {
            controls: self.controls.clone(),
            autoplay: self.autoplay,
            autopause: self.autopause,
            tooltips: Tooltips {
                controls: self.tooltips_enabled,
                seek: self.tooltips_enabled,
            },
            ratio: self.ratio,
        }
    }
}

/// Plyr wire representation of [`PlaybackOptions`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlyrOptions {
    pub controls: Vec<Control>,
    pub autoplay: bool,
    pub autopause: bool,
    pub tooltips: Tooltips,
    pub ratio: AspectRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tooltips {
    pub controls: bool,
    pub seek: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PlaybackOptions::default();
        assert_eq!(options.controls, DEFAULT_CONTROLS);
        assert!(options.autoplay);
        assert!(options.autopause);
        assert!(options.disables_context_menu());
        assert_eq!(options.ratio.to_string(), "16:9");
    }

    #[test]
    fn test_plyr_json() {
        let options = PlaybackOptions {
            controls: vec![Control::Play, Control::Progress],
            autoplay: false,
            ratio: AspectRatio::SQUARE,
            ..Default::default()
        };
        let json = serde_json::to_value(options.to_plyr()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "controls": ["play", "progress"],
                "autoplay": false,
                "autopause": true,
                "tooltips": { "controls": true, "seek": true },
                "ratio": "1:1"
            })
        );
    }
}
