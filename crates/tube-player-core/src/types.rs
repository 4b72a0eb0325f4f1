//! Core types for Tube Player

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a mounted player instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pointer position in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Video aspect ratio, written as `"W:H"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const WIDESCREEN: AspectRatio = AspectRatio { width: 16, height: 9 };
    pub const STANDARD: AspectRatio = AspectRatio { width: 4, height: 3 };
    pub const SQUARE: AspectRatio = AspectRatio { width: 1, height: 1 };
    pub const PORTRAIT: AspectRatio = AspectRatio { width: 9, height: 16 };

    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidAspectRatio(format!("{}:{}", width, height)));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidAspectRatio(s.to_string());
        let (w, h) = s.trim().split_once(':').ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        AspectRatio::new(width, height).map_err(|_| invalid())
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.to_string()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Player controls understood by the Plyr engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Control {
    PlayLarge,
    Restart,
    Rewind,
    Play,
    FastForward,
    Progress,
    CurrentTime,
    Duration,
    Mute,
    Volume,
    Captions,
    Settings,
    Pip,
    Airplay,
    Download,
    Fullscreen,
    /// Marker that suppresses the engine's own context menu
    DisableContextMenu,
}

impl Control {
    pub const ALL: [Control; 17] = [
        Control::PlayLarge,
        Control::Restart,
        Control::Rewind,
        Control::Play,
        Control::FastForward,
        Control::Progress,
        Control::CurrentTime,
        Control::Duration,
        Control::Mute,
        Control::Volume,
        Control::Captions,
        Control::Settings,
        Control::Pip,
        Control::Airplay,
        Control::Download,
        Control::Fullscreen,
        Control::DisableContextMenu,
    ];

    /// Engine identifier for this control
    pub fn as_str(&self) -> &'static str {
        match self {
            Control::PlayLarge => "play-large",
            Control::Restart => "restart",
            Control::Rewind => "rewind",
            Control::Play => "play",
            Control::FastForward => "fast-forward",
            Control::Progress => "progress",
            Control::CurrentTime => "current-time",
            Control::Duration => "duration",
            Control::Mute => "mute",
            Control::Volume => "volume",
            Control::Captions => "captions",
            Control::Settings => "settings",
            Control::Pip => "pip",
            Control::Airplay => "airplay",
            Control::Download => "download",
            Control::Fullscreen => "fullscreen",
            Control::DisableContextMenu => "disableContextMenu",
        }
    }
}

impl FromStr for Control {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Control::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownControl(s.to_string()))
    }
}

impl TryFrom<String> for Control {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Control> for String {
    fn from(control: Control) -> Self {
        control.as_str().to_string()
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control list used when the caller does not provide one
pub const DEFAULT_CONTROLS: &[Control] = &[
    Control::PlayLarge,
    Control::Play,
    Control::Progress,
    Control::CurrentTime,
    Control::Mute,
    Control::Volume,
    Control::Captions,
    Control::Settings,
    Control::Pip,
    Control::Airplay,
    Control::Fullscreen,
    Control::DisableContextMenu,
];

/// Lifecycle events emitted by the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineEvent {
    Ready,
    LoadedMetadata,
    LoadedData,
    Play,
    Pause,
    Ended,
    TimeUpdate,
}

impl EngineEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineEvent::Ready => "ready",
            EngineEvent::LoadedMetadata => "loadedmetadata",
            EngineEvent::LoadedData => "loadeddata",
            EngineEvent::Play => "play",
            EngineEvent::Pause => "pause",
            EngineEvent::Ended => "ended",
            EngineEvent::TimeUpdate => "timeupdate",
        }
    }
}

impl FromStr for EngineEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ready" => Ok(EngineEvent::Ready),
            "loadedmetadata" => Ok(EngineEvent::LoadedMetadata),
            "loadeddata" => Ok(EngineEvent::LoadedData),
            "play" => Ok(EngineEvent::Play),
            "pause" => Ok(EngineEvent::Pause),
            "ended" => Ok(EngineEvent::Ended),
            "timeupdate" => Ok(EngineEvent::TimeUpdate),
            other => Err(Error::UnknownEvent(other.to_string())),
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start position requested by the caller, in seconds
///
/// Missing, negative and non-finite values all collapse to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeekTarget(f64);

impl SeekTarget {
    pub fn new(seconds: f64) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            Self(seconds)
        } else {
            Self(0.0)
        }
    }

    pub fn from_option(seconds: Option<f64>) -> Self {
        seconds.map(Self::new).unwrap_or_default()
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse() {
        let ratio: AspectRatio = "16:9".parse().unwrap();
        assert_eq!(ratio, AspectRatio::WIDESCREEN);
        assert_eq!(" 4 : 3 ".parse::<AspectRatio>().unwrap(), AspectRatio::STANDARD);
        assert_eq!(ratio.to_string(), "16:9");
    }

    #[test]
    fn test_aspect_ratio_invalid() {
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert!("0:9".parse::<AspectRatio>().is_err());
        assert!("16:".parse::<AspectRatio>().is_err());
        assert!(AspectRatio::new(1, 0).is_err());
    }

    #[test]
    fn test_control_strings() {
        for control in Control::ALL {
            assert_eq!(control.as_str().parse::<Control>().unwrap(), control);
        }
        assert!(matches!(
            "big-play".parse::<Control>(),
            Err(Error::UnknownControl(_))
        ));
    }

    #[test]
    fn test_control_serde() {
        let json = serde_json::to_string(&[Control::PlayLarge, Control::DisableContextMenu]).unwrap();
        assert_eq!(json, r#"["play-large","disableContextMenu"]"#);

        let parsed: Vec<Control> = serde_json::from_str(r#"["pip","current-time"]"#).unwrap();
        assert_eq!(parsed, vec![Control::Pip, Control::CurrentTime]);
        assert!(serde_json::from_str::<Vec<Control>>(r#"["nope"]"#).is_err());
    }

    #[test]
    fn test_engine_event_names() {
        assert_eq!(EngineEvent::LoadedMetadata.as_str(), "loadedmetadata");
        assert_eq!("ready".parse::<EngineEvent>().unwrap(), EngineEvent::Ready);
        assert!("seeked".parse::<EngineEvent>().is_err());
    }

    #[test]
    fn test_seek_target_normalizes() {
        assert_eq!(SeekTarget::from_option(None).seconds(), 0.0);
        assert_eq!(SeekTarget::new(42.0).seconds(), 42.0);
        assert_eq!(SeekTarget::new(-3.0).seconds(), 0.0);
        assert_eq!(SeekTarget::new(f64::NAN).seconds(), 0.0);
    }
}
