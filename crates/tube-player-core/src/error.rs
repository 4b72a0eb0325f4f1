//! Error types for Tube Player Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid aspect ratio: {0}")]
    InvalidAspectRatio(String),

    #[error("Unknown player control: {0}")]
    UnknownControl(String),

    #[error("Unknown engine event: {0}")]
    UnknownEvent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Metadata errors
    #[error("Publication metadata has no playable media")]
    NoPlayableMedia,

    // Engine errors
    #[error("Playback handle is not mounted")]
    NotMounted,

    #[error("Playback handle is already borrowed")]
    HandleBusy,

    #[error("Failed to initialize playback engine: {0}")]
    EngineInit(String),

    // Parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Create an engine initialization error
    pub fn engine(msg: impl Into<String>) -> Self {
        Error::EngineInit(msg.into())
    }

    /// Returns true if retrying on a later render may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NotMounted | Error::HandleBusy | Error::EngineInit(_)
        )
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidAspectRatio(_) => "INVALID_RATIO",
            Error::UnknownControl(_) => "UNKNOWN_CONTROL",
            Error::UnknownEvent(_) => "UNKNOWN_EVENT",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::NoPlayableMedia => "NO_MEDIA",
            Error::NotMounted => "NOT_MOUNTED",
            Error::HandleBusy => "HANDLE_BUSY",
            Error::EngineInit(_) => "ENGINE_INIT",
            Error::Json(_) => "JSON",
            Error::Url(_) => "URL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NotMounted.error_code(), "NOT_MOUNTED");
        assert_eq!(Error::NoPlayableMedia.error_code(), "NO_MEDIA");
        assert_eq!(
            Error::UnknownControl("foo".into()).to_string(),
            "Unknown player control: foo"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::NotMounted.is_recoverable());
        assert!(Error::engine("no surface").is_recoverable());
        assert!(!Error::InvalidAspectRatio("4x3".into()).is_recoverable());
    }
}
