//! Media source resolution
//!
//! Builds the immutable [`PlaybackSource`] handed to the engine. The poster
//! goes through the CDN resolver; when that fails the video URI itself is
//! used, so the engine always has something to show before playback.

use crate::cdn::CdnResolver;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Kind of media a source carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Video,
}

/// A resolved source ready to bind to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSource {
    pub uri: String,
    pub media_type: MediaType,
    pub poster: String,
}

impl PlaybackSource {
    /// Build a source, resolving the poster through `cdn`
    pub fn resolve(uri: &str, raw_poster: &str, cdn: &dyn CdnResolver) -> Self {
        Self {
            uri: uri.to_string(),
            media_type: MediaType::Video,
            poster: resolve_poster(uri, raw_poster, cdn),
        }
    }

    /// Source object in the shape the Plyr engine expects
    pub fn to_plyr(&self) -> Value {
        json!({
            "type": self.media_type,
            "sources": [{ "src": self.uri, "provider": "html5" }],
            "poster": self.poster,
        })
    }
}

/// Resolve a poster URL, falling back to the video source on failure
pub fn resolve_poster(source_uri: &str, raw_poster: &str, cdn: &dyn CdnResolver) -> String {
    match cdn.rewrite(raw_poster) {
        Some(poster) if !poster.is_empty() => poster,
        _ => {
            debug!(poster = raw_poster, "Poster not resolvable, using video source");
            source_uri.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdn::{ImageCdn, NoCdn};

    #[test]
    fn test_resolve_through_cdn() {
        let source = PlaybackSource::resolve(
            "https://cdn.example/video.mp4",
            "https://example.com/poster.jpg",
            &ImageCdn::default(),
        );
        assert_eq!(
            source.poster,
            "https://ik.imagekit.io/lenstube/https://example.com/poster.jpg"
        );
        assert_eq!(source.media_type, MediaType::Video);
    }

    #[test]
    fn test_resolve_falls_back_to_source() {
        let poster = resolve_poster("https://cdn.example/v.mp4", "", &NoCdn);
        assert_eq!(poster, "https://cdn.example/v.mp4");

        let empty = |_: &str| Some(String::new());
        let poster = resolve_poster("https://cdn.example/v.mp4", "https://x/p.png", &empty);
        assert_eq!(poster, "https://cdn.example/v.mp4");
    }

    #[test]
    fn test_plyr_shape() {
        let source = PlaybackSource::resolve("https://v/a.mp4", "https://p/a.png", &NoCdn);
        let value = source.to_plyr();
        assert_eq!(value["type"], "video");
        assert_eq!(value["sources"][0]["src"], "https://v/a.mp4");
        assert_eq!(value["sources"][0]["provider"], "html5");
        assert_eq!(value["poster"], "https://p/a.png");
    }
}
