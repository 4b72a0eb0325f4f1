//! Publication metadata as returned by the social-graph API
//!
//! Mirrors the `MetadataFields` GraphQL fragment. Only the parts the player
//! needs are interpreted; the rest is carried for callers that want it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Metadata attached to a publication
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub content_warning: Option<String>,
    pub tags: Vec<String>,
    pub cover: Option<MediaSet>,
    pub media: Vec<MediaSet>,
    pub attributes: Vec<MetadataAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSet {
    pub original: Media,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl Media {
    pub fn is_video(&self) -> bool {
        self.mime_type
            .as_deref()
            .map(|m| m.starts_with("video/"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataAttribute {
    pub trait_type: Option<String>,
    pub value: Option<String>,
}

impl PublicationMetadata {
    /// Parse from the JSON of a `MetadataFields` fragment
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The media item to play: the first video, else the first media.
    /// Entries without a URL are skipped.
    pub fn playable_media(&self) -> Result<&Media> {
        let mut candidates = self
            .media
            .iter()
            .map(|m| &m.original)
            .filter(|m| !m.url.trim().is_empty());

        candidates
            .clone()
            .find(|m| m.is_video())
            .or_else(|| candidates.next())
            .ok_or(Error::NoPlayableMedia)
    }

    /// Cover image URL, empty when the publication has none
    pub fn cover_url(&self) -> &str {
        self.cover
            .as_ref()
            .map(|c| c.original.url.as_str())
            .unwrap_or("")
    }

    /// Look up an attribute value by trait type
    pub fn attribute(&self, trait_type: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.trait_type.as_deref() == Some(trait_type))
            .and_then(|a| a.value.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "Sunset timelapse",
        "description": "Shot on the pier",
        "content": "Shot on the pier",
        "contentWarning": null,
        "tags": ["timelapse"],
        "cover": { "original": { "url": "ipfs://bafycover" } },
        "media": [
            { "original": { "url": "ipfs://bafythumb", "mimeType": "image/jpeg" } },
            { "original": { "url": "ipfs://bafyvideo", "mimeType": "video/mp4" } }
        ],
        "attributes": [
            { "traitType": "durationInSeconds", "value": "62.5" },
            { "traitType": "handle", "value": "sunset.lens" }
        ]
    }"#;

    #[test]
    fn test_parse_fragment() {
        let meta = PublicationMetadata::from_json(SAMPLE).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Sunset timelapse"));
        assert_eq!(meta.tags, vec!["timelapse"]);
        assert_eq!(meta.cover_url(), "ipfs://bafycover");
        assert_eq!(meta.attribute("durationInSeconds"), Some("62.5"));
        assert_eq!(meta.attribute("missing"), None);
    }

    #[test]
    fn test_playable_media_prefers_video() {
        let meta = PublicationMetadata::from_json(SAMPLE).unwrap();
        assert_eq!(meta.playable_media().unwrap().url, "ipfs://bafyvideo");
    }

    #[test]
    fn test_playable_media_falls_back_to_first() {
        let meta = PublicationMetadata::from_json(
            r#"{ "media": [ { "original": { "url": "https://x/clip" } } ] }"#,
        )
        .unwrap();
        assert_eq!(meta.playable_media().unwrap().url, "https://x/clip");
    }

    #[test]
    fn test_no_media() {
        let meta = PublicationMetadata::from_json("{}").unwrap();
        assert!(matches!(meta.playable_media(), Err(Error::NoPlayableMedia)));
        assert_eq!(meta.cover_url(), "");
    }

    #[test]
    fn test_playable_media_skips_empty_urls() {
        let meta = PublicationMetadata::from_json(
            r#"{
                "media": [
                    { "original": { "url": " ", "mimeType": "video/mp4" } },
                    { "original": { "url": "https://x/poster.png", "mimeType": "image/png" } },
                    { "original": { "url": "https://x/clip.webm", "mimeType": "video/webm" } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(meta.playable_media().unwrap().url, "https://x/clip.webm");

        let no_video = PublicationMetadata::from_json(
            r#"{
                "media": [
                    { "original": { "url": "" } },
                    { "original": { "url": "https://x/clip" } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(no_video.playable_media().unwrap().url, "https://x/clip");
    }
}
