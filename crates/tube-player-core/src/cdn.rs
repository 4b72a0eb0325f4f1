//! Image CDN URL rewriting
//!
//! Posters are stored as raw `ipfs://`, `ar://` or `https://` URLs on the
//! publication. Before they reach the player they are rewritten to go through
//! the image CDN, which resizes and caches them.

use crate::Result;
use serde::{Deserialize, Serialize};
use url::Url;

/// Rewrites raw asset URLs to their CDN equivalent
pub trait CdnResolver {
    /// Returns `None` when the input cannot be rewritten
    fn rewrite(&self, url: &str) -> Option<String>;
}

impl<F> CdnResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn rewrite(&self, url: &str) -> Option<String> {
        self(url)
    }
}

/// Image CDN configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    /// CDN endpoint that proxies external images
    pub base_url: String,
    /// Gateway used for `ipfs://` URLs
    pub ipfs_gateway: String,
    /// Gateway used for `ar://` URLs
    pub arweave_gateway: String,
    /// Named transformation applied by the CDN (e.g. `thumbnail`)
    pub transform: Option<String>,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ik.imagekit.io/lenstube".to_string(),
            ipfs_gateway: "https://gateway.ipfscdn.io/ipfs/".to_string(),
            arweave_gateway: "https://arweave.net/".to_string(),
            transform: None,
        }
    }
}

/// CDN resolver that proxies posters through an image CDN
#[derive(Debug, Clone)]
pub struct ImageCdn {
    base: Url,
    ipfs_gateway: String,
    arweave_gateway: String,
    transform: Option<String>,
}

impl ImageCdn {
    pub fn new(config: CdnConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)?;
        Ok(Self {
            base,
            ipfs_gateway: ensure_trailing_slash(config.ipfs_gateway),
            arweave_gateway: ensure_trailing_slash(config.arweave_gateway),
            transform: config.transform.filter(|t| !t.is_empty()),
        })
    }

    /// Use a named CDN transformation
    pub fn with_transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }

    /// Resolve decentralized storage schemes to an http(s) gateway URL
    pub fn sanitize(&self, raw: &str) -> Option<Url> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let resolved = if let Some(hash) = raw.strip_prefix("ipfs://") {
            format!("{}{}", self.ipfs_gateway, hash.trim_start_matches("ipfs/"))
        } else if let Some(id) = raw.strip_prefix("ar://") {
            format!("{}{}", self.arweave_gateway, id)
        } else {
            raw.to_string()
        };

        let url = Url::parse(&resolved).ok()?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Some(url),
            _ => None,
        }
    }
}

impl Default for ImageCdn {
    fn default() -> Self {
        let config = CdnConfig::default();
        Self {
            base: Url::parse(&config.base_url).expect("default CDN base URL is valid"),
            ipfs_gateway: config.ipfs_gateway,
            arweave_gateway: config.arweave_gateway,
            transform: None,
        }
    }
}

impl CdnResolver for ImageCdn {
    fn rewrite(&self, url: &str) -> Option<String> {
        let target = self.sanitize(url)?;
        let base = self.base.as_str().trim_end_matches('/');
        let rewritten = match &self.transform {
            Some(transform) => format!("{}/tr:n-{}/{}", base, transform, target),
            None => format!("{}/{}", base, target),
        };
        Some(rewritten)
    }
}

/// Resolver that leaves URLs untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCdn;

impl CdnResolver for NoCdn {
    fn rewrite(&self, url: &str) -> Option<String> {
        let url = url.trim();
        (!url.is_empty()).then(|| url.to_string())
    }
}

fn ensure_trailing_slash(mut s: String) -> String {
    if !s.ends_with('/') {
        s.push('/');
    }
    s
}
