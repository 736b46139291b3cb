//! Third-party video hoster extractors.
//!
//! Sites link to embedded players on hosters such as VOE or Doodstream.
//! Each hoster family is one [`Extractor`] implementation parameterized by
//! name and main URL; the [`ExtractorRegistry`] picks one by URL prefix.

mod doodstream;
mod mixdrop;
mod packed_player;
pub mod unpack;
mod vidoza;
mod voe;

pub use doodstream::Doodstream;
pub use mixdrop::MixDrop;
pub use packed_player::{PackedFlavor, PackedPlayer};
pub use vidoza::Vidoza;
pub use voe::Voe;

use crate::{
    Result,
    provider::HttpClient,
    types::{ResolvedStreams, SkipReason, StreamCandidate, StreamKind},
};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves a hoster's player page into playable streams
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Display name used in stream labels
    fn name(&self) -> &str;

    /// Base URL, used for matching embed links
    fn main_url(&self) -> &str;

    /// Extract streams from the embed page at `url`
    async fn extract(
        &self,
        client: &HttpClient,
        url: &str,
        referer: Option<&str>,
    ) -> Result<ResolvedStreams>;
}

/// An embedded player link found on a site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedLink {
    pub url: String,
    /// Label for the resulting candidates, usually the hoster name
    pub label: String,
    pub language: Option<String>,
}

impl EmbedLink {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }

    /// Label shown for this link, with the language appended when known
    pub fn display_label(&self) -> String {
        match self.language {
            Some(ref lang) => format!("{} [{lang}]", self.label),
            None => self.label.clone(),
        }
    }
}

/// Static table of hoster extractors
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all built-in hosters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for (name, url) in [
            ("Supervideo", "https://supervideo.cc"),
            ("SupervideoTv", "https://supervideo.tv"),
            ("Dropload", "https://dropload.io"),
            ("Bigwarp", "https://bigwarp.io"),
            ("Ryderjet", "https://ryderjet.com"),
            ("Abstream", "https://abstream.to"),
            ("KinogerBe", "https://kinoger.be"),
        ] {
            registry.add(PackedPlayer::new(name, url, PackedFlavor::Supervideo));
        }

        for (name, url) in [
            ("StreamWish", "https://streamwish.to"),
            ("Luluvdo", "https://luluvdo.com"),
            ("Streamruby", "https://streamruby.com"),
            ("SaveFiles", "https://savefiles.com"),
            ("EarnVids", "https://dhtpre.com"),
            ("EarnVids", "https://peytonepre.com"),
            ("MoflixClick", "https://moflix-stream.click"),
        ] {
            registry.add(PackedPlayer::new(name, url, PackedFlavor::StreamWish));
        }

        for (name, url) in [("Voe", "https://voe.sx"), ("Goofy Banana", "https://goofy-banana.com")] {
            registry.add(Voe::new(name, url));
        }

        for (name, url) in [
            ("DoodStream", "https://dood.la"),
            ("DoodStream", "https://dood.to"),
            ("DoodStream", "https://dood.ws"),
            ("DoodStream", "https://dood.li"),
            ("DoodRe", "https://dood.re"),
            ("DoodsPro", "https://doods.pro"),
            ("Doodster", "https://dooodster.com"),
            ("D000d", "https://d000d.com"),
            ("vide0 (Dood)", "https://vide0.net"),
            ("DSVPlay (Dood)", "https://dsvplay.com"),
        ] {
            registry.add(Doodstream::new(name, url));
        }

        for (name, url) in [
            ("MixDrop", "https://mixdrop.co"),
            ("MixdropPs", "https://mixdrop.ps"),
            ("MixDrop", "https://mixdrop.ag"),
            ("MixDrop", "https://mixdrop.to"),
            ("Mixdrp", "https://mixdrp.to"),
        ] {
            registry.add(MixDrop::new(name, url));
        }

        for (name, url) in [("Vidoza", "https://vidoza.net"), ("Vidoza", "https://videzz.net")] {
            registry.add(Vidoza::new(name, url));
        }

        registry
    }

    /// Add an extractor
    pub fn add<E: Extractor + 'static>(&mut self, extractor: E) {
        self.extractors.push(Arc::new(extractor));
    }

    /// Get all extractors
    pub fn extractors(&self) -> &[Arc<dyn Extractor>] {
        &self.extractors
    }

    /// Find the extractor whose main URL prefixes `url`
    pub fn find(&self, url: &str) -> Option<&Arc<dyn Extractor>> {
        let target = strip_scheme(url);
        self.extractors.iter().find(|e| {
            let base = strip_scheme(e.main_url());
            target
                .strip_prefix(base)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', ':']))
        })
    }

    /// Resolve embed links concurrently; results keep link order.
    ///
    /// Links that already point at media are passed through. Links without
    /// an extractor, or whose extractor fails, are recorded as skipped.
    pub async fn resolve(
        &self,
        client: &HttpClient,
        links: &[EmbedLink],
        referer: Option<&str>,
    ) -> ResolvedStreams {
        let results = join_all(
            links
                .iter()
                .map(|link| self.resolve_link(client, link, referer)),
        )
        .await;

        let mut resolved = ResolvedStreams::new();
        for result in results {
            resolved.extend(result);
        }

        debug!(
            "Resolved {} embed link(s) into {} stream(s), {} skipped",
            links.len(),
            resolved.streams.len(),
            resolved.skipped.len()
        );

        resolved
    }

    async fn resolve_link(
        &self,
        client: &HttpClient,
        link: &EmbedLink,
        referer: Option<&str>,
    ) -> ResolvedStreams {
        let mut resolved = ResolvedStreams::new();

        if StreamKind::classify(&link.url).is_playable() {
            resolved.push_stream(
                StreamCandidate::new(&link.url, link.display_label())
                    .with_language(link.language.clone()),
            );
            return resolved;
        }

        let Some(extractor) = self.find(&link.url) else {
            warn!("No extractor for {}", link.url);
            resolved.skip(&link.url, SkipReason::NoExtractor);
            return resolved;
        };

        match extractor.extract(client, &link.url, referer).await {
            Ok(found) if found.streams.is_empty() => {
                warn!("{} found no sources at {}", extractor.name(), link.url);
                resolved.skip(
                    &link.url,
                    SkipReason::ExtractorFailed(format!("{}: no sources", extractor.name())),
                );
                resolved.subtitles = found.subtitles;
                resolved.skipped.extend(found.skipped);
            }
            Ok(found) => {
                let label = link.display_label();
                for mut stream in found.streams {
                    stream.label = match stream.quality {
                        Some(q) => format!("{label} {q}p"),
                        None => label.clone(),
                    };
                    if link.language.is_some() {
                        stream.language = link.language.clone();
                    }
                    resolved.push_stream(stream);
                }
                resolved.subtitles = found.subtitles;
                resolved.skipped = found.skipped;
            }
            Err(e) => {
                warn!("{} failed for {}: {}", extractor.name(), link.url, e);
                resolved.skip(
                    &link.url,
                    SkipReason::ExtractorFailed(format!("{}: {e}", extractor.name())),
                );
            }
        }

        resolved
    }
}

fn strip_scheme(url: &str) -> &str {
    let url = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest);
    url.strip_prefix("www.").unwrap_or(url)
}

/// Origin (`scheme://host[:port]`) of a URL
pub(crate) fn origin(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    Some(parsed.origin().ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hoster whose player only offers a DRM-protected source
    struct DrmOnly;

    #[async_trait]
    impl Extractor for DrmOnly {
        fn name(&self) -> &str {
            "DrmOnly"
        }

        fn main_url(&self) -> &str {
            "https://drm.example"
        }

        async fn extract(
            &self,
            _client: &HttpClient,
            url: &str,
            _referer: Option<&str>,
        ) -> Result<ResolvedStreams> {
            let mut found = ResolvedStreams::new();
            found.skip(
                format!("{url}/master.mpd"),
                SkipReason::UnsupportedFormat("drm".into()),
            );
            Ok(found)
        }
    }

    #[test]
    fn test_find_by_prefix() {
        let registry = ExtractorRegistry::with_defaults();

        let voe = registry.find("https://voe.sx/e/abc123").unwrap();
        assert_eq!(voe.name(), "Voe");

        let dood = registry.find("https://www.dood.li/d/xyz").unwrap();
        assert_eq!(dood.name(), "DoodStream");

        assert!(registry.find("https://dood.land/e/xyz").is_none());
        assert!(registry.find("https://unknown.example/e/1").is_none());
    }

    #[test]
    fn test_display_label() {
        let link = EmbedLink::new("https://voe.sx/e/1", "VOE").with_language(Some("Deutsch".into()));
        assert_eq!(link.display_label(), "VOE [Deutsch]");
        assert_eq!(EmbedLink::new("x", "VOE").display_label(), "VOE");
    }

    #[tokio::test]
    async fn test_resolve_accounts_for_unknown_hosts() {
        let registry = ExtractorRegistry::new();
        let client = HttpClient::new().unwrap();
        let links = vec![
            EmbedLink::new("https://cdn.example/movie.mp4", "Direct"),
            EmbedLink::new("https://unknown.example/e/1", "Unknown"),
        ];

        let resolved = registry.resolve(&client, &links, None).await;

        assert_eq!(resolved.streams.len(), 1);
        assert_eq!(resolved.streams[0].label, "Direct");
        assert_eq!(resolved.skipped.len(), 1);
        assert_eq!(resolved.skipped[0].reason, SkipReason::NoExtractor);
    }

    #[tokio::test]
    async fn test_empty_extraction_keeps_extractor_skips() {
        let mut registry = ExtractorRegistry::new();
        registry.add(DrmOnly);
        let client = HttpClient::new().unwrap();
        let links = vec![EmbedLink::new("https://drm.example/e/1", "Drm")];

        let resolved = registry.resolve(&client, &links, None).await;

        assert!(resolved.streams.is_empty());
        let urls: Vec<_> = resolved.skipped.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://drm.example/e/1", "https://drm.example/e/1/master.mpd"]
        );
        assert_eq!(
            resolved.skipped[1].reason,
            SkipReason::UnsupportedFormat("drm".into())
        );
    }
}
