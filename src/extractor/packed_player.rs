use super::{Extractor, unpack};
use crate::{
    Result,
    provider::HttpClient,
    types::{ResolvedStreams, SkipReason, StreamCandidate, StreamKind},
};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

/// `sources:[{file:"https://.../master.m3u8"}]`
static FILE_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"file\s*:\s*"([^"]+)""#).expect("valid file regex"));

/// `{hls2:"https://.../master.m3u8?t=..."}`
static QUOTED_M3U8: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#":\s*"([^"]*?m3u8[^"]*?)""#).expect("valid m3u8 regex"));

/// Which player script layout a hoster uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedFlavor {
    /// JW player setup with `file:"..."` sources
    Supervideo,
    /// Source map whose values are quoted HLS URLs
    StreamWish,
}

/// Hoster whose player config sits in a (usually packed) inline script
pub struct PackedPlayer {
    name: String,
    main_url: String,
    flavor: PackedFlavor,
}

impl PackedPlayer {
    pub fn new(name: impl Into<String>, main_url: impl Into<String>, flavor: PackedFlavor) -> Self {
        Self {
            name: name.into(),
            main_url: main_url.into(),
            flavor,
        }
    }

    fn embed_url(&self, url: &str) -> String {
        match self.flavor {
            // download pages embed the player under /e/
            PackedFlavor::Supervideo if !url.contains("/e/") && !url.contains("/embed-") => {
                let id = url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
                format!("{}/e/{id}", self.main_url)
            }
            _ => url.to_string(),
        }
    }
}

/// Collect stream URLs from an unpacked player script
pub(crate) fn scan_sources(script: &str, flavor: PackedFlavor) -> Vec<String> {
    let pattern = match flavor {
        PackedFlavor::Supervideo => &*FILE_SOURCE,
        PackedFlavor::StreamWish => &*QUOTED_M3U8,
    };

    let mut urls: Vec<String> = Vec::new();
    for caps in pattern.captures_iter(script) {
        let url = caps[1].replace("\\/", "/");
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

#[async_trait]
impl Extractor for PackedPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn main_url(&self) -> &str {
        &self.main_url
    }

    async fn extract(
        &self,
        client: &HttpClient,
        url: &str,
        referer: Option<&str>,
    ) -> Result<ResolvedStreams> {
        let embed = self.embed_url(url);
        let referer = referer.unwrap_or(&self.main_url);
        let body = client
            .get_text_with(&embed, &[("Referer", referer)])
            .await?;

        let script = unpack::unpack_or_source(&body);
        let mut resolved = ResolvedStreams::new();

        for source in scan_sources(&script, self.flavor) {
            let source = if source.starts_with('/') && !source.starts_with("//") {
                format!("{}{source}", self.main_url)
            } else {
                source
            };

            match StreamKind::classify(&source) {
                StreamKind::Embedded if source.contains("m3u8") => resolved.push_stream(
                    StreamCandidate::new(&source, &self.name)
                        .with_kind(StreamKind::Hls)
                        .with_referer(Some(format!("{}/", self.main_url))),
                ),
                StreamKind::Embedded => {
                    // thumbnails and caption tracks also use `file:`
                    if source.ends_with(".vtt") || source.ends_with(".srt") {
                        continue;
                    }
                    resolved.skip(
                        source,
                        SkipReason::UnsupportedFormat("unrecognized player source".to_string()),
                    );
                }
                kind => resolved.push_stream(
                    StreamCandidate::new(&source, &self.name)
                        .with_kind(kind)
                        .with_referer(Some(format!("{}/", self.main_url))),
                ),
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_supervideo_sources() {
        let script = r#"jwplayer("vplayer").setup({sources:[{file:"https://s1.example/hls/x/master.m3u8"}],image:"https://s1.example/i.jpg"});"#;
        assert_eq!(
            scan_sources(script, PackedFlavor::Supervideo),
            vec!["https://s1.example/hls/x/master.m3u8"]
        );
    }

    #[test]
    fn test_scan_streamwish_sources() {
        let script = r#"var links={"hls4":"/stream/abc/master.m3u8","hls2":"https:\/\/cdn.example\/x\/master.m3u8?t=1","hls4":"/stream/abc/master.m3u8"};"#;
        assert_eq!(
            scan_sources(script, PackedFlavor::StreamWish),
            vec![
                "/stream/abc/master.m3u8",
                "https://cdn.example/x/master.m3u8?t=1"
            ]
        );
    }

    #[test]
    fn test_embed_url() {
        let player = PackedPlayer::new("Supervideo", "https://supervideo.cc", PackedFlavor::Supervideo);
        assert_eq!(player.embed_url("https://supervideo.cc/abc123"), "https://supervideo.cc/e/abc123");
        assert_eq!(player.embed_url("https://supervideo.cc/e/abc123"), "https://supervideo.cc/e/abc123");
    }
}
