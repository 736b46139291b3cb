use super::Extractor;
use crate::{
    Error, Result,
    provider::HttpClient,
    types::{ResolvedStreams, StreamCandidate, StreamKind},
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static JS_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.location\.href\s*=\s*'(?P<url>[^']+)'").expect("valid redirect regex")
});

static SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"](?P<kind>hls|mp4)['"]\s*:\s*['"](?P<url>[^'"]+)['"]"#)
        .expect("valid source regex")
});

static NODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Node", "(?P<url>[^"]+)"#).expect("valid node regex"));

/// VOE and its rotating mirror domains
pub struct Voe {
    name: String,
    main_url: String,
}

impl Voe {
    pub fn new(name: impl Into<String>, main_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_url: main_url.into(),
        }
    }
}

/// Target of the JavaScript redirect VOE serves instead of the player
pub(crate) fn find_redirect(body: &str) -> Option<String> {
    JS_REDIRECT.captures(body).map(|c| c["url"].to_string())
}

/// Stream URLs in the player page, in page order.
///
/// Values that are not URLs are base64 encoded.
pub(crate) fn find_sources(body: &str) -> Vec<(StreamKind, String)> {
    let mut sources: Vec<(StreamKind, String)> = SOURCE
        .captures_iter(body)
        .filter_map(|c| {
            let kind = if &c["kind"] == "hls" {
                StreamKind::Hls
            } else {
                StreamKind::File
            };
            decode_source(&c["url"]).map(|url| (kind, url))
        })
        .collect();

    if sources.is_empty()
        && let Some(c) = NODE.captures(body)
    {
        let url = c["url"].to_string();
        sources.push((StreamKind::classify(&url), url));
    }

    sources.dedup_by(|a, b| a.1 == b.1);
    sources
}

fn decode_source(value: &str) -> Option<String> {
    if value.starts_with("http") {
        return Some(value.to_string());
    }

    let bytes = STANDARD.decode(value).ok()?;
    String::from_utf8(bytes)
        .ok()
        .filter(|url| url.starts_with("http"))
}

#[async_trait]
impl Extractor for Voe {
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
        _referer: Option<&str>,
    ) -> Result<ResolvedStreams> {
        let mut body = client.get_text(url).await?;

        if let Some(target) = find_redirect(&body) {
            debug!("VOE redirect: {} -> {}", url, target);
            body = client.get_text(&target).await?;
        }

        let sources = find_sources(&body);
        if sources.is_empty() {
            return Err(Error::Parse(format!("no VOE sources at {url}")));
        }

        let mut resolved = ResolvedStreams::new();
        for (kind, source) in sources {
            let kind = if kind.is_playable() { kind } else { StreamKind::File };
            resolved.push_stream(StreamCandidate::new(source, &self.name).with_kind(kind));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_redirect() {
        let body = "<script>window.location.href = 'https://goofy-banana.com/e/abc';</script>";
        assert_eq!(
            find_redirect(body).as_deref(),
            Some("https://goofy-banana.com/e/abc")
        );
        assert_eq!(find_redirect("<html></html>"), None);
    }

    #[test]
    fn test_find_sources_plain_and_base64() {
        let encoded = STANDARD.encode("https://cdn.example/v/master.m3u8");
        let body = format!(
            "var sources = {{'hls': '{encoded}', 'mp4': 'https://cdn.example/v.mp4'}};"
        );

        assert_eq!(
            find_sources(&body),
            vec![
                (StreamKind::Hls, "https://cdn.example/v/master.m3u8".to_string()),
                (StreamKind::File, "https://cdn.example/v.mp4".to_string()),
            ]
        );
    }

    #[test]
    fn test_find_sources_node_fallback() {
        let body = r#"player.src("Node", "https://cdn.example/x.m3u8");"#;
        assert_eq!(
            find_sources(body),
            vec![(StreamKind::Hls, "https://cdn.example/x.m3u8".to_string())]
        );
    }
}
