use super::Extractor;
use crate::{
    Error, Result,
    provider::{HttpClient, html},
    types::{ResolvedStreams, StreamCandidate},
};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static SOURCE: LazyLock<Selector> = LazyLock::new(|| html::selector("source[src]"));

pub struct Vidoza {
    name: String,
    main_url: String,
}

impl Vidoza {
    pub fn new(name: impl Into<String>, main_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_url: main_url.into(),
        }
    }
}

/// `src` and optional `res` of the first `<source>` element
pub(crate) fn find_source(body: &str) -> Option<(String, Option<u32>)> {
    let document = Html::parse_document(body);
    let source = document.select(&SOURCE).next()?;

    let url = html::attr(source, "src")?;
    let quality = html::attr(source, "res").and_then(|r| r.parse().ok());
    Some((url, quality))
}

#[async_trait]
impl Extractor for Vidoza {
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
        let body = client.get_text(url).await?;
        let (source, quality) =
            find_source(&body).ok_or_else(|| Error::Parse(format!("no <source> at {url}")))?;

        let mut resolved = ResolvedStreams::new();
        resolved.push_stream(StreamCandidate::new(source, &self.name).with_quality(quality));

        Ok(resolved)
    }
}
