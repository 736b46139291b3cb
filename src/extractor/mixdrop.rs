use super::{Extractor, unpack};
use crate::{
    Error, Result,
    provider::HttpClient,
    types::{ResolvedStreams, StreamCandidate},
};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static WURL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"MDCore\.wurl\s*=\s*"([^"]+)""#).expect("valid wurl regex"));

pub struct MixDrop {
    name: String,
    main_url: String,
}

impl MixDrop {
    pub fn new(name: impl Into<String>, main_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_url: main_url.into(),
        }
    }
}

/// `MDCore.wurl` of the unpacked player script, made absolute
pub(crate) fn find_wurl(script: &str) -> Option<String> {
    let url = WURL.captures(script)?.get(1)?.as_str();
    Some(match url.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    })
}

#[async_trait]
impl Extractor for MixDrop {
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
        let embed = url.replacen("/f/", "/e/", 1);
        let body = client.get_text(&embed).await?;
        let script = unpack::unpack_or_source(&body);

        let link = find_wurl(&script)
            .ok_or_else(|| Error::Parse(format!("no MDCore.wurl at {embed}")))?;

        let mut resolved = ResolvedStreams::new();
        resolved.push_stream(
            StreamCandidate::new(link, &self.name).with_referer(Some(format!("{}/", self.main_url))),
        );

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_wurl() {
        let script = r#"MDCore.ref="abc";MDCore.wurl="//s-delivery1.mxdcontent.net/v/abc.mp4?s=1";"#;
        assert_eq!(
            find_wurl(script).as_deref(),
            Some("https://s-delivery1.mxdcontent.net/v/abc.mp4?s=1")
        );
        assert_eq!(find_wurl("MDCore.ref=\"abc\";"), None);
    }
}
