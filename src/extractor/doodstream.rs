use super::{Extractor, origin};
use crate::{
    Error, Result,
    provider::HttpClient,
    types::{ResolvedStreams, StreamCandidate, StreamKind},
};
use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};
use regex::Regex;
use std::sync::LazyLock;

static PASS_MD5: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/pass_md5/[^'\x22\s]+").expect("valid pass_md5 regex"));

/// Doodstream and its many domains
pub struct Doodstream {
    name: String,
    main_url: String,
}

impl Doodstream {
    pub fn new(name: impl Into<String>, main_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_url: main_url.into(),
        }
    }
}

/// Path of the `pass_md5` request in the embed page
pub(crate) fn find_pass_path(body: &str) -> Option<&str> {
    PASS_MD5.find(body).map(|m| m.as_str())
}

/// Final media URL: the pass response, 10 random characters and the token query
pub(crate) fn build_link(prefix: &str, pass_path: &str, random: &str, expiry_millis: i64) -> String {
    let token = pass_path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    format!("{}{random}?token={token}&expiry={expiry_millis}", prefix.trim())
}

#[async_trait]
impl Extractor for Doodstream {
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
        let embed = url.replacen("/d/", "/e/", 1);
        let body = client.get_text(&embed).await?;

        let pass_path = find_pass_path(&body)
            .ok_or_else(|| Error::Parse(format!("no pass_md5 in {embed}")))?
            .to_string();
        let host = origin(&embed).unwrap_or_else(|| self.main_url.clone());

        let prefix = client
            .get_text_with(&format!("{host}{pass_path}"), &[("Referer", embed.as_str())])
            .await?;

        let random: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let link = build_link(
            &prefix,
            &pass_path,
            &random,
            chrono::Utc::now().timestamp_millis(),
        );

        let mut resolved = ResolvedStreams::new();
        resolved.push_stream(
            StreamCandidate::new(link, &self.name)
                .with_kind(StreamKind::File)
                .with_referer(Some(format!("{host}/"))),
        );

        Ok(resolved)
    }
}
