use super::api_types::{DataResponse, WatchResponse};
use crate::{
    Error, Result,
    extractor::{EmbedLink, ExtractorRegistry},
    provider::{HttpClient, LoadToken, SiteAdapter, html::host_label},
    types::{CatalogEntry, CatalogPage, Category, ItemDetail, MediaKind, ResolvedStreams},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub const MAIN_URL: &str = "https://einschalten.in";
const ID: &str = "einschalten";

const CATEGORIES: &[Category] = &[Category::new("recent", "Neu")];
const KINDS: &[MediaKind] = &[MediaKind::Movie];

/// Slots per movie in a listing: [_, id, title, release date, poster file, _]
const LISTING_CHUNK: usize = 6;

/// String form of a scalar slot
fn slot_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn slot_year(value: Option<&Value>) -> Option<i32> {
    slot_text(value).and_then(|d| d.get(..4).and_then(|y| y.parse().ok()))
}

/// Adapter for einschalten.in, a SvelteKit site exposing `__data.json`
pub struct EinschaltenAdapter {
    main_url: String,
    client: HttpClient,
    extractors: Arc<ExtractorRegistry>,
}

impl EinschaltenAdapter {
    pub fn new(main_url: String, client: HttpClient, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            main_url,
            client,
            extractors,
        }
    }

    fn poster_url(&self, file: Option<String>) -> Option<String> {
        file.map(|f| format!("{}/images/poster/{}", self.main_url, f))
    }

    /// Movies follow the first nested array, six slots each
    fn to_entries(&self, response: DataResponse) -> Vec<CatalogEntry> {
        let values = response.data_values();
        let start = values
            .iter()
            .position(Value::is_array)
            .map_or(0, |i| i + 1);

        values[start..]
            .chunks(LISTING_CHUNK)
            .filter_map(|chunk| {
                let id = slot_text(chunk.get(1))?;
                let title = slot_text(chunk.get(2))?;
                let entry = CatalogEntry::new(format!("{}/movies/{}", self.main_url, id), title, ID)?
                    .with_year(slot_year(chunk.get(3)))
                    .with_poster(self.poster_url(slot_text(chunk.get(4))));
                Some(entry)
            })
            .collect()
    }

    /// Detail slots after the leading schema objects:
    /// [_, title, _, plot, release date, runtime, poster file]
    fn to_detail(&self, id: &str, response: DataResponse) -> Result<ItemDetail> {
        let values: Vec<Value> = response
            .data_values()
            .into_iter()
            .skip_while(Value::is_object)
            .collect();

        let title = slot_text(values.get(1))
            .ok_or_else(|| Error::Parse(format!("{ID}: no title in data of {id}")))?;

        let mut detail = ItemDetail::new(id, title, MediaKind::Movie, ID);
        detail.plot = slot_text(values.get(3));
        detail.year = slot_year(values.get(4));
        detail.duration_minutes = values
            .get(5)
            .and_then(Value::as_i64)
            .map(|m| m as i32);
        detail.poster_url = self.poster_url(slot_text(values.get(6)));

        Ok(detail)
    }

    fn movie_id<'a>(&self, id: &'a str) -> Result<&'a str> {
        id.strip_prefix(&self.main_url)
            .and_then(|rest| rest.strip_prefix("/movies/"))
            .filter(|m| !m.is_empty() && !m.contains('/'))
            .ok_or_else(|| Error::InvalidId(id.to_string()))
    }
}

#[async_trait]
impl SiteAdapter for EinschaltenAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        "Einschalten"
    }

    fn supported_kinds(&self) -> &[MediaKind] {
        KINDS
    }

    fn categories(&self) -> &[Category] {
        CATEGORIES
    }

    async fn list_category(&self, token: &str, page: u32) -> Result<CatalogPage> {
        self.category(token)?;
        info!("{ID}: listing {} page {}", token, page);

        if page > 1 {
            return Ok(CatalogPage::end());
        }

        let response: DataResponse = self
            .client
            .get_json(&format!("{}/__data.json", self.main_url))
            .await?;

        Ok(CatalogPage::new(self.to_entries(response), false))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        info!("{ID}: searching {:?}", query);

        let response: DataResponse = self
            .client
            .get_json(&format!(
                "{}/__data.json?query={}",
                self.main_url,
                urlencoding::encode(query)
            ))
            .await?;

        Ok(self.to_entries(response))
    }

    async fn load_item(&self, id: &str) -> Result<ItemDetail> {
        let movie_id = self.movie_id(id)?;
        info!("{ID}: loading {}", id);

        let response: DataResponse = self.client.get_json(&format!("{id}/__data.json")).await?;
        let detail = self.to_detail(id, response)?;

        Ok(detail.with_load_data(LoadToken::encode(ID, movie_id.to_string())?))
    }

    async fn resolve_streams(&self, load_data: &str) -> Result<ResolvedStreams> {
        let movie_id: String = LoadToken::decode(ID, load_data)?;

        let watch: WatchResponse = self
            .client
            .get_json(&format!("{}/api/movies/{}/watch", self.main_url, movie_id))
            .await?;
        if watch.stream_url.trim().is_empty() {
            debug!("{ID}: movie {} has no stream yet", movie_id);
            return Ok(ResolvedStreams::new());
        }

        let label = if watch.release_name.trim().is_empty() {
            host_label(&watch.stream_url)
        } else {
            watch.release_name
        };
        let links = [EmbedLink::new(watch.stream_url, label)];
        let referer = format!("{}/", self.main_url);

        self.extractors
            .resolve(&self.client, &links, Some(referer.as_str()))
            .await
            .require_streams(links.len(), ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter() -> EinschaltenAdapter {
        EinschaltenAdapter::new(
            MAIN_URL.to_string(),
            HttpClient::new().unwrap(),
            Arc::new(ExtractorRegistry::new()),
        )
    }

    #[test]
    fn test_listing_chunks() {
        let response: DataResponse = serde_json::from_value(json!({
            "type": "data",
            "nodes": [
                {"type": "skip"},
                {"type": "data", "data": [
                    {"movies": 1}, [2, 8],
                    {"id": 3}, 1022789, "Alles steht Kopf 2", "2024-06-12", "inside.jpg", null, 7.6,
                    {"id": 3}, "533535", "Deadpool & Wolverine", "2024-07-24", "dp.jpg", 7.7
                ]}
            ]
        }))
        .unwrap();

        let entries = adapter().to_entries(response);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "https://einschalten.in/movies/1022789");
        assert_eq!(entries[0].year, Some(2024));
        assert_eq!(
            entries[0].poster_url.as_deref(),
            Some("https://einschalten.in/images/poster/inside.jpg")
        );
        assert_eq!(entries[1].title, "Deadpool & Wolverine");
    }

    #[test]
    fn test_detail_slots() {
        let response: DataResponse = serde_json::from_value(json!({
            "nodes": [{"type": "data", "data": [
                {"movie": 1}, {"id": 2},
                533535, "Deadpool & Wolverine", "en", "Wade kehrt zurück.", "2024-07-24", 128, "dp.jpg"
            ]}]
        }))
        .unwrap();

        let a = adapter();
        let detail = a
            .to_detail("https://einschalten.in/movies/533535", response)
            .unwrap();
        assert_eq!(detail.title, "Deadpool & Wolverine");
        assert_eq!(detail.plot.as_deref(), Some("Wade kehrt zurück."));
        assert_eq!(detail.year, Some(2024));
        assert_eq!(detail.duration_minutes, Some(128));
    }

    #[test]
    fn test_movie_id() {
        let a = adapter();
        assert_eq!(a.movie_id("https://einschalten.in/movies/42").unwrap(), "42");
        assert!(matches!(
            a.movie_id("https://other.site/movies/42"),
            Err(Error::InvalidId(_))
        ));
    }
}
