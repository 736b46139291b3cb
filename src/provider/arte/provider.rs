use super::api_types::{
    CollectionResponse, CollectionZone, PlayerAttributes, PlayerConfigResponse, ResultItem,
    Stream, ZoneContent, ZoneContentResponse, ZonePageResponse,
};
use crate::{
    Error, Result,
    provider::{
        HttpClient, LoadToken, SiteAdapter,
        html::{fix_url, leading_number},
        paging::{PageCursor, collect_pages},
    },
    types::{
        CatalogEntry, CatalogPage, Category, EpisodeRef, ItemDetail, MediaKind, ResolvedStreams,
        StreamCandidate, StreamKind, year_from_date,
    },
};
use async_trait::async_trait;
use futures::future::try_join_all;
use regex::Regex;
use std::{collections::HashSet, sync::LazyLock};
use tracing::{debug, info};

pub const MAIN_URL: &str = "https://www.arte.tv";
pub const API_URL: &str = "https://api.arte.tv";
const ID: &str = "arte";

const CATEGORIES: &[Category] = &[
    Category::new("AVN", "Demnächst"),
    Category::new("CIN", "Filme"),
    Category::new("SER", "Serien"),
    Category::new("HIS", "Geschichte"),
    Category::new("SCI", "Wissenschaft"),
    Category::new("CPO", "Kultur und Pop"),
    Category::new("DEC", "Entdeckung der Welt"),
    Category::new("ACT", "Aktuelles und Gesellschaft"),
];
const KINDS: &[MediaKind] = &[MediaKind::Movie, MediaKind::Series];

/// Zones with fewer items are teasers, not listings
const MIN_ZONE_ITEMS: usize = 5;
const POSTER_SIZE: &str = "380x214";
const TEASER_TEMPLATE: &str = "single-collectionContent";

static PROGRAM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/videos/(.+?)/").expect("valid program id regex"));
static EPISODE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)/\d+\)$").expect("valid episode number regex"));

/// Topic tiles link to topic pages, not to programs
fn is_topic(item: &ResultItem) -> bool {
    item.kind.code == "TOPIC"
}

/// Program id from an item URL such as `/de/videos/RC-014095/title/`
fn program_id(url: &str) -> Option<String> {
    PROGRAM_ID.captures(url).map(|c| c[1].to_string())
}

/// Collections (series) have program ids starting with `RC`
fn is_collection(program_id: &str) -> bool {
    program_id.starts_with("RC")
}

fn poster(item: &ResultItem) -> Option<String> {
    item.main_image
        .as_ref()
        .and_then(|i| i.url.as_deref())
        .map(|url| url.replace("__SIZE__", POSTER_SIZE))
}

/// Episode number from a title ending in "(3/10)"
fn episode_number(title: &str) -> Option<i32> {
    EPISODE_NUMBER
        .captures(title.trim())
        .and_then(|c| c[1].parse().ok())
}

/// Season number from a zone slug such as "staffel-2"
fn season_number(slug: &str) -> Option<i32> {
    slug.rsplit('-').next().and_then(|s| s.parse().ok())
}

/// Label and quality of a player stream
fn stream_label(stream: &Stream) -> (String, Option<u32>) {
    let version = stream
        .versions
        .first()
        .map(|v| {
            if v.label.is_empty() {
                v.short_label.as_str()
            } else {
                v.label.as_str()
            }
        })
        .unwrap_or_default();

    let quality = leading_number(&stream.main_quality.label).and_then(|q| u32::try_from(q).ok());
    let label = [version, stream.main_quality.label.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .fold("Arte".to_string(), |acc, s| format!("{acc} {s}"));

    (label, quality)
}

fn stream_candidate(stream: &Stream) -> StreamCandidate {
    let (label, quality) = stream_label(stream);
    let protocol = stream.protocol.to_ascii_uppercase();
    let kind = if protocol.starts_with("HLS") {
        StreamKind::Hls
    } else if protocol.starts_with("DASH") {
        StreamKind::Dash
    } else {
        StreamKind::classify(&stream.url)
    };

    StreamCandidate::new(&stream.url, label)
        .with_kind(kind)
        .with_quality(quality)
        .with_language(stream.versions.first().map(|v| v.short_label.clone()))
}

/// Adapter for the ARTE media library
pub struct ArteAdapter {
    main_url: String,
    api_url: String,
    client: HttpClient,
}

impl ArteAdapter {
    pub fn new(main_url: String, api_url: String, client: HttpClient) -> Self {
        Self {
            main_url,
            api_url,
            client,
        }
    }

    fn proxy_url(&self) -> String {
        format!("{}/api/rproxy/emac/v4/de/web", self.main_url)
    }

    fn item_to_entry(&self, item: &ResultItem) -> Option<CatalogEntry> {
        let url = fix_url(&self.main_url, &item.url)?;
        let Some(program) = program_id(&url) else {
            debug!("{ID}: skipping {} without program id", url);
            return None;
        };
        let kind = if is_collection(&program) || item.kind.is_collection {
            MediaKind::Series
        } else {
            MediaKind::Movie
        };
        let year = item
            .availability
            .as_ref()
            .and_then(|a| a.start.as_deref())
            .and_then(year_from_date);

        Some(
            CatalogEntry::new(url, &item.title, ID)?
                .with_kind(kind)
                .with_year(year)
                .with_poster(poster(item)),
        )
    }

    /// Flatten listing zones into entries, dropping teasers and topic tiles
    fn zones_to_entries(&self, response: ZonePageResponse) -> Vec<CatalogEntry> {
        let mut seen = HashSet::new();
        response
            .value
            .zones
            .iter()
            .filter_map(|zone| zone.content.as_ref())
            .map(|content| {
                content
                    .data
                    .iter()
                    .filter(|item| !is_topic(item))
                    .collect::<Vec<_>>()
            })
            .filter(|items| items.len() >= MIN_ZONE_ITEMS)
            .flatten()
            .filter_map(|item| self.item_to_entry(item))
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect()
    }

    fn episode_ref(item: &ResultItem, season: Option<i32>) -> Result<Option<EpisodeRef>> {
        let Some(program) = program_id(&item.url).or_else(|| item.program_id.clone()) else {
            debug!("{ID}: skipping episode {:?} without program id", item.title);
            return Ok(None);
        };

        let title = match item.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(subtitle) => format!("{} - {}", item.title, subtitle),
            None => item.title.clone(),
        };

        let mut episode = EpisodeRef::new(LoadToken::encode(ID, program)?)
            .with_numbers(season, episode_number(&item.title))
            .with_title(Some(title));
        episode.plot = item.short_description.clone();
        episode.poster_url = poster(item);
        episode.runtime = item.duration.map(|s| (s / 60) as i32);

        Ok(Some(episode))
    }

    fn zone_page_url(&self, zone_id: &str, program: &str, page: u32) -> String {
        let parts: Vec<&str> = zone_id.split('_').collect();
        let mut url = format!(
            "{}/zones/{}/content?authorizedCountry=DE&page={}&collectionId={}",
            self.proxy_url(),
            parts[0],
            page,
            program
        );
        if parts.len() == 3 {
            url.push_str("&subCollectionId=");
            url.push_str(parts[2]);
        }
        url
    }

    fn cursor(content: &ZoneContent) -> PageCursor {
        content
            .pagination
            .map(|p| PageCursor::new(p.current_page.max(1), p.pages))
            .unwrap_or(PageCursor::new(1, 1))
    }

    /// All episodes of one season zone, following its pagination
    async fn load_season(&self, zone: CollectionZone, program: &str) -> Result<Vec<EpisodeRef>> {
        let season = zone.slug.as_deref().and_then(season_number);
        let first_cursor = Self::cursor(&zone.content);
        let zone_id = zone.id.clone();

        let items = collect_pages((zone.content.data, first_cursor), |page| {
            let url = self.zone_page_url(&zone_id, program, page);
            async move {
                debug!("{ID}: fetching season zone page {}", page);
                let response: ZoneContentResponse = self.client.get_json(&url).await?;
                let cursor = response
                    .value
                    .pagination
                    .map(|p| PageCursor::new(p.current_page, p.pages))
                    .unwrap_or(PageCursor::new(page, page));
                Ok::<_, Error>((response.value.data, cursor))
            }
        })
        .await?;

        let mut episodes = Vec::with_capacity(items.len());
        for item in &items {
            if let Some(episode) = Self::episode_ref(item, season)? {
                episodes.push(episode);
            }
        }
        Ok(episodes)
    }

    async fn load_series(&self, url: &str, program: &str) -> Result<ItemDetail> {
        let response: CollectionResponse = self
            .client
            .get_json(&format!("{}/collections/{}", self.proxy_url(), program))
            .await?;
        let collection = response.value;

        let seasons = collection
            .zones
            .into_iter()
            .filter(|zone| zone.display_options.template != TEASER_TEMPLATE)
            .map(|zone| self.load_season(zone, program));
        let episodes = try_join_all(seasons)
            .await?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        if collection.metadata.title.trim().is_empty() {
            return Err(Error::NotFound(format!("{ID}: collection {program}")));
        }

        let mut detail = ItemDetail::new(url, &collection.metadata.title, MediaKind::Series, ID);
        detail.plot = collection.metadata.description;
        detail.poster_url = collection.metadata.og.image.url;
        detail.coming_soon = episodes.is_empty();

        Ok(detail.with_episodes(episodes))
    }

    async fn player_config(&self, program: &str) -> Result<PlayerAttributes> {
        let response: PlayerConfigResponse = self
            .client
            .get_json(&format!(
                "{}/api/player/v2/config/de/{}",
                self.api_url, program
            ))
            .await?;
        Ok(response.data.attributes)
    }

    async fn load_movie(&self, url: &str, program: &str) -> Result<ItemDetail> {
        let attributes = self.player_config(program).await?;
        let metadata = attributes.metadata;
        if metadata.title.trim().is_empty() {
            return Err(Error::NotFound(format!("{ID}: program {program}")));
        }

        let mut detail = ItemDetail::new(url, &metadata.title, MediaKind::Movie, ID);
        detail.plot = metadata.description;
        detail.poster_url = metadata.images.into_iter().find_map(|i| i.url);
        detail.duration_minutes = Some((metadata.duration.seconds / 60) as i32)
            .filter(|&m| m > 0);
        detail.year = attributes
            .rights
            .and_then(|r| r.begin)
            .as_deref()
            .and_then(year_from_date);
        detail.coming_soon = attributes.streams.is_empty();

        Ok(detail.with_load_data(LoadToken::encode(ID, program.to_string())?))
    }
}

#[async_trait]
impl SiteAdapter for ArteAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        "Arte"
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

        let response: ZonePageResponse = self
            .client
            .get_json(&format!("{}/pages/{}", self.proxy_url(), token))
            .await?;

        Ok(CatalogPage::new(self.zones_to_entries(response), false))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        info!("{ID}: searching {:?}", query);

        let page: ZonePageResponse = self
            .client
            .get_json(&format!("{}/pages/SEARCH", self.proxy_url()))
            .await?;
        let Some(zone) = page.value.zones.first() else {
            debug!("{ID}: search page has no zones");
            return Ok(Vec::new());
        };

        let response: ZoneContentResponse = self
            .client
            .get_json(&format!(
                "{}/zones/{}/content?authorizedCountry=DE&page=1&query={}",
                self.proxy_url(),
                zone.id,
                urlencoding::encode(query)
            ))
            .await?;

        Ok(response
            .value
            .data
            .iter()
            .filter(|item| !is_topic(item))
            .filter_map(|item| self.item_to_entry(item))
            .collect())
    }

    async fn load_item(&self, id: &str) -> Result<ItemDetail> {
        let program = program_id(id).ok_or_else(|| Error::InvalidId(id.to_string()))?;
        info!("{ID}: loading {}", program);

        if is_collection(&program) {
            self.load_series(id, &program).await
        } else {
            self.load_movie(id, &program).await
        }
    }

    async fn resolve_streams(&self, load_data: &str) -> Result<ResolvedStreams> {
        let program: String = LoadToken::decode(ID, load_data)?;
        let attributes = self.player_config(&program).await?;

        let mut resolved = ResolvedStreams::new();
        for stream in attributes.streams.iter().filter(|s| !s.url.is_empty()) {
            resolved.push_stream(stream_candidate(stream));
        }

        // a program without streams is announced but not yet online
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter() -> ArteAdapter {
        ArteAdapter::new(
            MAIN_URL.to_string(),
            API_URL.to_string(),
            HttpClient::new().unwrap(),
        )
    }

    fn item(url: &str, title: &str, code: &str) -> serde_json::Value {
        json!({
            "id": url,
            "title": title,
            "url": url,
            "kind": {"code": code, "isCollection": false},
            "mainImage": {"url": "https://api-cdn.arte.tv/img/__SIZE__.jpg"},
            "availability": {"start": "2023-04-01T04:00:00Z"}
        })
    }

    #[test]
    fn test_program_id() {
        assert_eq!(
            program_id("https://www.arte.tv/de/videos/RC-014095/die-serie/").as_deref(),
            Some("RC-014095")
        );
        assert_eq!(program_id("https://www.arte.tv/de/"), None);
        assert!(is_collection("RC-014095"));
        assert!(!is_collection("103484-001-A"));
    }

    #[test]
    fn test_episode_and_season_numbers() {
        assert_eq!(episode_number("Die Nordsee (3/10)"), Some(3));
        assert_eq!(episode_number("Ohne Nummer"), None);
        assert_eq!(season_number("staffel-2"), Some(2));
        assert_eq!(season_number("trailer"), None);
    }

    #[test]
    fn test_zones_to_entries_skips_small_zones_and_topics() {
        let big: Vec<_> = (0..5)
            .map(|i| item(&format!("/de/videos/1000{i}-000-A/film/"), &format!("Film {i}"), "SHOW"))
            .chain([item("/de/videos/RC-1/thema/", "Thema", "TOPIC")])
            .collect();
        let small = vec![item("/de/videos/2000-000-A/teaser/", "Teaser", "SHOW")];

        let response: ZonePageResponse = serde_json::from_value(json!({
            "value": {"zones": [
                {"id": "a", "content": {"data": big}},
                {"id": "b", "content": {"data": small}},
                {"id": "c", "content": null}
            ]}
        }))
        .unwrap();

        let entries = adapter().zones_to_entries(response);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].id, "https://www.arte.tv/de/videos/10000-000-A/film/");
        assert_eq!(entries[0].year, Some(2023));
        assert_eq!(
            entries[0].poster_url.as_deref(),
            Some("https://api-cdn.arte.tv/img/380x214.jpg")
        );
    }

    #[test]
    fn test_topics_do_not_count_toward_zone_size() {
        let shows: Vec<_> = (0..4)
            .map(|i| item(&format!("/de/videos/3000{i}-000-A/doku/"), &format!("Doku {i}"), "SHOW"))
            .chain([item("/de/videos/RC-2/thema/", "Thema", "TOPIC")])
            .collect();

        let response: ZonePageResponse = serde_json::from_value(json!({
            "value": {"zones": [{"id": "a", "content": {"data": shows}}]}
        }))
        .unwrap();

        assert!(adapter().zones_to_entries(response).is_empty());
    }

    #[test]
    fn test_zone_page_url_with_sub_collection() {
        let a = adapter();
        assert_eq!(
            a.zone_page_url("zone1_RC-1_RC-2", "RC-1", 2),
            "https://www.arte.tv/api/rproxy/emac/v4/de/web/zones/zone1/content?authorizedCountry=DE&page=2&collectionId=RC-1&subCollectionId=RC-2"
        );
        assert!(!a.zone_page_url("zone1_RC-1", "RC-1", 2).contains("subCollectionId"));
    }

    #[test]
    fn test_stream_candidate() {
        let stream: Stream = serde_json::from_value(json!({
            "url": "https://arte-cmafhls.akamaized.net/am/cmaf/103484/master.m3u8",
            "versions": [{"label": "Deutsch (Original)", "shortLabel": "DE"}],
            "mainQuality": {"code": "XQ", "label": "720p"},
            "protocol": "HLS_NG"
        }))
        .unwrap();

        let candidate = stream_candidate(&stream);
        assert_eq!(candidate.label, "Arte Deutsch (Original) 720p");
        assert_eq!(candidate.quality, Some(720));
        assert_eq!(candidate.kind, StreamKind::Hls);
        assert_eq!(candidate.language.as_deref(), Some("DE"));
    }
}
