use super::api_types::{
    BlockItem, PageResponse, PlaybackRequest, PlaybackResponse, SearchResponse, Streaming,
    TokenResponse,
};
use crate::{
    Error, Result,
    provider::{HttpClient, LoadToken, SiteAdapter, html::fix_url, http::bearer},
    types::{
        CatalogEntry, CatalogPage, Category, EpisodeRef, ItemDetail, MediaKind, ResolvedStreams,
        SkipReason, StreamCandidate, StreamKind, year_from_date,
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEVICE_INFO: &str = "STONEJS/1 (Unknown/Unknown; Linux/undefined; Unknown)";
const DISCO_CLIENT: &str = "WEB:UNKNOWN:wbdatv:2.1.9";

const CATEGORIES: &[Category] = &[Category::new("homepage", "Startseite")];
const KINDS: &[MediaKind] = &[MediaKind::Series, MediaKind::Movie];

/// One channel of the Discovery network
#[derive(Debug, Clone)]
pub struct DiscoverySite {
    pub id: String,
    pub name: String,
    pub main_url: String,
    /// Playback API host
    pub api_url: String,
    /// CMS API host
    pub metadata_url: String,
    /// `environment` parameter of the CMS
    pub service: String,
    /// Path segment of show pages
    pub slug: String,
    /// Token realm
    pub realm: String,
}

impl DiscoverySite {
    fn new(id: &str, name: &str, main_url: &str, service: &str, realm: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            main_url: main_url.to_string(),
            api_url: "https://eu1-prod.disco-api.com".to_string(),
            metadata_url: "https://de-api.loma-cms.com".to_string(),
            service: service.to_string(),
            slug: "sendungen".to_string(),
            realm: realm.to_string(),
        }
    }
}

/// Built-in Discovery channels
pub fn sites() -> Vec<DiscoverySite> {
    vec![
        DiscoverySite::new("dmax", "DMAX", "https://dmax.de", "dmax", "dmaxde"),
        DiscoverySite::new("tlc", "TLC", "https://tlc.de", "tlc", "tlcde"),
    ]
}

/// Playback reference; `None` marks an announced but unreleased video
#[derive(Debug, Serialize, Deserialize)]
struct VideoRef {
    video_id: Option<String>,
}

/// Adapter for Discovery channels (DMAX, TLC)
pub struct DiscoveryAdapter {
    site: DiscoverySite,
    client: HttpClient,
}

impl DiscoveryAdapter {
    pub fn new(site: DiscoverySite, client: HttpClient) -> Self {
        Self { site, client }
    }

    fn token(&self, video_id: Option<String>) -> Result<String> {
        LoadToken::encode(&self.site.id, VideoRef { video_id })
    }

    fn show_url(&self, slug: &str) -> String {
        format!("{}/{}/{}", self.site.main_url, self.site.slug, slug)
    }

    fn teaser_to_entry(&self, item: &BlockItem) -> Option<CatalogEntry> {
        let path = match item.link.as_ref().and_then(|l| l.url.clone()) {
            Some(url) => url,
            None => format!(
                "/{}/{}",
                self.site.slug,
                item.alternate_id.as_ref().or(item.url.as_ref())?
            ),
        };
        let id = fix_url(&self.site.main_url, &path)?;

        let poster = item
            .poster
            .as_ref()
            .and_then(|p| p.src.clone())
            .or_else(|| item.image.as_ref().and_then(|i| i.url.clone()));

        Some(
            CatalogEntry::new(id, item.title.clone()?, &self.site.id)?
                .with_kind(MediaKind::Series)
                .with_poster(poster)
                .with_year(item.publish_start.as_deref().and_then(year_from_date)),
        )
    }

    fn page_to_entry(&self, page: &PageResponse) -> Option<CatalogEntry> {
        if page.slug.is_empty() {
            return None;
        }

        Some(
            CatalogEntry::new(self.show_url(&page.slug), &page.title, &self.site.id)?
                .with_kind(MediaKind::Series)
                .with_poster(page.image.as_ref().and_then(|i| i.url.clone()))
                .with_year(year_from_date(&page.date_published)),
        )
    }

    fn episode_ref(&self, item: &BlockItem) -> Option<Result<EpisodeRef>> {
        let id = item.id.clone()?;

        Some(self.token(Some(id)).map(|load_data| {
            let mut episode = EpisodeRef::new(load_data)
                .with_numbers(
                    item.season_number.map(|n| n as i32),
                    item.episode_number.map(|n| n as i32),
                )
                .with_title(item.title.clone());
            episode.plot = item.description.clone();
            episode.runtime = item.video_duration.map(|ms| (ms / 60_000) as i32);
            episode.poster_url = item.poster.as_ref().and_then(|p| p.src.clone());
            episode
        }))
    }

    fn page_to_detail(&self, id: &str, page: PageResponse) -> Result<ItemDetail> {
        if page.title.trim().is_empty() {
            return Err(Error::NotFound(format!("{}: no page for {id}", self.site.id)));
        }

        let series_block = page.blocks.iter().find(|b| b.show_id.is_some());
        let kind = if series_block.is_some() {
            MediaKind::Series
        } else {
            MediaKind::Movie
        };

        let mut detail = ItemDetail::new(id, &page.title, kind, &self.site.id);
        detail.poster_url = page.meta_media.first().and_then(|m| m.media.url.clone());
        detail.year = year_from_date(&page.date_published);
        detail.plot = page
            .description
            .clone()
            .or_else(|| page.meta_description.clone());
        detail.tags = page.taxonomies.iter().map(|t| t.title.clone()).collect();

        if let Some(block) = series_block {
            let episodes = block
                .items
                .iter()
                .filter_map(|item| self.episode_ref(item))
                .collect::<Result<Vec<_>>>()?;
            debug!("{}: {} episodes for {}", self.site.id, episodes.len(), id);
            return Ok(detail.with_episodes(episodes));
        }

        let video_id = page
            .blocks
            .iter()
            .find(|b| b.video_id.is_some() && b.title.as_deref() == Some(page.title.as_str()))
            .and_then(|b| b.video_id.clone());

        detail.coming_soon = video_id.is_none();
        Ok(detail.with_load_data(self.token(video_id)?))
    }

    async fn obtain_token(&self) -> Result<String> {
        let url = format!("{}/token?realm={}", self.site.api_url, self.site.realm);
        let params = format!("realm={}", self.site.realm);
        let response: TokenResponse = self
            .client
            .get_json_with(
                &url,
                &[
                    ("X-Device-Info", DEVICE_INFO),
                    ("X-disco-client", DISCO_CLIENT),
                    ("X-disco-params", params.as_str()),
                ],
            )
            .await?;

        Ok(response.data.attributes.token)
    }

    fn streaming_to_candidate(&self, source: &Streaming) -> std::result::Result<StreamCandidate, SkipReason> {
        if source.protection.drm_enabled {
            return Err(SkipReason::UnsupportedFormat("DRM protected".to_string()));
        }

        let kind = StreamKind::from_hint(&source.kind, &source.url)
            .filter(|k| k.is_playable())
            .ok_or_else(|| SkipReason::UnsupportedFormat(format!("stream type {:?}", source.kind)))?;

        let mut label = format!("{} {}", self.site.name, source.kind.to_uppercase());
        if source.fallback {
            label.push_str(" (fallback)");
        }

        Ok(StreamCandidate::new(&source.url, label).with_kind(kind))
    }
}

#[async_trait]
impl SiteAdapter for DiscoveryAdapter {
    fn id(&self) -> &str {
        &self.site.id
    }

    fn name(&self) -> &str {
        &self.site.name
    }

    fn supported_kinds(&self) -> &[MediaKind] {
        KINDS
    }

    fn categories(&self) -> &[Category] {
        CATEGORIES
    }

    async fn list_category(&self, token: &str, page: u32) -> Result<CatalogPage> {
        self.category(token)?;
        info!("{}: listing {} page {}", self.site.id, token, page);

        // the homepage is a single page of teaser blocks
        if page > 1 {
            return Ok(CatalogPage::end());
        }

        let url = format!(
            "{}/feloma/page/homepage/?environment={}&v=2",
            self.site.metadata_url, self.site.service
        );
        let response: PageResponse = self.client.get_json(&url).await?;

        let mut entries: Vec<CatalogEntry> = Vec::new();
        for item in response
            .blocks
            .iter()
            .flat_map(|b| &b.items)
            .filter(|i| i.page_type.as_deref() == Some("showpage"))
        {
            match self.teaser_to_entry(item) {
                Some(entry) if !entries.iter().any(|e| e.id == entry.id) => entries.push(entry),
                Some(_) => {}
                None => debug!("{}: skipping teaser {:?}", self.site.id, item.title),
            }
        }

        Ok(CatalogPage::new(entries, false))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        info!("{}: searching {:?}", self.site.id, query);

        let url = format!(
            "{}/feloma/search/page/?q={}&environment={}&pageType=showpage&page_size=20",
            self.site.metadata_url,
            urlencoding::encode(query),
            self.site.service
        );
        let response: SearchResponse = self.client.get_json(&url).await?;

        Ok(response
            .data
            .iter()
            .filter_map(|page| self.page_to_entry(page))
            .collect())
    }

    async fn load_item(&self, id: &str) -> Result<ItemDetail> {
        let slug = id.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        if slug.is_empty() || slug.contains(['?', '#']) {
            return Err(Error::InvalidId(id.to_string()));
        }
        info!("{}: loading {}", self.site.id, slug);

        let url = format!(
            "{}/feloma/page/{}/?environment={}&parent_slug={}&v=2",
            self.site.metadata_url, slug, self.site.service, self.site.slug
        );
        let page: PageResponse = self.client.get_json(&url).await?;

        self.page_to_detail(id, page)
    }

    async fn resolve_streams(&self, load_data: &str) -> Result<ResolvedStreams> {
        let VideoRef { video_id } = LoadToken::decode(&self.site.id, load_data)?;
        let Some(video_id) = video_id else {
            debug!("{}: no video yet", self.site.id);
            return Ok(ResolvedStreams::new());
        };
        info!("{}: resolving video {}", self.site.id, video_id);

        // tokens are short-lived, one per resolution
        let token = self.obtain_token().await?;
        let authorization = bearer(&token);

        let response: PlaybackResponse = self
            .client
            .post_json(
                &format!("{}/playback/v3/videoPlaybackInfo", self.site.api_url),
                &PlaybackRequest::new(&video_id),
                &[("Authorization", authorization.as_str())],
            )
            .await?;

        let sources = response.data.attributes.streaming;
        let mut resolved = ResolvedStreams::new();
        for source in &sources {
            match self.streaming_to_candidate(source) {
                Ok(candidate) => resolved.push_stream(candidate),
                Err(reason) => {
                    debug!("{}: skipping {} ({})", self.site.id, source.url, reason);
                    resolved.skip(&source.url, reason);
                }
            }
        }

        resolved.require_streams(sources.len(), &format!("{} video {video_id}", self.site.id))
    }
}
