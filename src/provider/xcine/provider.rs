use super::api_types::{BrowseResponse, Media, MediaDetail, Stream};
use crate::{
    Error, Result,
    extractor::{EmbedLink, ExtractorRegistry},
    provider::{
        HttpClient, LoadToken, SiteAdapter,
        html::{fix_url, host_label},
        paging::has_more,
    },
    types::{
        CatalogEntry, CatalogPage, Category, EpisodeRef, ItemDetail, MediaKind, ResolvedStreams,
        StreamCandidate, StreamKind,
    },
};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const DIRECT_PREFIX: &str = "https://dl.streamcloud";
const BROWSE_FILTERS: &str =
    "lang=2&keyword=&year=&rating=&votes=&genre=&country=&cast=&directors=";

const CATEGORIES: &[Category] = &[
    Category::new("movies-trending", "Derzeit Beliebt Filme"),
    Category::new("movies-new", "Neu Filme"),
    Category::new("series-trending", "Derzeit Beliebt Serien"),
    Category::new("series-new", "Neu Serien"),
];
const KINDS: &[MediaKind] = &[MediaKind::Movie, MediaKind::Series];

/// One site of the XCine API family
#[derive(Debug, Clone)]
pub struct XcineSite {
    pub id: String,
    pub name: String,
    pub main_url: String,
    pub api_url: String,
}

impl XcineSite {
    fn new(id: &str, name: &str, main_url: &str, api_url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            main_url: main_url.to_string(),
            api_url: api_url.to_string(),
        }
    }
}

/// Built-in XCine family sites
pub fn sites() -> Vec<XcineSite> {
    vec![
        XcineSite::new("xcineio", "XcineIO", "https://www3.xcine.io", "https://api.xcine.io"),
        XcineSite::new("movie4k", "Movie4k", "https://movie4k.sx", "https://api.movie4k.sx"),
        XcineSite::new(
            "streamcloud",
            "Streamcloud",
            "https://streamcloud.sx",
            "https://api.streamcloud.sx",
        ),
    ]
}

/// Browse query of a category token
fn browse_query(token: &str) -> Option<(&'static str, &'static str, MediaKind)> {
    match token {
        "movies-trending" => Some(("movies", "trending", MediaKind::Movie)),
        "movies-new" => Some(("movies", "releases", MediaKind::Movie)),
        "series-trending" => Some(("tvseries", "trending", MediaKind::Series)),
        "series-new" => Some(("tvseries", "releases", MediaKind::Series)),
        _ => None,
    }
}

fn image_url(path: Option<&str>) -> Option<String> {
    let path = path?.trim();
    if path.starts_with('/') {
        Some(format!("{TMDB_IMAGE_BASE}{path}"))
    } else {
        Some(path.to_string())
    }
}

/// Group inline series streams by episode number, keeping first-seen order
fn group_episodes(streams: &[Stream]) -> Vec<(Option<i32>, Option<String>, Vec<String>)> {
    let mut groups: Vec<(Option<i32>, Option<String>, Vec<String>)> = Vec::new();

    for stream in streams {
        let Some(url) = stream.stream.clone().filter(|s| !s.trim().is_empty()) else {
            continue;
        };
        match groups.iter_mut().find(|(e, _, _)| *e == stream.e) {
            Some((_, title, urls)) => {
                urls.push(url);
                if title.is_none() {
                    title.clone_from(&stream.e_title);
                }
            }
            None => groups.push((stream.e, stream.e_title.clone(), vec![url])),
        }
    }

    groups
}

/// Adapter for the XCine API family (XcineIO, Movie4k, Streamcloud)
pub struct XcineAdapter {
    site: XcineSite,
    client: HttpClient,
    extractors: Arc<ExtractorRegistry>,
}

impl XcineAdapter {
    pub fn new(site: XcineSite, client: HttpClient, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            site,
            client,
            extractors,
        }
    }

    fn referer(&self) -> String {
        format!("{}/", self.site.main_url)
    }

    fn media_to_entry(&self, media: Media, kind: Option<MediaKind>) -> Option<CatalogEntry> {
        let title = media.title.or(media.original_title)?;
        let kind = kind.unwrap_or(if media.total_episodes.is_some() {
            MediaKind::Series
        } else {
            MediaKind::Movie
        });

        Some(
            CatalogEntry::new(media.id?, title, &self.site.id)?
                .with_kind(kind)
                .with_year(media.year)
                .with_poster(image_url(
                    media.poster_path.as_deref().or(media.backdrop_path.as_deref()),
                )),
        )
    }

    fn map_entries(&self, response: BrowseResponse, kind: Option<MediaKind>) -> Vec<CatalogEntry> {
        response
            .movies
            .into_iter()
            .filter_map(|m| {
                let entry = self.media_to_entry(m, kind);
                if entry.is_none() {
                    debug!("{}: skipping entry without id or title", self.site.id);
                }
                entry
            })
            .collect()
    }

    fn detail_from(&self, id: &str, res: MediaDetail) -> Result<ItemDetail> {
        let title = res
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::NotFound(format!("{}: no title for {id}", self.site.id)))?;
        let is_series = res.tv == Some(1);
        let kind = if is_series {
            MediaKind::Series
        } else {
            MediaKind::Movie
        };

        let mut detail = ItemDetail::new(id, title, kind, &self.site.id);
        detail.poster_url = image_url(res.backdrop_path.as_deref().or(res.poster_path.as_deref()));
        detail.year = res.year;
        detail.plot = res.storyline.clone().or_else(|| res.overview.clone());
        detail.tags = res
            .genres
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
        detail.cast = res.cast.clone();

        if is_series {
            let episodes = group_episodes(&res.streams)
                .into_iter()
                .map(|(number, title, urls)| {
                    LoadToken::encode(&self.site.id, urls).map(|load_data| {
                        EpisodeRef::new(load_data)
                            .with_numbers(None, number)
                            .with_title(title)
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(detail.with_episodes(episodes));
        }

        let urls: Vec<String> = res
            .streams
            .iter()
            .filter_map(|s| s.stream.clone())
            .filter(|s| !s.trim().is_empty())
            .collect();
        detail.coming_soon = urls.is_empty();

        Ok(detail.with_load_data(LoadToken::encode(&self.site.id, urls)?))
    }

    async fn related(&self, id: &str, kind: MediaKind) -> Result<Vec<CatalogEntry>> {
        let cat = if kind == MediaKind::Series { "tv" } else { "movie" };
        let url = format!(
            "{}/data/related_movies/?lang=2&cat={cat}&_id={}&server=0",
            self.site.api_url,
            urlencoding::encode(id)
        );
        let related: Vec<Media> = self.client.get_json(&url).await?;

        Ok(related
            .into_iter()
            .filter_map(|m| self.media_to_entry(m, None))
            .collect())
    }

    async fn resolve_link(&self, url: String) -> ResolvedStreams {
        if url.starts_with(DIRECT_PREFIX) {
            let mut resolved = ResolvedStreams::new();
            let kind = match StreamKind::classify(&url) {
                StreamKind::Embedded => StreamKind::File,
                kind => kind,
            };
            resolved.push_stream(StreamCandidate::new(url, &self.site.name).with_kind(kind));
            return resolved;
        }

        let link = EmbedLink::new(&url, host_label(&url));
        let referer = self.referer();
        self.extractors
            .resolve(&self.client, &[link], Some(referer.as_str()))
            .await
    }
}

#[async_trait]
impl SiteAdapter for XcineAdapter {
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
        let category = self.category(token)?;
        let (kind_param, order, kind) = browse_query(category.token)
            .ok_or_else(|| Error::UnknownCategory(token.to_string()))?;
        info!("{}: listing {} page {}", self.site.id, token, page);

        let url = format!(
            "{}/data/browse/?{BROWSE_FILTERS}&type={kind_param}&order_by={order}&page={}",
            self.site.api_url,
            page.max(1)
        );
        let response: BrowseResponse = self
            .client
            .get_json_with(&url, &[("Referer", self.referer().as_str())])
            .await?;

        // no total in the response, an empty page ends the listing
        let received = response.movies.len();
        let entries = self.map_entries(response, Some(kind));

        Ok(CatalogPage::new(entries, has_more(received, None)))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        info!("{}: searching {:?}", self.site.id, query);

        let url = format!(
            "{}/data/browse/?lang=2&keyword={}",
            self.site.api_url,
            urlencoding::encode(query)
        );
        let response: BrowseResponse = self
            .client
            .get_json_with(&url, &[("Referer", self.referer().as_str())])
            .await?;

        Ok(self.map_entries(response, None))
    }

    async fn load_item(&self, id: &str) -> Result<ItemDetail> {
        if id.trim().is_empty() || id.contains(['/', '?', '&']) {
            return Err(Error::InvalidId(id.to_string()));
        }
        info!("{}: loading {}", self.site.id, id);

        let url = format!("{}/data/watch/?_id={}", self.site.api_url, id);
        let res: MediaDetail = self
            .client
            .get_json_with(&url, &[("Referer", self.referer().as_str())])
            .await?;

        let mut detail = self.detail_from(id, res)?;

        match self.related(id, detail.kind).await {
            Ok(recommendations) => detail.recommendations = recommendations,
            Err(e) => warn!("{}: related titles for {} failed: {}", self.site.id, id, e),
        }

        Ok(detail)
    }

    async fn resolve_streams(&self, load_data: &str) -> Result<ResolvedStreams> {
        let urls: Vec<String> = LoadToken::decode(&self.site.id, load_data)?;
        let links: Vec<String> = urls
            .iter()
            .filter_map(|u| fix_url(&self.site.main_url, u))
            .collect();
        info!("{}: resolving {} hoster link(s)", self.site.id, links.len());

        let mut resolved = ResolvedStreams::new();
        for result in join_all(links.iter().cloned().map(|url| self.resolve_link(url))).await {
            resolved.extend(result);
        }

        resolved.require_streams(links.len(), &self.site.id)
    }
}
