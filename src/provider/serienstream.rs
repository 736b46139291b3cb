//! Serienstream (s.to): HTML pages plus an AJAX search endpoint.

use crate::{
    Error, Result,
    extractor::{EmbedLink, ExtractorRegistry},
    provider::{
        HttpClient, LoadToken, SiteAdapter,
        html::{self, fix_url},
    },
    types::{
        CatalogEntry, CatalogPage, Category, EpisodeRef, ItemDetail, MediaKind, ResolvedStreams,
        SkipReason,
    },
};
use async_trait::async_trait;
use futures::future::{join_all, try_join_all};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

pub const MAIN_URL: &str = "https://s.to";
const ID: &str = "serienstream";

const CATEGORIES: &[Category] = &[Category::new("homepage", "Startseite")];
const KINDS: &[MediaKind] = &[MediaKind::Series];

static CAROUSEL: LazyLock<Selector> = LazyLock::new(|| html::selector("div.carousel"));
static COVER_ITEM: LazyLock<Selector> = LazyLock::new(|| html::selector("div.coverListItem"));
static LINK: LazyLock<Selector> = LazyLock::new(|| html::selector("a"));
static H3: LazyLock<Selector> = LazyLock::new(|| html::selector("h3"));
static H4: LazyLock<Selector> = LazyLock::new(|| html::selector("h4"));
static IMG: LazyLock<Selector> = LazyLock::new(|| html::selector("img"));

static SERIES_TITLE: LazyLock<Selector> =
    LazyLock::new(|| html::selector("div.series-title span"));
static COVER: LazyLock<Selector> = LazyLock::new(|| html::selector("div.seriesCoverBox img"));
static GENRES: LazyLock<Selector> = LazyLock::new(|| html::selector("div.genres li a"));
static START_DATE: LazyLock<Selector> =
    LazyLock::new(|| html::selector("span[itemprop=startDate] a"));
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| html::selector("p.seri_des"));
static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| html::selector("li"));
static ACTOR_NAME: LazyLock<Selector> = LazyLock::new(|| html::selector("ul li a span"));
static SEASON_LINK: LazyLock<Selector> =
    LazyLock::new(|| html::selector("div#stream > ul:first-child li a"));

static EPISODE_ROW: LazyLock<Selector> =
    LazyLock::new(|| html::selector("table.seasonEpisodesList tbody tr"));
static EPISODE_NUMBER: LazyLock<Selector> =
    LazyLock::new(|| html::selector("meta[itemprop=episodeNumber]"));
static EPISODE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| html::selector(".seasonEpisodeTitle"));

static HOSTER: LazyLock<Selector> =
    LazyLock::new(|| html::selector("div.hosterSiteVideo ul li"));
static LANGUAGE_FLAG: LazyLock<Selector> =
    LazyLock::new(|| html::selector("div.changeLanguageBox img[data-lang-key]"));

static EM_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?em>").expect("valid em regex"));

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    link: String,
    title: Option<String>,
}

/// Series page without its episodes
#[derive(Debug)]
struct SeriesPage {
    detail: ItemDetail,
    /// (season number, season page URL); "Filme" has no number
    seasons: Vec<(Option<i32>, String)>,
}

/// One hoster row of an episode page
#[derive(Debug, Clone, PartialEq)]
struct Hoster {
    name: String,
    target: String,
    language: Option<String>,
}

fn parse_homepage(body: &str, base: &str) -> Vec<CatalogEntry> {
    let document = Html::parse_document(body);
    let mut entries: Vec<CatalogEntry> = Vec::new();

    for item in document
        .select(&CAROUSEL)
        .flat_map(|carousel| carousel.select(&COVER_ITEM))
    {
        let entry = html::select_attr(item, &LINK, "href")
            .and_then(|href| fix_url(base, &href))
            .zip(html::select_text(item, &H3))
            .and_then(|(id, title)| CatalogEntry::new(id, title, ID))
            .map(|e| {
                e.with_kind(MediaKind::Series).with_poster(
                    html::select_attr(item, &IMG, "data-src").and_then(|src| fix_url(base, &src)),
                )
            });

        match entry {
            Some(entry) if !entries.iter().any(|e| e.id == entry.id) => entries.push(entry),
            Some(_) => {}
            None => debug!("{ID}: skipping cover item without link or title"),
        }
    }

    entries
}

fn parse_series(body: &str, id: &str, base: &str) -> Result<SeriesPage> {
    let document = Html::parse_document(body);
    let root = document.root_element();

    let title = html::select_text(root, &SERIES_TITLE)
        .ok_or_else(|| Error::Parse(format!("{ID}: no series title at {id}")))?;

    let mut detail = ItemDetail::new(id, title, MediaKind::Series, ID);
    detail.poster_url =
        html::select_attr(root, &COVER, "data-src").and_then(|src| fix_url(base, &src));
    detail.tags = document.select(&GENRES).map(html::text).collect();
    detail.year = html::select_text(root, &START_DATE).and_then(|y| y.parse().ok());
    detail.plot = Some(
        document
            .select(&DESCRIPTION)
            .map(html::text)
            .collect::<Vec<_>>()
            .join(" "),
    )
    .filter(|p| !p.is_empty());

    // <li><strong>Schauspieler:</strong><ul><li><a><span>Name</span></a></li></ul></li>
    detail.cast = document
        .select(&LIST_ITEM)
        .find(|li| {
            li.children()
                .filter_map(scraper::ElementRef::wrap)
                .next()
                .is_some_and(|label| html::text(label).starts_with("Schauspieler:"))
        })
        .map(|li| li.select(&ACTOR_NAME).map(html::text).collect())
        .unwrap_or_default();

    let seasons = document
        .select(&SEASON_LINK)
        .filter_map(|a| {
            let url = html::attr(a, "href").and_then(|href| fix_url(base, &href))?;
            Some((html::text(a).parse().ok(), url))
        })
        .collect();

    Ok(SeriesPage { detail, seasons })
}

fn parse_season(body: &str, season: Option<i32>, base: &str) -> Vec<(EpisodeRefDraft, String)> {
    let document = Html::parse_document(body);

    document
        .select(&EPISODE_ROW)
        .filter_map(|row| {
            let url = html::select_attr(row, &LINK, "href").and_then(|h| fix_url(base, &h))?;
            let draft = EpisodeRefDraft {
                season,
                episode: html::select_attr(row, &EPISODE_NUMBER, "content")
                    .and_then(|n| n.parse().ok()),
                title: html::select_text(row, &EPISODE_TITLE),
            };
            Some((draft, url))
        })
        .collect()
}

/// Episode fields parsed before the load token is minted
#[derive(Debug, PartialEq)]
struct EpisodeRefDraft {
    season: Option<i32>,
    episode: Option<i32>,
    title: Option<String>,
}

fn parse_hosters(body: &str) -> Vec<Hoster> {
    let document = Html::parse_document(body);

    let language_of = |key: &str| {
        document
            .select(&LANGUAGE_FLAG)
            .find(|img| img.value().attr("data-lang-key") == Some(key))
            .and_then(|img| html::attr(img, "title"))
            .map(|t| t.trim_start_matches("mit").trim().to_string())
    };

    document
        .select(&HOSTER)
        .filter_map(|li| {
            let target = html::attr(li, "data-link-target")?;
            let language = html::attr(li, "data-lang-key").and_then(|key| language_of(&key));
            Some(Hoster {
                name: html::select_text(li, &H4).unwrap_or_else(|| "Hoster".to_string()),
                target,
                language,
            })
        })
        .collect()
}

/// Adapter for Serienstream
pub struct SerienstreamAdapter {
    main_url: String,
    client: HttpClient,
    extractors: Arc<ExtractorRegistry>,
}

impl SerienstreamAdapter {
    pub fn new(main_url: String, client: HttpClient, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            main_url,
            client,
            extractors,
        }
    }

    async fn load_season(&self, season: Option<i32>, url: &str) -> Result<Vec<EpisodeRef>> {
        let body = self.client.get_text(url).await?;

        parse_season(&body, season, &self.main_url)
            .into_iter()
            .map(|(draft, episode_url)| {
                LoadToken::encode(ID, episode_url).map(|load_data| {
                    EpisodeRef::new(load_data)
                        .with_numbers(draft.season, draft.episode)
                        .with_title(draft.title)
                })
            })
            .collect()
    }
}

#[async_trait]
impl SiteAdapter for SerienstreamAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        "Serienstream"
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

        let body = self.client.get_text(&self.main_url).await?;
        Ok(CatalogPage::new(parse_homepage(&body, &self.main_url), false))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        info!("{ID}: searching {:?}", query);

        let referer = format!("{}/search", self.main_url);
        let items: Vec<SearchItem> = self
            .client
            .post_form_json(
                &format!("{}/ajax/search", self.main_url),
                &[("keyword", query)],
                &[
                    ("x-requested-with", "XMLHttpRequest"),
                    ("Referer", referer.as_str()),
                ],
            )
            .await?;

        Ok(items
            .into_iter()
            .filter(|item| !item.link.contains("episode-") && item.link.contains("/stream"))
            .filter_map(|item| {
                let title = EM_TAG.replace_all(item.title.as_deref()?, "").into_owned();
                CatalogEntry::new(fix_url(&self.main_url, &item.link)?, title, ID)
                    .map(|e| e.with_kind(MediaKind::Series))
            })
            .collect())
    }

    async fn load_item(&self, id: &str) -> Result<ItemDetail> {
        if !id.starts_with(&self.main_url) {
            return Err(Error::InvalidId(id.to_string()));
        }
        info!("{ID}: loading {}", id);

        let body = self.client.get_text(id).await?;
        let SeriesPage { detail, seasons } = parse_series(&body, id, &self.main_url)?;
        debug!("{ID}: fetching {} season page(s)", seasons.len());

        // concurrent fetch, results come back in season-link order
        let episodes = try_join_all(
            seasons
                .iter()
                .map(|(season, url)| self.load_season(*season, url)),
        )
        .await?
        .into_iter()
        .flatten()
        .collect();

        Ok(detail.with_episodes(episodes))
    }

    async fn resolve_streams(&self, load_data: &str) -> Result<ResolvedStreams> {
        let episode_url: String = LoadToken::decode(ID, load_data)?;
        info!("{ID}: resolving {}", episode_url);

        let body = self.client.get_text(&episode_url).await?;
        let hosters = parse_hosters(&body);

        let redirects = join_all(hosters.iter().map(|hoster| async {
            let target = fix_url(&self.main_url, &hoster.target)
                .ok_or_else(|| Error::Parse(format!("bad hoster link {}", hoster.target)))?;
            self.client
                .resolve_redirect(&target, Some(episode_url.as_str()))
                .await
        }))
        .await;

        let mut resolved = ResolvedStreams::new();
        let mut links = Vec::new();
        for (hoster, redirect) in hosters.iter().zip(redirects) {
            match redirect {
                Ok(url) => links.push(
                    EmbedLink::new(url, &hoster.name).with_language(hoster.language.clone()),
                ),
                Err(e) => {
                    warn!("{ID}: redirect for {} failed: {}", hoster.name, e);
                    resolved.skip(
                        &hoster.target,
                        SkipReason::ExtractorFailed(format!("redirect failed: {e}")),
                    );
                }
            }
        }

        resolved.extend(
            self.extractors
                .resolve(&self.client, &links, Some(episode_url.as_str()))
                .await,
        );

        resolved.require_streams(hosters.len(), &episode_url)
    }
}
