//! Kinoger: DLE-based HTML site whose players are configured by inline
//! `show(n, [[...]], x)` script calls, one per hoster.

use crate::{
    Error, Result,
    extractor::{EmbedLink, ExtractorRegistry},
    provider::{
        HttpClient, LoadToken, SiteAdapter,
        html::{self, fix_url},
        paging::has_more,
    },
    types::{
        CatalogEntry, CatalogPage, Category, EpisodeRef, ItemDetail, MediaKind, ResolvedStreams,
    },
};
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

pub const MAIN_URL: &str = "https://kinoger.to";
const ID: &str = "kinoger";

const CATEGORIES: &[Category] = &[
    Category::new("all", "Alle Filme"),
    Category::new("action", "Action"),
    Category::new("fantasy", "Fantasy"),
    Category::new("drama", "Drama"),
    Category::new("mystery", "Mystery"),
    Category::new("romance", "Romance"),
    Category::new("animation", "Animation"),
    Category::new("horror", "Horror"),
    Category::new("familie", "Familie"),
    Category::new("komdie", "Komödie"),
];
const KINDS: &[MediaKind] = &[MediaKind::Movie, MediaKind::Series];

/// Last argument of the player call for single-file movies
const MOVIE_MARKER: &str = "0.2";

static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| html::selector("div#dle-content div.short"));
static SEARCH_ITEM: LazyLock<Selector> =
    LazyLock::new(|| html::selector("div#dle-content div.titlecontrol"));
static LINK: LazyLock<Selector> = LazyLock::new(|| html::selector("a"));
static IMG: LazyLock<Selector> = LazyLock::new(|| html::selector("img"));
static CONTENT_IMG: LazyLock<Selector> = LazyLock::new(|| html::selector("div.content_text img"));

static TITLE: LazyLock<Selector> = LazyLock::new(|| html::selector("h1#news-title"));
static IMAGES_BORDER: LazyLock<Selector> = LazyLock::new(|| html::selector("div.images-border"));
static TAG: LazyLock<Selector> = LazyLock::new(|| html::selector("li.category a"));
static RELATED: LazyLock<Selector> = LazyLock::new(|| html::selector("ul.ul_related li"));
static PLAYER_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| html::selector("div[id^=container-video] script"));

static EPISODE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://[^/]+)/(.+)-ep.+$").expect("valid episode link regex")
});
static TITLE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("valid title year regex"));

fn category_path(token: &str) -> String {
    match token {
        "all" => String::new(),
        genre => format!("/stream/{genre}"),
    }
}

/// Episode links in listings point at the series page instead
fn series_link(url: String) -> String {
    if !url.contains("-episode-") {
        return url;
    }
    match EPISODE_LINK.captures(&url) {
        Some(c) => format!("{}/series/{}", &c[1], &c[2]),
        None => url,
    }
}

fn to_entry(item: ElementRef<'_>, base: &str) -> Option<CatalogEntry> {
    let link = item.select(&LINK).next()?;
    let url = series_link(html::attr(link, "href").and_then(|h| fix_url(base, &h))?);
    let title = Some(html::text(link))
        .filter(|t| !t.is_empty())
        .or_else(|| html::select_attr(item, &IMG, "alt"))
        .or_else(|| html::attr(link, "title"))?;

    // search results carry the poster in the following sibling block
    let next_sibling = item.next_siblings().find_map(ElementRef::wrap);
    let poster = item
        .select(&CONTENT_IMG)
        .next()
        .or_else(|| next_sibling.and_then(|s| s.select(&CONTENT_IMG).next()))
        .or_else(|| item.select(&IMG).next())
        .and_then(html::image_attr)
        .and_then(|src| fix_url(base, &src));

    Some(
        CatalogEntry::new(url, title, ID)?
            .with_kind(MediaKind::Series)
            .with_poster(poster),
    )
}

/// Entries of a listing page and the number of items found on it, parsable or not
fn parse_listing(body: &str, selector: &Selector, base: &str) -> (Vec<CatalogEntry>, usize) {
    let document = Html::parse_document(body);
    let items: Vec<_> = document.select(selector).collect();
    let received = items.len();
    let entries: Vec<CatalogEntry> = items
        .into_iter()
        .filter_map(|item| {
            let entry = to_entry(item, base);
            if entry.is_none() {
                debug!("{ID}: skipping list item without link or title");
            }
            entry
        })
        .collect();

    (entries, received)
}

/// Hoster table of one player script: season x episode
fn parse_player_script(script: &str) -> Option<Vec<Vec<String>>> {
    let start = script.find('[')?;
    let end = script.rfind(']')?;
    if end <= start {
        return None;
    }
    let array = script[start + 1..end].replace('\'', "\"");
    serde_json::from_str(&format!("[{array}]")).ok()
}

fn is_movie_script(script: &str) -> bool {
    script
        .rfind(')')
        .map(|end| &script[..end])
        .and_then(|call| call.rsplit(',').next())
        .is_some_and(|arg| arg.trim() == MOVIE_MARKER)
}

/// Swap rows and columns, truncating to the shortest row
fn transpose<T: Clone>(table: &[Vec<T>]) -> Vec<Vec<T>> {
    let width = table.iter().map(Vec::len).min().unwrap_or(0);
    (0..width)
        .map(|i| table.iter().map(|row| row[i].clone()).collect())
        .collect()
}

/// hoster x season x episode into season x episode x hoster
fn links_by_episode(hosters: &[Vec<Vec<String>>]) -> Vec<Vec<Vec<String>>> {
    transpose(hosters)
        .iter()
        .map(|season| transpose(season))
        .collect()
}

#[derive(Debug)]
struct ItemPage {
    detail: ItemDetail,
    is_movie: bool,
    /// season x episode x hoster link
    links: Vec<Vec<Vec<String>>>,
}

fn parse_item(body: &str, id: &str, base: &str) -> Result<ItemPage> {
    let document = Html::parse_document(body);
    let root = document.root_element();

    let title = html::select_text(root, &TITLE)
        .ok_or_else(|| Error::Parse(format!("{ID}: no title at {id}")))?;
    let year = TITLE_YEAR
        .captures(&title)
        .and_then(|c| c[1].parse().ok());

    let mut detail = ItemDetail::new(id, &title, MediaKind::Series, ID);
    detail.year = year;
    detail.poster_url = root
        .select(&IMAGES_BORDER)
        .next()
        .and_then(|div| div.select(&IMG).next())
        .and_then(html::image_attr)
        .and_then(|src| fix_url(base, &src));
    detail.plot = html::select_text(root, &IMAGES_BORDER);
    detail.tags = document.select(&TAG).map(html::text).collect();
    detail.recommendations = document
        .select(&RELATED)
        .filter_map(|li| to_entry(li, base))
        .collect();

    let scripts: Vec<String> = document
        .select(&PLAYER_SCRIPT)
        .map(|s| s.text().collect())
        .collect();
    let is_movie = scripts.first().is_some_and(|s| is_movie_script(s));

    let hosters: Vec<Vec<Vec<String>>> = scripts
        .iter()
        .filter_map(|script| {
            let table = parse_player_script(script);
            if table.is_none() {
                debug!("{ID}: skipping unparsable player script");
            }
            table
        })
        .filter(|table| !table.is_empty())
        .collect();

    Ok(ItemPage {
        detail,
        is_movie,
        links: links_by_episode(&hosters),
    })
}

/// Adapter for kinoger.to
pub struct KinogerAdapter {
    main_url: String,
    client: HttpClient,
    extractors: Arc<ExtractorRegistry>,
}

impl KinogerAdapter {
    pub fn new(main_url: String, client: HttpClient, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            main_url,
            client,
            extractors,
        }
    }

    fn build_detail(page: ItemPage) -> Result<ItemDetail> {
        let ItemPage {
            mut detail,
            is_movie,
            links,
        } = page;

        if is_movie {
            let hosters: Vec<String> = links
                .into_iter()
                .flatten()
                .next()
                .unwrap_or_default();
            detail.kind = MediaKind::Movie;
            detail.coming_soon = hosters.is_empty();
            return Ok(detail.with_load_data(LoadToken::encode(ID, hosters)?));
        }

        let mut episodes = Vec::new();
        for (season, season_links) in links.into_iter().enumerate() {
            for (episode, hosters) in season_links.into_iter().enumerate() {
                episodes.push(
                    EpisodeRef::new(LoadToken::encode(ID, hosters)?)
                        .with_numbers(Some(season as i32 + 1), Some(episode as i32 + 1)),
                );
            }
        }
        detail.coming_soon = episodes.is_empty();

        Ok(detail.with_episodes(episodes))
    }
}

#[async_trait]
impl SiteAdapter for KinogerAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        "Kinoger"
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

        let url = format!(
            "{}{}/page/{}",
            self.main_url,
            category_path(token),
            page.max(1)
        );
        let body = self.client.get_text(&url).await?;
        let (entries, received) = parse_listing(&body, &LIST_ITEM, &self.main_url);
        let more = has_more(received, None);

        Ok(CatalogPage::new(entries, more))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        info!("{ID}: searching {:?}", query);

        let body = self
            .client
            .get_text(&format!(
                "{}/?do=search&subaction=search&titleonly=3&story={}&x=0&y=0&submit=submit",
                self.main_url,
                urlencoding::encode(query)
            ))
            .await?;

        Ok(parse_listing(&body, &SEARCH_ITEM, &self.main_url).0)
    }

    async fn load_item(&self, id: &str) -> Result<ItemDetail> {
        if !id.starts_with(&self.main_url) {
            return Err(Error::InvalidId(id.to_string()));
        }
        info!("{ID}: loading {}", id);

        let body = self.client.get_text(id).await?;
        Self::build_detail(parse_item(&body, id, &self.main_url)?)
    }

    async fn resolve_streams(&self, load_data: &str) -> Result<ResolvedStreams> {
        let links: Vec<String> = LoadToken::decode(ID, load_data)?;
        let embeds: Vec<EmbedLink> = links
            .iter()
            .filter_map(|link| fix_url(&self.main_url, link))
            .map(|url| {
                let label = html::host_label(&url);
                EmbedLink::new(url, label)
            })
            .collect();
        info!("{ID}: resolving {} hoster link(s)", embeds.len());

        let referer = format!("{}/", self.main_url);
        self.extractors
            .resolve(&self.client, &embeds, Some(referer.as_str()))
            .await
            .require_streams(embeds.len(), ID)
    }
}
