//! Filmpalast: fixed-size HTML listing pages without a page count.

use crate::{
    Error, Result,
    extractor::{EmbedLink, ExtractorRegistry},
    provider::{
        HttpClient, LoadToken, SiteAdapter,
        html::{self, fix_url},
        paging::has_more,
    },
    types::{CatalogEntry, CatalogPage, Category, ItemDetail, MediaKind, ResolvedStreams},
};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

pub const MAIN_URL: &str = "https://filmpalast.to";
const ID: &str = "filmpalast";

const CATEGORIES: &[Category] = &[
    Category::new("new", "Neu"),
    Category::new("movies", "Filme"),
    Category::new("series", "Serien"),
];
const KINDS: &[MediaKind] = &[MediaKind::Movie, MediaKind::Series];

static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| html::selector("#content article.liste"));
static SEARCH_ITEM: LazyLock<Selector> = LazyLock::new(|| html::selector("#content .glowliste"));
static LINK: LazyLock<Selector> = LazyLock::new(|| html::selector("a"));
static POSTER: LazyLock<Selector> = LazyLock::new(|| html::selector("img[src^='/files']"));

static TITLE: LazyLock<Selector> = LazyLock::new(|| html::selector("#content h2.rb.bgDark"));
static COVER: LazyLock<Selector> = LazyLock::new(|| html::selector("#content .detail.rb img.cover2"));
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| html::selector("#content span[itemprop=description]"));
static DETAIL_ROW: LazyLock<Selector> =
    LazyLock::new(|| html::selector("#content #detail-content-list li"));
static EM: LazyLock<Selector> = LazyLock::new(|| html::selector("em"));
static STREAM_LINK: LazyLock<Selector> =
    LazyLock::new(|| html::selector("#content .currentStreamLinks a.iconPlay"));

/// Listing path below the main URL for a category token
fn category_path(token: &str) -> &'static str {
    match token {
        "movies" => "/movies/top",
        "series" => "/serien/view",
        _ => "",
    }
}

fn to_entry(item: ElementRef<'_>, base: &str) -> Option<CatalogEntry> {
    let link = item.select(&LINK).next()?;
    let url = html::attr(link, "href").and_then(|href| fix_url(base, &href))?;
    let title = html::attr(link, "title").unwrap_or_else(|| html::text(link));

    Some(
        CatalogEntry::new(url, title, ID)?.with_poster(
            html::select_attr(item, &POSTER, "src").and_then(|src| fix_url(base, &src)),
        ),
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

/// Movie page: detail plus the hoster links found on it
fn parse_movie(body: &str, id: &str, base: &str) -> Result<(ItemDetail, Vec<String>)> {
    let document = Html::parse_document(body);
    let root = document.root_element();

    let title = html::select_text(root, &TITLE)
        .ok_or_else(|| Error::Parse(format!("{ID}: no title at {id}")))?;

    let mut detail = ItemDetail::new(id, title, MediaKind::Movie, ID);
    detail.poster_url = html::select_attr(root, &COVER, "src").and_then(|src| fix_url(base, &src));
    detail.plot = html::select_text(root, &DESCRIPTION);

    let rows: Vec<ElementRef<'_>> = document.select(&DETAIL_ROW).collect();
    // "<em>Veröffentlicht:</em><br>2019"
    detail.year = rows.first().and_then(|li| {
        li.inner_html()
            .split("<br>")
            .nth(1)
            .map(|s| s.chars().filter(char::is_ascii_digit).collect::<String>())
            .and_then(|y| y.parse().ok())
    });
    // "<em>181 Min.</em>"
    detail.duration_minutes = rows
        .iter()
        .flat_map(|li| li.select(&EM))
        .find_map(|em| {
            em.text()
                .next()
                .unwrap_or_default()
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
                .parse()
                .ok()
        });

    let links = document
        .select(&STREAM_LINK)
        .filter_map(|a| html::attr(a, "href").or_else(|| html::attr(a, "data-player-url")))
        .collect();

    Ok((detail, links))
}

/// Adapter for filmpalast.to
pub struct FilmpalastAdapter {
    main_url: String,
    client: HttpClient,
    extractors: Arc<ExtractorRegistry>,
}

impl FilmpalastAdapter {
    pub fn new(main_url: String, client: HttpClient, extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            main_url,
            client,
            extractors,
        }
    }
}

#[async_trait]
impl SiteAdapter for FilmpalastAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        "Filmpalast"
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
                "{}/search/title/{}",
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
        let (mut detail, links) = parse_movie(&body, id, &self.main_url)?;
        detail.coming_soon = links.is_empty();

        Ok(detail.with_load_data(LoadToken::encode(ID, links)?))
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

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <div id="content">
            <article class="liste">
                <a href="//filmpalast.to/stream/dune-part-two" title="Dune: Part Two"></a>
                <img src="/files/movies/450/dune.jpg">
            </article>
            <article class="liste">
                <a href="/stream/oppenheimer" title="Oppenheimer"></a>
            </article>
            <article class="liste"><span>Werbung</span></article>
        </div>
    "#;

    const MOVIE: &str = r#"
        <div id="content">
            <h2 class="rb bgDark">Oppenheimer</h2>
            <div class="detail rb"><img class="cover2" src="/files/movies/450/opp.jpg"></div>
            <span itemprop="description">Die Geschichte des Physikers.</span>
            <ul id="detail-content-list">
                <li><em>Veröffentlicht:</em><br>2023</li>
                <li><em>181 Min.</em></li>
            </ul>
            <ul class="currentStreamLinks">
                <li><a class="iconPlay" href="https://voe.sx/e/abc"></a></li>
                <li><a class="iconPlay" data-player-url="https://bigwarp.io/e/xyz"></a></li>
            </ul>
        </div>
    "#;

    #[test]
    fn test_parse_listing() {
        let (entries, received) = parse_listing(LISTING, &LIST_ITEM, MAIN_URL);
        assert_eq!(received, 3);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "https://filmpalast.to/stream/dune-part-two");
        assert_eq!(
            entries[0].poster_url.as_deref(),
            Some("https://filmpalast.to/files/movies/450/dune.jpg")
        );
        assert_eq!(entries[1].title, "Oppenheimer");
        assert_eq!(entries[1].poster_url, None);
    }

    #[test]
    fn test_parse_movie() {
        let (detail, links) =
            parse_movie(MOVIE, "https://filmpalast.to/stream/oppenheimer", MAIN_URL).unwrap();

        assert_eq!(detail.title, "Oppenheimer");
        assert_eq!(detail.year, Some(2023));
        assert_eq!(detail.duration_minutes, Some(181));
        assert_eq!(detail.plot.as_deref(), Some("Die Geschichte des Physikers."));
        assert_eq!(links, vec!["https://voe.sx/e/abc", "https://bigwarp.io/e/xyz"]);
    }

    #[test]
    fn test_category_paths() {
        assert_eq!(category_path("new"), "");
        assert_eq!(category_path("series"), "/serien/view");
    }
}
