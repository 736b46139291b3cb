use serde::{Deserialize, Serialize};
use tracing::debug;

/// Media kind classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Series,
    Live,
    /// Talks, recordings and other items that are neither movie nor series
    Other,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
            Self::Live => write!(f, "live"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// One browsable item of a category page or search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable id (URL or adapter-encoded token) accepted by `load_item`
    pub id: String,
    /// Display title
    pub title: String,
    /// Poster image URL
    pub poster_url: Option<String>,
    /// Release year
    pub year: Option<i32>,
    /// Media kind
    pub kind: MediaKind,
    /// Adapter id that produced the entry
    pub adapter: String,
}

impl CatalogEntry {
    /// Create a new entry with the required fields.
    ///
    /// Returns `None` when the id or the title is blank, which is how
    /// adapters skip unparsable items without failing the whole page.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        adapter: impl Into<String>,
    ) -> Option<Self> {
        let id = id.into();
        let title = title.into();
        if id.trim().is_empty() || title.trim().is_empty() {
            debug!("Skipping {} entry {:?} without id or title", adapter.into(), id);
            return None;
        }

        Some(Self {
            id,
            title: title.trim().to_string(),
            poster_url: None,
            year: None,
            kind: MediaKind::Movie,
            adapter: adapter.into(),
        })
    }

    /// Builder pattern: set media kind
    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder pattern: set year
    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    /// Builder pattern: set poster URL, ignoring blank values
    pub fn with_poster(mut self, url: Option<String>) -> Self {
        self.poster_url = url.filter(|u| !u.trim().is_empty());
        self
    }
}

/// A homepage section an adapter offers for `list_category`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Adapter-defined token passed back to `list_category`
    pub token: &'static str,
    /// Human-readable label
    pub label: &'static str,
}

impl Category {
    pub const fn new(token: &'static str, label: &'static str) -> Self {
        Self { token, label }
    }
}

/// One page of a category listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Entries in site order
    pub entries: Vec<CatalogEntry>,
    /// Whether the caller may ask for the next page
    pub has_more: bool,
}

impl CatalogPage {
    pub fn new(entries: Vec<CatalogEntry>, has_more: bool) -> Self {
        Self { entries, has_more }
    }

    /// A page past the end of the listing
    pub fn end() -> Self {
        Self::default()
    }
}

/// Extract a year from the leading digits of a date-like string ("2019-05-01", "2019")
pub fn year_from_date(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(date) {
        return Some(chrono::Datelike::year(&parsed));
    }

    date.get(..4).and_then(|y| y.parse().ok())
}
