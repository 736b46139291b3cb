use crate::{
    Error, Result,
    types::{CatalogEntry, CatalogPage, Category, ItemDetail, MediaKind, ResolvedStreams},
};
use async_trait::async_trait;

/// Core trait for streaming site adapters
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Adapter identifier (e.g., "serienstream", "arte")
    fn id(&self) -> &str;

    /// Human-readable site name
    fn name(&self) -> &str;

    /// Primary content language (ISO 639-1)
    fn language(&self) -> &'static str {
        "de"
    }

    /// Media kinds this site offers
    fn supported_kinds(&self) -> &[MediaKind];

    /// Homepage sections accepted by `list_category`, in menu order
    fn categories(&self) -> &[Category];

    /// Look up a category by its token
    fn category(&self, token: &str) -> Result<&Category> {
        self.categories()
            .iter()
            .find(|c| c.token == token)
            .ok_or_else(|| Error::UnknownCategory(format!("{}: {token}", self.id())))
    }

    /// List one page (1-based) of a category
    async fn list_category(&self, token: &str, page: u32) -> Result<CatalogPage>;

    /// Search the site
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>>;

    /// Load full detail for an id produced by `list_category` or `search`
    async fn load_item(&self, id: &str) -> Result<ItemDetail>;

    /// Resolve load data produced by `load_item` into streams
    async fn resolve_streams(&self, load_data: &str) -> Result<ResolvedStreams>;
}
