use crate::{
    Error, Result,
    extractor::ExtractorRegistry,
    provider::SiteAdapter,
    types::{CatalogEntry, CatalogPage, ItemDetail, ResolvedStreams},
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registered site adapters, addressed by adapter id
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SiteAdapter>>,
    extractors: Arc<ExtractorRegistry>,
}

impl AdapterRegistry {
    /// Create an empty registry sharing `extractors` with its adapters
    pub fn new(extractors: Arc<ExtractorRegistry>) -> Self {
        Self {
            adapters: Vec::new(),
            extractors,
        }
    }

    /// Add an adapter
    pub fn add_adapter<A: SiteAdapter + 'static>(&mut self, adapter: A) {
        self.add_shared(Arc::new(adapter));
    }

    /// Add an adapter that is already shared; a later adapter with the same id replaces the earlier one
    pub fn add_shared(&mut self, adapter: Arc<dyn SiteAdapter>) {
        if let Some(slot) = self.adapters.iter_mut().find(|a| a.id() == adapter.id()) {
            warn!("Replacing adapter {}", adapter.id());
            *slot = adapter;
        } else {
            debug!("Registered adapter {}", adapter.id());
            self.adapters.push(adapter);
        }
    }

    /// All adapters in registration order
    pub fn adapters(&self) -> &[Arc<dyn SiteAdapter>] {
        &self.adapters
    }

    pub fn extractors(&self) -> &Arc<ExtractorRegistry> {
        &self.extractors
    }

    /// Find an adapter by id
    pub fn get(&self, id: &str) -> Result<&Arc<dyn SiteAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.id() == id)
            .ok_or_else(|| Error::UnknownAdapter(id.to_string()))
    }

    pub async fn list_category(&self, adapter: &str, token: &str, page: u32) -> Result<CatalogPage> {
        self.get(adapter)?.list_category(token, page).await
    }

    pub async fn search(&self, adapter: &str, query: &str) -> Result<Vec<CatalogEntry>> {
        self.get(adapter)?.search(query).await
    }

    pub async fn load_item(&self, adapter: &str, id: &str) -> Result<ItemDetail> {
        self.get(adapter)?.load_item(id).await
    }

    pub async fn resolve_streams(&self, adapter: &str, load_data: &str) -> Result<ResolvedStreams> {
        self.get(adapter)?.resolve_streams(load_data).await
    }

    /// Search every adapter concurrently.
    ///
    /// Results are grouped per adapter in registration order; failing
    /// adapters are logged and left out.
    pub async fn search_all(&self, query: &str) -> Vec<(String, Vec<CatalogEntry>)> {
        info!("Searching {} adapters for {:?}", self.adapters.len(), query);

        let results = join_all(self.adapters.iter().map(|a| a.search(query))).await;

        self.adapters
            .iter()
            .zip(results)
            .filter_map(|(adapter, result)| match result {
                Ok(entries) => {
                    debug!("Adapter {} returned {} results", adapter.id(), entries.len());
                    Some((adapter.id().to_string(), entries))
                }
                Err(e) => {
                    warn!("Adapter {} search failed: {}", adapter.id(), e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, MediaKind};
    use async_trait::async_trait;

    struct FixedAdapter {
        id: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl SiteAdapter for FixedAdapter {
        fn id(&self) -> &str {
            self.id
        }

        fn name(&self) -> &str {
            self.id
        }

        fn supported_kinds(&self) -> &[MediaKind] {
            &[MediaKind::Movie]
        }

        fn categories(&self) -> &[Category] {
            &[]
        }

        async fn list_category(&self, _token: &str, _page: u32) -> Result<CatalogPage> {
            Ok(CatalogPage::end())
        }

        async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
            if self.fail {
                return Err(Error::NotFound(query.to_string()));
            }
            Ok(CatalogEntry::new(format!("{}/{query}", self.id), query, self.id)
                .into_iter()
                .collect())
        }

        async fn load_item(&self, id: &str) -> Result<ItemDetail> {
            Err(Error::InvalidId(id.to_string()))
        }

        async fn resolve_streams(&self, _load_data: &str) -> Result<ResolvedStreams> {
            Ok(ResolvedStreams::new())
        }
    }

    fn registry() -> AdapterRegistry {
        let mut registry = AdapterRegistry::new(Arc::new(ExtractorRegistry::new()));
        registry.add_adapter(FixedAdapter { id: "b", fail: false });
        registry.add_adapter(FixedAdapter { id: "broken", fail: true });
        registry.add_adapter(FixedAdapter { id: "a", fail: false });
        registry
    }

    #[tokio::test]
    async fn test_search_all_keeps_registration_order() {
        let results = registry().search_all("dune").await;
        let ids: Vec<_> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(results[0].1[0].id, "b/dune");
    }

    #[tokio::test]
    async fn test_unknown_adapter() {
        let err = registry().search("nope", "dune").await.unwrap_err();
        assert!(matches!(err, Error::UnknownAdapter(id) if id == "nope"));
    }

    #[test]
    fn test_same_id_replaces() {
        let mut registry = registry();
        registry.add_adapter(FixedAdapter { id: "a", fail: true });
        assert_eq!(registry.adapters().len(), 3);
    }
}
