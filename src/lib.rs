//! Site adapters for streaming websites.
//!
//! Every adapter implements [`SiteAdapter`]: list a category page, search,
//! load an item (with its season/episode tree for series) and resolve the
//! opaque load data of a movie or episode into playable streams. Embedded
//! third-party players are handed to the [`ExtractorRegistry`].

pub mod config;
pub mod extractor;
pub mod logging;
pub mod provider;
pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;

pub use crate::config::{HttpConfig, LoggingConfig, Settings, SiteOverride};
pub use extractor::{EmbedLink, Extractor, ExtractorRegistry};
pub use provider::{
    ArteAdapter, DiscoveryAdapter, EinschaltenAdapter, FilmpalastAdapter, HttpClient,
    KinogerAdapter, MediaCccAdapter, SerienstreamAdapter, SiteAdapter, XcineAdapter,
};
pub use registry::AdapterRegistry;
pub use types::{
    CatalogEntry, CatalogPage, Category, EpisodeRef, ItemDetail, MediaKind, ResolvedStreams,
    SkipReason, SkippedSource, StreamCandidate, StreamKind, SubtitleTrack,
};

use std::sync::Arc;
use tracing::info;

/// Adapter result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that fail a whole adapter call
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid item id: {0}")]
    InvalidId(String),

    #[error("Load token belongs to adapter {found}, not {expected}")]
    TokenMismatch { expected: String, found: String },

    #[error("Invalid load token: {0}")]
    InvalidToken(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown adapter: {0}")]
    UnknownAdapter(String),

    #[error("No playable streams: {0}")]
    NoStreams(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Create a registry with every built-in adapter enabled by `settings`
pub fn create_default_registry(settings: &Settings) -> Result<AdapterRegistry> {
    let client = HttpClient::from_config(&settings.http)?;
    let extractors = Arc::new(ExtractorRegistry::with_defaults());
    let mut registry = AdapterRegistry::new(extractors.clone());

    let mut candidates: Vec<Arc<dyn SiteAdapter>> = Vec::new();

    for mut site in provider::discovery::sites() {
        if let Some(o) = settings.adapters.override_for(&site.id) {
            o.apply(&mut site.main_url, &mut site.api_url);
        }
        candidates.push(Arc::new(DiscoveryAdapter::new(site, client.clone())));
    }
    for mut site in provider::xcine::sites() {
        if let Some(o) = settings.adapters.override_for(&site.id) {
            o.apply(&mut site.main_url, &mut site.api_url);
        }
        candidates.push(Arc::new(XcineAdapter::new(
            site,
            client.clone(),
            extractors.clone(),
        )));
    }
    candidates.push(Arc::new(SerienstreamAdapter::new(
        settings.adapters.main_url("serienstream", provider::serienstream::MAIN_URL),
        client.clone(),
        extractors.clone(),
    )));
    candidates.push(Arc::new(MediaCccAdapter::new(
        settings.adapters.api_url("mediaccc", provider::mediaccc::API_URL),
        client.clone(),
    )));
    candidates.push(Arc::new(ArteAdapter::new(
        settings.adapters.main_url("arte", provider::arte::MAIN_URL),
        settings.adapters.api_url("arte", provider::arte::API_URL),
        client.clone(),
    )));
    candidates.push(Arc::new(FilmpalastAdapter::new(
        settings.adapters.main_url("filmpalast", provider::filmpalast::MAIN_URL),
        client.clone(),
        extractors.clone(),
    )));
    candidates.push(Arc::new(EinschaltenAdapter::new(
        settings.adapters.main_url("einschalten", provider::einschalten::MAIN_URL),
        client.clone(),
        extractors.clone(),
    )));
    candidates.push(Arc::new(KinogerAdapter::new(
        settings.adapters.main_url("kinoger", provider::kinoger::MAIN_URL),
        client,
        extractors,
    )));

    for adapter in candidates {
        if settings.adapters.is_enabled(adapter.id()) {
            registry.add_shared(adapter);
        }
    }

    info!("Registered {} site adapters", registry.adapters().len());

    Ok(registry)
}
