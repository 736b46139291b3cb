use crate::provider::lenient;
use serde::Deserialize;

// EMAC proxy responses (www.arte.tv/api/rproxy/emac)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ZonePageResponse {
    pub value: ZonePage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ZonePage {
    #[serde(deserialize_with = "lenient::items")]
    pub zones: Vec<Zone>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Zone {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    pub content: Option<ZoneContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ZoneContent {
    #[serde(deserialize_with = "lenient::items")]
    pub data: Vec<ResultItem>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Pagination {
    #[serde(rename = "page", deserialize_with = "lenient::number_or_default")]
    pub current_page: u32,
    #[serde(deserialize_with = "lenient::number_or_default")]
    pub pages: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ZoneContentResponse {
    pub value: ZoneContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultItem {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub kind: Kind,
    pub main_image: Option<Image>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub short_description: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    pub availability: Option<Availability>,
    /// Seconds
    #[serde(deserialize_with = "lenient::opt_number")]
    pub duration: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub program_id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Kind {
    #[serde(deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_collection: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Image {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Availability {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub start: Option<String>,
}

/// `collections/{id}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CollectionResponse {
    pub value: Collection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Collection {
    #[serde(deserialize_with = "lenient::or_default")]
    pub metadata: CollectionMetadata,
    #[serde(deserialize_with = "lenient::items")]
    pub zones: Vec<CollectionZone>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CollectionMetadata {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub og: Og,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Og {
    #[serde(deserialize_with = "lenient::or_default")]
    pub image: Image,
}

/// A season (or the collection teaser) of a series
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionZone {
    /// `{zoneId}_{collectionId}[_{subCollectionId}]`
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub display_options: DisplayOptions,
    #[serde(deserialize_with = "lenient::or_default")]
    pub content: ZoneContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    #[serde(deserialize_with = "lenient::string")]
    pub template: String,
}

// Player API (api.arte.tv/api/player/v2)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayerConfigResponse {
    pub data: PlayerData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayerData {
    #[serde(deserialize_with = "lenient::or_default")]
    pub attributes: PlayerAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayerAttributes {
    #[serde(deserialize_with = "lenient::or_default")]
    pub metadata: PlayerMetadata,
    pub rights: Option<Rights>,
    #[serde(deserialize_with = "lenient::items")]
    pub streams: Vec<Stream>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlayerMetadata {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub images: Vec<Image>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub duration: Duration,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Duration {
    #[serde(deserialize_with = "lenient::number_or_default")]
    pub seconds: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Rights {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub begin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stream {
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(deserialize_with = "lenient::items")]
    pub versions: Vec<Version>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub main_quality: Quality,
    /// "HLS", "HLS_NG", "DASH", ...
    #[serde(deserialize_with = "lenient::string")]
    pub protocol: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Version {
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
    #[serde(deserialize_with = "lenient::string")]
    pub short_label: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Quality {
    #[serde(deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
}
