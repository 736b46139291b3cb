use crate::provider::lenient;
use serde::{Deserialize, Serialize};

// CMS responses (loma-cms)
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageResponse {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub slug: String,
    #[serde(deserialize_with = "lenient::string")]
    pub date_published: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub meta_description: Option<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub taxonomies: Vec<Taxonomy>,
    pub image: Option<Image>,
    /// Not available in search
    #[serde(deserialize_with = "lenient::items")]
    pub meta_media: Vec<MetaMedia>,
    #[serde(deserialize_with = "lenient::items")]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    #[serde(deserialize_with = "lenient::items")]
    pub data: Vec<PageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Image {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetaMedia {
    #[serde(deserialize_with = "lenient::or_default")]
    pub media: Image,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Block {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub video_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub show_id: Option<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub items: Vec<BlockItem>,
}

/// Homepage teaser or episode of a show block
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockItem {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub alternate_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    /// Milliseconds
    #[serde(deserialize_with = "lenient::opt_number")]
    pub video_duration: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub publish_start: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub episode_number: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub season_number: Option<i64>,
    pub poster: Option<Poster>,
    // only available at homepage
    pub image: Option<Image>,
    pub link: Option<Link>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub page_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Poster {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub src: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
}

// Playback API (disco-api)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub data: TokenData,
}

#[derive(Debug, Deserialize)]
pub struct TokenData {
    pub attributes: TokenAttributes,
}

#[derive(Debug, Deserialize)]
pub struct TokenAttributes {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRequest<'a> {
    pub video_id: &'a str,
    pub device_info: DeviceInfo,
    pub visteria_properties: std::collections::HashMap<String, String>,
}

impl<'a> PlaybackRequest<'a> {
    pub fn new(video_id: &'a str) -> Self {
        Self {
            video_id,
            device_info: DeviceInfo::default(),
            visteria_properties: Default::default(),
        }
    }
}

/// Fixed capabilities: no ad blocker, no DRM, SDR, stereo
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub ad_blocker: bool,
    pub drm_supported: bool,
    pub hdr_capabilities: Vec<&'static str>,
    pub hw_decoding_capabilities: Vec<&'static str>,
    pub sound_capabilities: Vec<&'static str>,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            ad_blocker: false,
            drm_supported: false,
            hdr_capabilities: vec!["SDR"],
            hw_decoding_capabilities: Vec::new(),
            sound_capabilities: vec!["STEREO"],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaybackResponse {
    pub data: PlaybackData,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackData {
    pub attributes: PlaybackAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackAttributes {
    #[serde(deserialize_with = "lenient::items")]
    pub streaming: Vec<Streaming>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Streaming {
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    /// "hls" or "dash"
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub fallback: bool,
    #[serde(deserialize_with = "lenient::or_default")]
    pub protection: Protection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Protection {
    #[serde(deserialize_with = "lenient::flag")]
    pub drm_enabled: bool,
}
