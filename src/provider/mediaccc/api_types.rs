use crate::provider::lenient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventsResponse {
    #[serde(deserialize_with = "lenient::items")]
    pub events: Vec<Event>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "lenient::string")]
    pub guid: String,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub persons: Vec<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    /// Seconds
    #[serde(deserialize_with = "lenient::opt_number")]
    pub duration: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub thumb_url: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub poster_url: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub conference_title: Option<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub recordings: Vec<Recording>,
}

/// One file of an event: a video encoding, an audio track or subtitles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recording {
    #[serde(deserialize_with = "lenient::string")]
    pub mime_type: String,
    #[serde(deserialize_with = "lenient::string")]
    pub language: String,
    /// Encoding folder such as "h264-hd" or "webm-sd"
    #[serde(deserialize_with = "lenient::string")]
    pub folder: String,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub height: Option<u32>,
    #[serde(deserialize_with = "lenient::flag")]
    pub high_quality: bool,
    #[serde(deserialize_with = "lenient::string")]
    pub recording_url: String,
}
