use crate::provider::lenient;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BrowseResponse {
    #[serde(deserialize_with = "lenient::items")]
    pub movies: Vec<Media>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Media {
    #[serde(rename = "_id", deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub original_title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub poster_path: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub backdrop_path: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub year: Option<i32>,
    #[serde(rename = "totalEpisodes", deserialize_with = "lenient::opt_string")]
    pub total_episodes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MediaDetail {
    #[serde(rename = "_id", deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    /// 1 for series
    #[serde(deserialize_with = "lenient::opt_number")]
    pub tv: Option<i32>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub poster_path: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub backdrop_path: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub year: Option<i32>,
    /// Comma-separated
    #[serde(deserialize_with = "lenient::opt_string")]
    pub genres: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub storyline: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub overview: Option<String>,
    #[serde(deserialize_with = "lenient::items")]
    pub streams: Vec<Stream>,
    #[serde(deserialize_with = "lenient::items")]
    pub cast: Vec<String>,
}

/// One hoster link; series streams carry their episode number in `e`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Stream {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub stream: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub e: Option<i32>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub e_title: Option<String>,
}
