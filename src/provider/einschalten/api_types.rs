use crate::provider::lenient;
use serde::Deserialize;
use serde_json::Value;

/// `__data.json` payload of a page
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataResponse {
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::items")]
    pub nodes: Vec<Node>,
}

/// One route node; its data is a flat array with objects and arrays as schema markers
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Option<Vec<Value>>,
}

impl DataResponse {
    /// Non-null values of the first data node
    pub fn data_values(self) -> Vec<Value> {
        self.nodes
            .into_iter()
            .find(|n| n.kind == "data")
            .and_then(|n| n.data)
            .unwrap_or_default()
            .into_iter()
            .filter(|v| !v.is_null())
            .collect()
    }
}

/// `api/movies/{id}/watch`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatchResponse {
    #[serde(deserialize_with = "lenient::string")]
    pub release_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub stream_url: String,
}
