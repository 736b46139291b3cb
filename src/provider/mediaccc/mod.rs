mod api_types;
mod provider;

pub use provider::{API_URL, MediaCccAdapter};
