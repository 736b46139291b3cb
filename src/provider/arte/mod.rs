mod api_types;
mod provider;

pub use provider::{API_URL, ArteAdapter, MAIN_URL};
