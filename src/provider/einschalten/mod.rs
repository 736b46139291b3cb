mod api_types;
mod provider;

pub use provider::{EinschaltenAdapter, MAIN_URL};
