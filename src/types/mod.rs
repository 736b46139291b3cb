mod media;
mod stream;

pub use media::{CatalogEntry, CatalogPage, Category, MediaKind, year_from_date};
pub use stream::{
    EpisodeRef, ItemDetail, ResolvedStreams, SkipReason, SkippedSource, StreamCandidate,
    StreamKind, SubtitleTrack, sort_episodes,
};
