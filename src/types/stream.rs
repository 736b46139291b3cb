use super::{CatalogEntry, MediaKind};
use serde::{Deserialize, Serialize};

/// Full detail of one item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    /// Stable id this detail was loaded from
    pub id: String,
    pub title: String,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
    pub year: Option<i32>,
    /// Runtime in minutes
    pub duration_minutes: Option<i32>,
    pub tags: Vec<String>,
    pub cast: Vec<String>,
    pub kind: MediaKind,
    /// Season/episode tree, present only for series
    pub episodes: Option<Vec<EpisodeRef>>,
    /// Load data of a flat playable item (movies)
    pub load_data: Option<String>,
    /// The site lists the item but has no streams yet
    pub coming_soon: bool,
    pub recommendations: Vec<CatalogEntry>,
    /// Adapter id that produced the detail
    pub adapter: String,
}

impl ItemDetail {
    /// Create a detail with the required fields
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: MediaKind,
        adapter: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into().trim().to_string(),
            kind,
            adapter: adapter.into(),
            ..Default::default()
        }
    }

    /// Attach episodes, sorted by season then episode
    pub fn with_episodes(mut self, mut episodes: Vec<EpisodeRef>) -> Self {
        sort_episodes(&mut episodes);
        self.episodes = Some(episodes);
        self
    }

    /// Attach the load data of a flat playable item
    pub fn with_load_data(mut self, load_data: String) -> Self {
        self.load_data = Some(load_data);
        self
    }

    pub fn is_series(&self) -> bool {
        self.episodes.is_some()
    }
}

/// One episode of a series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: Option<i32>,
    pub episode: Option<i32>,
    pub title: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
    /// Runtime in minutes
    pub runtime: Option<i32>,
    /// Adapter-private token passed back unchanged to `resolve_streams`
    pub load_data: String,
}

impl EpisodeRef {
    pub fn new(load_data: String) -> Self {
        Self {
            load_data,
            ..Default::default()
        }
    }

    pub fn with_numbers(mut self, season: Option<i32>, episode: Option<i32>) -> Self {
        self.season = season;
        self.episode = episode;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }
}

/// Sort episodes by season then episode number.
///
/// The sort is stable: episodes without numbers keep the site order among
/// themselves and sort before numbered ones of the same season.
pub fn sort_episodes(episodes: &mut [EpisodeRef]) {
    episodes.sort_by_key(|e| (e.season.unwrap_or(0), e.episode.unwrap_or(0)));
}

/// How a stream URL is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Progressive download of a media file
    File,
    /// HLS playlist
    Hls,
    /// DASH manifest
    Dash,
    /// Third-party player page that still needs an extractor
    Embedded,
}

impl StreamKind {
    /// Classify a URL by its path extension
    pub fn classify(url: &str) -> Self {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if path.ends_with(".m3u8") || path.contains(".m3u8/") {
            Self::Hls
        } else if path.ends_with(".mpd") {
            Self::Dash
        } else if [".mp4", ".webm", ".mkv", ".mov", ".m4v", ".ts"]
            .iter()
            .any(|ext| path.ends_with(ext))
        {
            Self::File
        } else {
            Self::Embedded
        }
    }

    /// Classify by an explicit MIME type or protocol marker, falling back to the URL
    pub fn from_hint(hint: &str, url: &str) -> Option<Self> {
        let hint = hint.to_ascii_lowercase();
        match hint.as_str() {
            "hls" | "application/x-mpegurl" | "application/vnd.apple.mpegurl" => Some(Self::Hls),
            "dash" | "application/dash+xml" => Some(Self::Dash),
            h if h.starts_with("video/") => Some(Self::File),
            "" => Some(Self::classify(url)),
            _ => None,
        }
    }

    pub fn is_playable(self) -> bool {
        !matches!(self, Self::Embedded)
    }
}

/// One playable stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCandidate {
    pub url: String,
    /// Label shown to the user, encodes host and language where known
    pub label: String,
    pub kind: StreamKind,
    /// Vertical resolution when known
    pub quality: Option<u32>,
    pub language: Option<String>,
    /// Referer the player must send
    pub referer: Option<String>,
}

impl StreamCandidate {
    /// Create a candidate, classifying the URL by extension
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        let url = url.into();
        let kind = StreamKind::classify(&url);
        Self {
            url,
            label: label.into(),
            // a direct URL without a known extension is still a file to the player
            kind: if kind.is_playable() { kind } else { StreamKind::File },
            quality: None,
            language: None,
            referer: None,
        }
    }

    pub fn with_kind(mut self, kind: StreamKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_quality(mut self, quality: Option<u32>) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }
}

/// A subtitle file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub language: String,
    pub url: String,
}

impl SubtitleTrack {
    pub fn new(language: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            url: url.into(),
        }
    }
}

/// Why a source did not produce a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No extractor is registered for the host
    NoExtractor,
    /// The extractor ran but failed
    ExtractorFailed(String),
    /// Recognized entry of a kind we do not play (container, MIME, DRM)
    UnsupportedFormat(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoExtractor => write!(f, "no extractor for host"),
            Self::ExtractorFailed(e) => write!(f, "extractor failed: {e}"),
            Self::UnsupportedFormat(kind) => write!(f, "unsupported format: {kind}"),
        }
    }
}

/// A source that was dropped from a resolution result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSource {
    pub url: String,
    pub reason: SkipReason,
}

/// Everything `resolve_streams` found for one load token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStreams {
    pub streams: Vec<StreamCandidate>,
    pub subtitles: Vec<SubtitleTrack>,
    pub skipped: Vec<SkippedSource>,
}

impl ResolvedStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_stream(&mut self, stream: StreamCandidate) {
        self.streams.push(stream);
    }

    pub fn push_subtitle(&mut self, subtitle: SubtitleTrack) {
        self.subtitles.push(subtitle);
    }

    pub fn skip(&mut self, url: impl Into<String>, reason: SkipReason) {
        self.skipped.push(SkippedSource {
            url: url.into(),
            reason,
        });
    }

    /// Append another result, keeping order
    pub fn extend(&mut self, other: ResolvedStreams) {
        self.streams.extend(other.streams);
        self.subtitles.extend(other.subtitles);
        self.skipped.extend(other.skipped);
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Fail when `sources` were offered but none produced a stream
    pub fn require_streams(self, sources: usize, what: &str) -> crate::Result<Self> {
        if sources > 0 && self.streams.is_empty() {
            let reasons = self
                .skipped
                .iter()
                .map(|s| format!("{} ({})", s.url, s.reason))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(crate::Error::NoStreams(format!(
                "{what}: {sources} source(s) yielded nothing [{reasons}]"
            )));
        }

        Ok(self)
    }
}
