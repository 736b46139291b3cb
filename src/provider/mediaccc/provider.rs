use super::api_types::{Event, EventsResponse, Recording};
use crate::{
    Error, Result,
    provider::{HttpClient, LoadToken, SiteAdapter},
    types::{
        CatalogEntry, CatalogPage, Category, ItemDetail, MediaKind, ResolvedStreams, SkipReason,
        StreamCandidate, StreamKind, SubtitleTrack, year_from_date,
    },
};
use async_trait::async_trait;
use tracing::{debug, info};

pub const API_URL: &str = "https://api.media.ccc.de";
const ID: &str = "mediaccc";

const CATEGORIES: &[Category] = &[Category::new("recent", "Recent events")];
const KINDS: &[MediaKind] = &[MediaKind::Other];

/// What a recording contributes to a resolution result
#[derive(Debug, PartialEq)]
enum RecordingUse {
    Stream(StreamCandidate),
    Subtitle(SubtitleTrack),
    Unsupported(String),
}

fn classify_recording(recording: &Recording) -> RecordingUse {
    let mime = recording.mime_type.to_ascii_lowercase();

    if mime.starts_with("video") {
        let label = if recording.folder.is_empty() {
            format!("media.ccc.de ({})", recording.language)
        } else {
            format!("media.ccc.de ({}, {})", recording.language, recording.folder)
        };
        let kind = StreamKind::from_hint(&mime, &recording.recording_url)
            .unwrap_or(StreamKind::File);

        RecordingUse::Stream(
            StreamCandidate::new(&recording.recording_url, label)
                .with_kind(kind)
                .with_quality(recording.height)
                .with_language(Some(recording.language.clone())),
        )
    } else if mime.starts_with("text") {
        RecordingUse::Subtitle(SubtitleTrack::new(
            &recording.language,
            &recording.recording_url,
        ))
    } else {
        RecordingUse::Unsupported(recording.mime_type.clone())
    }
}

/// Adapter for the media.ccc.de conference recordings API
pub struct MediaCccAdapter {
    api_url: String,
    client: HttpClient,
}

impl MediaCccAdapter {
    pub fn new(api_url: String, client: HttpClient) -> Self {
        Self { api_url, client }
    }

    fn event_to_entry(event: Event) -> Option<CatalogEntry> {
        let year = event.date.as_deref().and_then(year_from_date);
        Some(
            CatalogEntry::new(event.guid, event.title, ID)?
                .with_kind(MediaKind::Other)
                .with_year(year)
                .with_poster(event.thumb_url.or(event.poster_url)),
        )
    }

    fn map_events(response: EventsResponse) -> Vec<CatalogEntry> {
        response
            .events
            .into_iter()
            .filter_map(Self::event_to_entry)
            .collect()
    }

    fn event_to_detail(event: Event) -> Result<ItemDetail> {
        let mut detail = ItemDetail::new(&event.guid, &event.title, MediaKind::Other, ID);
        if detail.title.is_empty() {
            return Err(Error::NotFound(format!("{ID}: event {} has no title", event.guid)));
        }

        detail.poster_url = event.poster_url.or(event.thumb_url);
        detail.tags = event.tags;
        detail.cast = event.persons;
        detail.plot = event.description.or(event.subtitle);
        detail.duration_minutes = event.duration.map(|s| (s / 60) as i32);
        detail.year = event.date.as_deref().and_then(year_from_date);
        detail.coming_soon = event.recordings.is_empty();

        Ok(detail.with_load_data(LoadToken::encode(ID, event.recordings)?))
    }
}

#[async_trait]
impl SiteAdapter for MediaCccAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn name(&self) -> &str {
        "media.ccc.de"
    }

    fn supported_kinds(&self) -> &[MediaKind] {
        KINDS
    }

    fn categories(&self) -> &[Category] {
        CATEGORIES
    }

    async fn list_category(&self, token: &str, page: u32) -> Result<CatalogPage> {
        self.category(token)?;
        info!("{ID}: listing {} page {}", token, page);

        if page > 1 {
            return Ok(CatalogPage::end());
        }

        let response: EventsResponse = self
            .client
            .get_json(&format!("{}/public/events/recent", self.api_url))
            .await?;

        Ok(CatalogPage::new(Self::map_events(response), false))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        info!("{ID}: searching {:?}", query);

        let response: EventsResponse = self
            .client
            .get_json(&format!(
                "{}/public/events/search?q={}",
                self.api_url,
                urlencoding::encode(query)
            ))
            .await?;

        Ok(Self::map_events(response))
    }

    async fn load_item(&self, id: &str) -> Result<ItemDetail> {
        if id.trim().is_empty() || id.contains(['/', '?', '#']) {
            return Err(Error::InvalidId(id.to_string()));
        }
        info!("{ID}: loading {}", id);

        let event: Event = self
            .client
            .get_json(&format!("{}/public/events/{}", self.api_url, id))
            .await?;

        Self::event_to_detail(event)
    }

    async fn resolve_streams(&self, load_data: &str) -> Result<ResolvedStreams> {
        let recordings: Vec<Recording> = LoadToken::decode(ID, load_data)?;

        let mut resolved = ResolvedStreams::new();
        for recording in &recordings {
            match classify_recording(recording) {
                RecordingUse::Stream(stream) => resolved.push_stream(stream),
                RecordingUse::Subtitle(track) => resolved.push_subtitle(track),
                RecordingUse::Unsupported(mime) => {
                    debug!("{ID}: skipping {} recording", mime);
                    resolved.skip(&recording.recording_url, SkipReason::UnsupportedFormat(mime));
                }
            }
        }

        resolved.require_streams(recordings.len(), "media.ccc.de event")
    }
}
