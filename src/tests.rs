//! Adapter scenarios against a mock site

#[cfg(test)]
mod listing_tests {
    use crate::{
        ArteAdapter, ExtractorRegistry, FilmpalastAdapter, HttpClient, MediaCccAdapter,
        SiteAdapter, XcineAdapter, provider::xcine::XcineSite,
    };
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn listing_page(count: usize) -> String {
        let articles: String = (1..=count)
            .map(|i| {
                format!(
                    r#"<article class="liste"><a href="/stream/film-{i}" title="Film {i}"></a><img src="/files/{i}.jpg"></article>"#
                )
            })
            .collect();
        format!(r#"<html><body><div id="content">{articles}</div></body></html>"#)
    }

    #[tokio::test]
    async fn test_category_keeps_site_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(20)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(0)))
            .mount(&server)
            .await;

        let adapter = FilmpalastAdapter::new(
            server.uri(),
            HttpClient::new().unwrap(),
            Arc::new(ExtractorRegistry::new()),
        );

        let first = adapter.list_category("new", 1).await.unwrap();
        assert_eq!(first.entries.len(), 20);
        assert!(first.has_more);
        let titles: Vec<_> = first.entries.iter().map(|e| e.title.clone()).collect();
        let expected: Vec<_> = (1..=20).map(|i| format!("Film {i}")).collect();
        assert_eq!(titles, expected);
        assert_eq!(first.entries[0].id, format!("{}/stream/film-1", server.uri()));

        let second = adapter.list_category("new", 2).await.unwrap();
        assert!(second.entries.is_empty());
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_page_of_unparsable_items_keeps_paging() {
        let server = MockServer::start().await;
        let broken = r#"<div id="content"><article class="liste"><span>Werbung</span></article><article class="liste"><span>Werbung</span></article></div>"#;
        Mock::given(method("GET"))
            .and(path("/movies/top/page/3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(broken))
            .mount(&server)
            .await;

        let adapter = FilmpalastAdapter::new(
            server.uri(),
            HttpClient::new().unwrap(),
            Arc::new(ExtractorRegistry::new()),
        );

        let page = adapter.list_category("movies", 3).await.unwrap();
        assert!(page.entries.is_empty());
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn test_unknown_category() {
        let adapter = FilmpalastAdapter::new(
            "http://127.0.0.1:9".to_string(),
            HttpClient::new().unwrap(),
            Arc::new(ExtractorRegistry::new()),
        );

        let err = adapter.list_category("nope", 1).await.unwrap_err();
        assert!(matches!(err, crate::Error::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/events/search"))
            .and(query_param("q", "nichts da"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events": []})))
            .mount(&server)
            .await;

        let adapter = MediaCccAdapter::new(server.uri(), HttpClient::new().unwrap());
        let results = adapter.search("nichts da").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/events/recent"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter = MediaCccAdapter::new(server.uri(), HttpClient::new().unwrap());
        let err = adapter.list_category("recent", 1).await.unwrap_err();
        assert!(matches!(err, crate::Error::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_malformed_event_does_not_lose_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/events/recent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events": [
                {"guid": "a", "title": "Good talk"},
                {"guid": "b", "title": null},
                "garbage",
                {"guid": "c", "title": "Other talk", "date": "2023-12-27", "persons": ["Alice", null], "duration": "3600"}
            ]})))
            .mount(&server)
            .await;

        let adapter = MediaCccAdapter::new(server.uri(), HttpClient::new().unwrap());
        let page = adapter.list_category("recent", 1).await.unwrap();

        let ids: Vec<_> = page.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(page.entries[1].year, Some(2023));
    }

    #[tokio::test]
    async fn test_search_drops_topic_tiles() {
        let server = MockServer::start().await;
        let proxy = "/api/rproxy/emac/v4/de/web";
        Mock::given(method("GET"))
            .and(path(format!("{proxy}/pages/SEARCH")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": {"zones": [{"id": "search-zone"}]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{proxy}/zones/search-zone/content")))
            .and(query_param("query", "nordsee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": {"data": [
                {"id": "a", "title": "Die Nordsee", "url": "/de/videos/100-000-A/nordsee/", "kind": {"code": "SHOW"}},
                {"id": "b", "title": "Meere", "url": "/de/videos/RC-9/meere/", "kind": {"code": "TOPIC"}},
                {"id": "c", "title": "Wattenmeer", "url": "/de/videos/RC-3/watt/", "kind": {"code": "TV_SERIES", "isCollection": true}}
            ]}})))
            .mount(&server)
            .await;

        let adapter = ArteAdapter::new(server.uri(), server.uri(), HttpClient::new().unwrap());
        let results = adapter.search("nordsee").await.unwrap();

        let titles: Vec<_> = results.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Die Nordsee", "Wattenmeer"]);
    }

    #[tokio::test]
    async fn test_numbers_sent_as_strings_are_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/browse/"))
            .and(query_param("type", "movies"))
            .and(query_param("order_by", "trending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"movies": [
                {"_id": "m1", "title": "Erster", "year": "2021"},
                {"_id": "m2", "title": null, "original_title": null},
                {"_id": "m3", "title": "Dritter", "year": 2019, "totalEpisodes": 8}
            ]})))
            .mount(&server)
            .await;

        let site = XcineSite {
            id: "xcineio".to_string(),
            name: "XcineIO".to_string(),
            main_url: server.uri(),
            api_url: server.uri(),
        };
        let adapter = XcineAdapter::new(
            site,
            HttpClient::new().unwrap(),
            Arc::new(ExtractorRegistry::new()),
        );

        let page = adapter.list_category("movies-trending", 1).await.unwrap();
        let years: Vec<_> = page.entries.iter().map(|e| (e.id.as_str(), e.year)).collect();
        assert_eq!(years, vec![("m1", Some(2021)), ("m3", Some(2019))]);
        assert!(page.has_more);
    }
}

#[cfg(test)]
mod load_tests {
    use crate::{
        ArteAdapter, HttpClient, MediaCccAdapter, MediaKind, SiteAdapter, provider::LoadToken,
    };
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn episode(url: &str, title: &str) -> Value {
        json!({"id": url, "url": url, "title": title, "kind": {"code": "SHOW"}, "duration": 3120})
    }

    #[tokio::test]
    async fn test_series_episodes_sorted_across_paginated_seasons() {
        let server = MockServer::start().await;
        let proxy = "/api/rproxy/emac/v4/de/web";

        Mock::given(method("GET"))
            .and(path(format!("{proxy}/collections/RC-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": {
                    "metadata": {"title": "Die Serie", "description": "Eine Serie.", "og": {"image": {"url": "https://img.example/s.jpg"}}},
                    "zones": [
                        {
                            "id": "teaser_RC-1",
                            "displayOptions": {"template": "single-collectionContent"},
                            "content": {"data": [episode("/de/videos/999-000-A/trailer/", "Trailer")]}
                        },
                        {
                            "id": "z2_RC-1_RC-1-2",
                            "slug": "staffel-2",
                            "displayOptions": {"template": "horizontal"},
                            "content": {
                                "data": [episode("/de/videos/200-001-A/folge/", "Die Serie (1/2)")],
                                "pagination": {"page": 1, "pages": 2}
                            }
                        },
                        {
                            "id": "z1_RC-1",
                            "slug": "staffel-1",
                            "displayOptions": {"template": "horizontal"},
                            "content": {
                                "data": [
                                    episode("/de/videos/100-002-A/folge/", "Die Serie (2/2)"),
                                    episode("/de/videos/100-001-A/folge/", "Die Serie (1/2)")
                                ],
                                "pagination": {"page": 1, "pages": 1}
                            }
                        }
                    ]
                }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{proxy}/zones/z2/content")))
            .and(query_param("page", "2"))
            .and(query_param("collectionId", "RC-1"))
            .and(query_param("subCollectionId", "RC-1-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": {
                    "data": [episode("/de/videos/200-002-A/folge/", "Die Serie (2/2)")],
                    "pagination": {"page": 2, "pages": 2}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = ArteAdapter::new(server.uri(), server.uri(), HttpClient::new().unwrap());
        let detail = adapter
            .load_item(&format!("{}/de/videos/RC-1/die-serie/", server.uri()))
            .await
            .unwrap();

        assert_eq!(detail.kind, MediaKind::Series);
        assert_eq!(detail.title, "Die Serie");
        let episodes = detail.episodes.unwrap();
        let order: Vec<_> = episodes
            .iter()
            .map(|e| {
                (
                    e.season,
                    e.episode,
                    LoadToken::<String>::decode("arte", &e.load_data).unwrap(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                (Some(1), Some(1), "100-001-A".to_string()),
                (Some(1), Some(2), "100-002-A".to_string()),
                (Some(2), Some(1), "200-001-A".to_string()),
                (Some(2), Some(2), "200-002-A".to_string()),
            ]
        );
        assert_eq!(episodes[0].runtime, Some(52));
    }

    #[tokio::test]
    async fn test_coming_soon_resolves_to_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/events/upcoming-talk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "guid": "upcoming-talk",
                "title": "Angekündigter Vortrag",
                "recordings": []
            })))
            .mount(&server)
            .await;

        let adapter = MediaCccAdapter::new(server.uri(), HttpClient::new().unwrap());
        let detail = adapter.load_item("upcoming-talk").await.unwrap();
        assert!(detail.coming_soon);

        let resolved = adapter
            .resolve_streams(detail.load_data.as_deref().unwrap())
            .await
            .unwrap();
        assert!(resolved.is_empty());
        assert!(resolved.skipped.is_empty());
    }
}

#[cfg(test)]
mod resolve_tests {
    use crate::{
        AdapterRegistry, ArteAdapter, ExtractorRegistry, FilmpalastAdapter, HttpClient,
        MediaCccAdapter, SiteAdapter, SkipReason, StreamKind,
        extractor::Vidoza,
        provider::discovery::{DiscoveryAdapter, sites},
    };
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path, query_param},
    };

    async fn mount_event(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/public/events/talk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "guid": "talk",
                "title": "Ein Vortrag",
                "recordings": [
                    {"mime_type": "video/mp4", "language": "deu", "folder": "h264-hd", "height": 1080, "recording_url": "https://cdn.example/hd.mp4"},
                    {"mime_type": "audio/opus", "language": "deu", "folder": "opus", "recording_url": "https://cdn.example/a.opus"},
                    {"mime_type": "video/webm", "language": "deu", "folder": "webm-sd", "height": 576, "recording_url": "https://cdn.example/sd.webm"},
                    {"mime_type": "text/vtt", "language": "eng", "folder": "vtt", "recording_url": "https://cdn.example/en.vtt"},
                    {"mime_type": "video/mp4", "language": "eng", "folder": "h264-hd", "height": 1080, "recording_url": "https://cdn.example/hd-en.mp4"}
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_every_candidate_is_kept_in_order() {
        let server = MockServer::start().await;
        mount_event(&server).await;

        let adapter = MediaCccAdapter::new(server.uri(), HttpClient::new().unwrap());
        let detail = adapter.load_item("talk").await.unwrap();
        let resolved = adapter
            .resolve_streams(detail.load_data.as_deref().unwrap())
            .await
            .unwrap();

        let urls: Vec<_> = resolved.streams.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example/hd.mp4",
                "https://cdn.example/sd.webm",
                "https://cdn.example/hd-en.mp4"
            ]
        );
        assert_eq!(resolved.subtitles.len(), 1);
        assert_eq!(resolved.skipped.len(), 1);
        assert!(matches!(resolved.skipped[0].reason, SkipReason::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_foreign_token_is_rejected() {
        let server = MockServer::start().await;
        mount_event(&server).await;

        let extractors = Arc::new(ExtractorRegistry::new());
        let mut registry = AdapterRegistry::new(extractors);
        registry.add_adapter(MediaCccAdapter::new(server.uri(), HttpClient::new().unwrap()));
        registry.add_adapter(ArteAdapter::new(
            server.uri(),
            server.uri(),
            HttpClient::new().unwrap(),
        ));

        let detail = registry.load_item("mediaccc", "talk").await.unwrap();
        let token = detail.load_data.unwrap();

        let err = registry.resolve_streams("arte", &token).await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::TokenMismatch { ref expected, ref found } if expected == "arte" && found == "mediaccc"
        ));

        let err = registry.resolve_streams("arte", "not a token").await.unwrap_err();
        assert!(matches!(err, crate::Error::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_token_gated_playback() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feloma/page/der-film/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Der Film",
                "slug": "der-film",
                "datePublished": "2024-03-01",
                "blocks": [{"title": "Der Film", "videoId": "v-42"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/token"))
            .and(query_param("realm", "dmaxde"))
            .and(header("X-disco-params", "realm=dmaxde"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"attributes": {"token": "short-lived"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/playback/v3/videoPlaybackInfo"))
            .and(header("Authorization", "Bearer short-lived"))
            .and(body_partial_json(json!({
                "videoId": "v-42",
                "deviceInfo": {"adBlocker": false, "drmSupported": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"attributes": {"streaming": [
                    {"url": "https://cdn.example/v-42/master.m3u8", "type": "hls"},
                    {"url": "https://cdn.example/v-42/drm.mpd", "type": "dash", "protection": {"drmEnabled": true}},
                    {"url": "https://cdn.example/v-42/index.mpd", "type": "dash", "fallback": true}
                ]}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut site = sites().remove(0);
        site.main_url = server.uri();
        site.api_url = server.uri();
        site.metadata_url = server.uri();
        let adapter = DiscoveryAdapter::new(site, HttpClient::new().unwrap());

        let detail = adapter
            .load_item(&format!("{}/sendungen/der-film", server.uri()))
            .await
            .unwrap();
        assert!(!detail.coming_soon);

        let resolved = adapter
            .resolve_streams(detail.load_data.as_deref().unwrap())
            .await
            .unwrap();

        assert_eq!(resolved.streams.len(), 2);
        assert_eq!(resolved.streams[0].kind, StreamKind::Hls);
        assert_eq!(resolved.streams[1].label, "DMAX DASH (fallback)");
        assert_eq!(resolved.skipped.len(), 1);
        assert_eq!(resolved.skipped[0].url, "https://cdn.example/v-42/drm.mpd");
    }

    #[tokio::test]
    async fn test_hoster_links_are_delegated() {
        let server = MockServer::start().await;
        let base = server.uri();

        Mock::given(method("GET"))
            .and(path("/stream/der-film"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<div id="content">
                    <h2 class="rb bgDark">Der Film</h2>
                    <ul class="currentStreamLinks">
                        <li><a class="iconPlay" href="{base}/files/direct.mp4"></a></li>
                        <li><a class="iconPlay" href="https://unknown.invalid/e/1"></a></li>
                        <li><a class="iconPlay" data-player-url="{base}/vidoza/embed-1.html"></a></li>
                    </ul>
                </div>"#
            )))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/vidoza/embed-1.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<video><source src="{base}/cdn/v.mp4" type="video/mp4" res="720"></video>"#
            )))
            .mount(&server)
            .await;

        let mut extractors = ExtractorRegistry::new();
        extractors.add(Vidoza::new("Vidoza", format!("{base}/vidoza")));
        let adapter =
            FilmpalastAdapter::new(base.clone(), HttpClient::new().unwrap(), Arc::new(extractors));

        let detail = adapter
            .load_item(&format!("{base}/stream/der-film"))
            .await
            .unwrap();
        let resolved = adapter
            .resolve_streams(detail.load_data.as_deref().unwrap())
            .await
            .unwrap();

        let urls: Vec<_> = resolved.streams.iter().map(|s| s.url.clone()).collect();
        assert_eq!(urls, vec![format!("{base}/files/direct.mp4"), format!("{base}/cdn/v.mp4")]);
        assert_eq!(resolved.streams[1].quality, Some(720));
        assert!(resolved.streams[1].label.ends_with("720p"));

        assert_eq!(resolved.skipped.len(), 1);
        assert_eq!(resolved.skipped[0].url, "https://unknown.invalid/e/1");
        assert_eq!(resolved.skipped[0].reason, SkipReason::NoExtractor);
    }

    #[tokio::test]
    async fn test_all_hosters_failing_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stream/kaputt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div id="content"><h2 class="rb bgDark">Kaputt</h2>
                   <ul class="currentStreamLinks"><li><a class="iconPlay" href="https://unknown.invalid/e/2"></a></li></ul>
                </div>"#,
            ))
            .mount(&server)
            .await;

        let adapter = FilmpalastAdapter::new(
            server.uri(),
            HttpClient::new().unwrap(),
            Arc::new(ExtractorRegistry::new()),
        );
        let detail = adapter
            .load_item(&format!("{}/stream/kaputt", server.uri()))
            .await
            .unwrap();

        let err = adapter
            .resolve_streams(detail.load_data.as_deref().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::NoStreams(_)));
    }
}

#[cfg(test)]
mod registry_tests {
    use crate::{Settings, create_default_registry};

    #[test]
    fn test_default_registry_has_all_adapters() {
        let registry = create_default_registry(&Settings::default()).unwrap();
        let ids: Vec<_> = registry.adapters().iter().map(|a| a.id().to_string()).collect();

        assert_eq!(
            ids,
            vec![
                "dmax",
                "tlc",
                "xcineio",
                "movie4k",
                "streamcloud",
                "serienstream",
                "mediaccc",
                "arte",
                "filmpalast",
                "einschalten",
                "kinoger"
            ]
        );
        assert!(registry.extractors().find("https://voe.sx/e/abc").is_some());
    }

    #[test]
    fn test_enabled_filter_and_overrides() {
        let settings = Settings::from_toml(
            r#"
            [adapters]
            enabled = ["arte", "MediaCCC", "kinoger"]

            [adapters.overrides.kinoger]
            main_url = "https://kinoger.example/"
            "#,
        )
        .unwrap();

        let registry = create_default_registry(&settings).unwrap();
        let ids: Vec<_> = registry.adapters().iter().map(|a| a.id().to_string()).collect();
        assert_eq!(ids, vec!["mediaccc", "arte", "kinoger"]);
        assert!(matches!(
            registry.get("dmax"),
            Err(crate::Error::UnknownAdapter(_))
        ));
    }
}
