//! Upstream client and events service against a mocked Events API

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use events_portal::{
    config::AppConfig,
    error::AppError,
    models::{CategoryDto, Event},
    services::events::{EventsService, WriteOutcome},
    upstream::{Lookup, UpstreamClient, UpstreamError},
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.events_api.base_url = Some(base_url.to_string());
    config.events_api.api_key = Some("upstream-key".to_string());
    config
}

async fn setup() -> (MockServer, UpstreamClient) {
    let server = MockServer::start().await;
    let client = UpstreamClient::new(&config(&server.uri())).unwrap();
    (server, client)
}

fn sample_event() -> Event {
    Event {
        event_id: "evt-1".to_string(),
        event_name: "Jazz Night".to_string(),
        category_id: "3".to_string(),
        location: "Lisbon".to_string(),
        event_date: "2025-03-01".to_string(),
        event_time: "19:30".to_string(),
        capacity: 120,
        status: "Published".to_string(),
        ..Event::default()
    }
}

// ── Client ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_all_sends_key_and_reads_plain_array() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(header("x-api-key", "upstream-key"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id": 1, "Name": "Concerts", "ColorCode": "#ff0000" },
            { "id": "2", "name": "Theatre" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let categories: Vec<CategoryDto> = client.fetch_all("api/categories").await;

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].id.as_deref(), Some("1"));
    assert_eq!(categories[0].color_code.as_deref(), Some("#ff0000"));
    assert_eq!(categories[1].name.as_deref(), Some("Theatre"));
}

#[tokio::test]
async fn test_fetch_all_reads_paged_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": 4, "name": "Sports" }],
            "totalCount": 31,
            "pageSize": 1,
            "currentPage": 1,
            "totalPages": 31,
            "hasPrevious": false,
            "hasNext": true
        })))
        .mount(&server)
        .await;

    let categories: Vec<CategoryDto> = client.fetch_all("api/categories").await;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name.as_deref(), Some("Sports"));
}

#[tokio::test]
async fn test_fetch_all_is_empty_on_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let events: Vec<serde_json::Value> = client.fetch_all("api/events").await;
    let categories: Vec<CategoryDto> = client.fetch_all("api/categories").await;

    assert!(events.is_empty());
    assert!(categories.is_empty());
}

#[tokio::test]
async fn test_fetch_one_distinguishes_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/events/evt-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/evt-2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/evt-3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ truncated"))
        .mount(&server)
        .await;

    let missing = client.fetch_one::<serde_json::Value>("api/events/evt-1").await;
    assert!(matches!(missing, Lookup::NotFound));

    let unavailable = client.fetch_one::<serde_json::Value>("api/events/evt-2").await;
    match unavailable {
        Lookup::Failed(UpstreamError::Status { status, message, .. }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(
                message,
                "The service is temporarily unavailable. Please try again later."
            );
        }
        other => panic!("expected status failure, got {other:?}"),
    }

    let malformed = client.fetch_one::<serde_json::Value>("api/events/evt-3").await;
    assert!(matches!(malformed, Lookup::Failed(UpstreamError::Decode { .. })));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    let mut config = config(&server.uri());
    config.events_api.timeout_seconds = 5;
    let client = UpstreamClient::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/events/evt-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "eventId": "evt-1" }))
                .set_delay(Duration::from_secs(7)),
        )
        .mount(&server)
        .await;

    match client.fetch_one::<serde_json::Value>("api/events/evt-1").await {
        Lookup::Failed(e @ UpstreamError::Timeout { .. }) => {
            let error = AppError::from(e);
            assert!(matches!(error, AppError::Timeout(_)));
            assert_eq!(error.status(), StatusCode::REQUEST_TIMEOUT);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_writes_report_success_only_for_2xx() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/events/evt-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/events/evt-1"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    assert!(client.delete("api/events/evt-1").await);
    assert!(!client.update("api/events/evt-1", &json!({ "title": "x" })).await);
}

#[tokio::test]
async fn test_health_check() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    assert!(client.health_check().await);

    // Nothing listens here
    let offline = UpstreamClient::new(&config("http://127.0.0.1:9")).unwrap();
    assert!(!offline.health_check().await);
}

// ── Events service ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_event_sends_integer_category() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .and(body_partial_json(json!({
            "eventName": "Jazz Night",
            "categoryId": 3,
            "eventDate": "2025-03-01",
            "eventTime": "19:30"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = EventsService::new(client);
    assert_eq!(service.create_event(&sample_event()).await, WriteOutcome::Saved);
}

#[tokio::test]
async fn test_unparseable_category_never_reaches_upstream() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let service = EventsService::new(client);
    let event = Event {
        category_id: "concerts".to_string(),
        ..sample_event()
    };

    assert!(matches!(
        service.create_event(&event).await,
        WriteOutcome::Rejected(_)
    ));
}

#[tokio::test]
async fn test_categories_fall_back_to_legacy_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categoryentity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "categoryId": 3, "name": "Concerts" },
            { "categoryId": 0, "name": "Broken" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let categories = EventsService::new(client).get_all_categories().await;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].category_id, "3");
}

#[tokio::test]
async fn test_events_page_survives_upstream_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let page = EventsService::new(client).events_page().await;
    assert!(page.events.is_empty());
    assert_eq!(page.total, 0);
    assert!(page.warning.is_some());
}
