//! API integration tests: the full router against a mocked Events API

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use events_portal::{api, api::temp_data::TEMP_DATA_COOKIE, config::AppConfig, AppState};

const ADMIN_KEY: &str = "admin-key";
const USER_KEY: &str = "user-key";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Router) {
    let server = MockServer::start().await;

    let mut config = AppConfig::default();
    config.events_api.base_url = Some(server.uri());
    config.events_api.api_key = Some("upstream-key".to_string());
    config.auth.admin_api_key = Some(ADMIN_KEY.to_string());
    config.auth.user_api_key = Some(USER_KEY.to_string());

    let state = AppState::new(config).unwrap();
    (server, api::create_router(state))
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn event_form() -> Value {
    json!({
        "event_name": "Jazz Night",
        "event_category": "3",
        "event_date": "2025-03-01",
        "event_time": "19:30",
        "location": "Lisbon",
        "capacity": 120
    })
}

fn post_json(uri: &str, key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_events_joins_categories() {
    let (server, app) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id": 3, "Name": "Concerts" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [
                { "EventId": "evt-1", "Title": "Jazz Night", "CategoryId": 3,
                  "Date": "2025-03-01T19:30:00", "Capacity": 120, "TicketsSold": 40 },
                { "EventId": "evt-2", "Title": "Mystery", "CategoryId": 42 }
            ],
            "TotalCount": 2
        })))
        .mount(&server)
        .await;

    let response = app.oneshot(get("/api/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["events"][0]["event_category"], "Concerts");
    assert_eq!(body["events"][0]["event_time"], "19:30");
    assert_eq!(body["events"][0]["tickets_sold_percentage"], 33.3);
    assert_eq!(body["events"][1]["event_category"], "Uncategorized");
    assert!(body["warning"].is_null());
}

#[tokio::test]
async fn test_upstream_failure_renders_empty_page() {
    let (server, app) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = app.oneshot(get("/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["events"], json!([]));
    assert!(body["warning"].is_string());
}

// ── Error shaping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_event_is_404() {
    let (server, app) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/events/evt-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = app.oneshot(get("/api/events/evt-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["message"], "The requested resource was not found.");
}

#[tokio::test]
async fn test_ajax_timeout_is_408_json() {
    let (server, app) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/events/evt-1"))
        .respond_with(ResponseTemplate::new(408))
        .mount(&server)
        .await;

    let request = Request::builder()
        .uri("/events/evt-1")
        .header("x-requested-with", "XMLHttpRequest")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["statusCode"], 408);
    assert_eq!(body["message"], "The request timed out. Please try again.");
    assert!(body["requestId"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_page_unauthorized_redirects_with_stashed_status() {
    let (_server, app) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/events")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/home/unauthorized");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with(TEMP_DATA_COOKIE));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/home/unauthorized")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Read once, then cleared
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with(TEMP_DATA_COOKIE));

    let body = body_json(response).await;
    assert_eq!(body["status_code"], 401);
    assert_eq!(
        body["error_message"],
        "You are not authorized to access this resource."
    );
    assert_eq!(
        body["user_friendly_message"],
        "You need to log in to access this resource."
    );
}

#[tokio::test]
async fn test_error_page_without_stash() {
    let (_server, app) = setup().await;

    let response = app.oneshot(get("/home/not-found")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert!(body["error_message"].is_null());
}

// ── Guards ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_user_cannot_delete() {
    let (server, app) = setup().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/events/evt-1")
        .header("x-api-key", USER_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Access to this resource is forbidden.");
}

#[tokio::test]
async fn test_unknown_key_is_401() {
    let (_server, app) = setup().await;

    let request = Request::builder()
        .uri("/api/me")
        .header("x-api-key", "stolen-key")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_reports_admin_rights() {
    let (_server, app) = setup().await;

    let request = Request::builder()
        .uri("/api/me")
        .header("x-api-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["role"], "Admin");
    assert_eq!(body["can_delete_events"], true);
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_admin_creates_event() {
    let (server, app) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let response = app
        .oneshot(post_json("/api/events", Some(ADMIN_KEY), &event_form()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Event created successfully!");
}

#[tokio::test]
async fn test_bad_category_is_rejected_without_upstream_call() {
    let (server, app) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = event_form();
    form["event_category"] = json!("concerts");

    let response = app
        .oneshot(post_json("/api/events", Some(ADMIN_KEY), &form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid information provided.");
}

#[tokio::test]
async fn test_missing_required_field_is_400() {
    let (_server, app) = setup().await;

    let mut form = event_form();
    form["location"] = json!("");

    let response = app
        .oneshot(post_json("/api/events", Some(ADMIN_KEY), &form))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Required information is missing.");
}

#[tokio::test]
async fn test_upstream_refusing_delete_is_502() {
    let (server, app) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/events/evt-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/events/evt-1")
        .header("x-api-key", ADMIN_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Unable to communicate with external services. Please try again later."
    );
}

// ── Health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_aggregates_upstream() {
    let (server, app) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "Healthy");

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "Degraded");
    assert_eq!(body["dependencies"]["eventsApi"], "Unhealthy");
}
