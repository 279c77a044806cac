use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use bookings_api::{app, render::TemplateRenderer, AppState, SessionSettings};
use bookings_core::repository::InMemoryRoomRepository;
use bookings_core::session::MemorySessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const COOKIE_NAME: &str = "bookings_session";

fn test_app() -> Router {
    let root = concat!(env!("CARGO_MANIFEST_DIR"), "/..");
    let renderer = TemplateRenderer::new(format!("{}/templates", root), true)
        .expect("templates load");

    app(AppState {
        sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(3600))),
        rooms: Arc::new(InMemoryRoomRepository::with_default_rooms()),
        renderer: Arc::new(renderer),
        session: SessionSettings {
            cookie_name: COOKIE_NAME.to_string(),
            lifetime_seconds: 3600,
            secure: false,
        },
        static_dir: format!("{}/static", root),
    })
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `name=value` pair from the response's session cookie.
fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie issued")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn location(response: &Response) -> &str {
    response.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

async fn start_session(app: &Router) -> String {
    let response = send(app, get("/make-reservation", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

#[tokio::test]
async fn test_new_visitor_gets_session_cookie() {
    let app = test_app();

    let response = send(&app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("bookings_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));

    // A known visitor keeps their cookie while nothing is stored.
    let cookie = session_cookie(&response);
    let response = send(&app, get("/about", Some(&cookie))).await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_session_write_refreshes_cookie() {
    let app = test_app();
    let cookie = start_session(&app).await;

    let response = send(
        &app,
        post_form(
            "/make-reservation",
            "first_name=John&last_name=Doe&email=john%40x.com",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with(&format!("{};", cookie)));
    assert!(set_cookie.contains("Max-Age=3600"));

    // A rejected submission stores nothing.
    let response = send(
        &app,
        post_form("/make-reservation", "first_name=Jo", Some(&cookie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_short_first_name_rerenders_form() {
    let app = test_app();
    let cookie = start_session(&app).await;

    let response = send(
        &app,
        post_form(
            "/make-reservation",
            "first_name=Jo&last_name=Doe&email=jo%40x.com",
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("This field must be at least 3 characters long"));
    assert!(html.contains("value=\"Doe\""));
    assert!(html.contains("value=\"jo@x.com\""));

    // Nothing was staged.
    let response = send(&app, get("/reservation-summary", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_valid_submission_is_summarised_once() {
    let app = test_app();
    let cookie = start_session(&app).await;

    let response = send(
        &app,
        post_form(
            "/make-reservation",
            "first_name=John&last_name=Doe&email=john%40x.com&phone=555",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/reservation-summary");

    let response = send(&app, get("/reservation-summary", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("John Doe"));
    assert!(html.contains("john@x.com"));
    assert!(html.contains("555"));

    let response = send(&app, get("/reservation-summary", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_summary_without_pending_reservation_redirects_home() {
    let app = test_app();

    let response = send(&app, get("/reservation-summary", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // The notice is shown once on the next page.
    let cookie = session_cookie(&response);
    let html = body_text(send(&app, get("/", Some(&cookie))).await).await;
    assert!(html.contains("get reservation from session"));

    let html = body_text(send(&app, get("/", Some(&cookie))).await).await;
    assert!(!html.contains("get reservation from session"));
}

#[tokio::test]
async fn test_summary_shows_room_name() {
    let app = test_app();
    let cookie = start_session(&app).await;

    let response = send(
        &app,
        post_form(
            "/make-reservation",
            "first_name=John&last_name=Doe&email=john%40x.com&room_id=2",
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let html = body_text(send(&app, get("/reservation-summary", Some(&cookie))).await).await;
    assert!(html.contains("Suite"));
}

#[tokio::test]
async fn test_reservation_form_carries_room_id() {
    let app = test_app();

    let html = body_text(send(&app, get("/make-reservation?room_id=1", None)).await).await;
    assert!(html.contains("name=\"room_id\" value=\"1\""));
}

#[tokio::test]
async fn test_malformed_form_is_a_server_error() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/make-reservation")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"first_name":"John"}"#))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_badly_encoded_form_is_a_server_error() {
    let app = test_app();

    for body in [
        "first_name=%zz&last_name=Doe&email=a%40b.com",
        "first_name=Jo%FF%FEhn&last_name=Doe&email=a%40b.com",
        "first_name=John&last_name=Doe&email=a%40b.com%",
    ] {
        let cookie = start_session(&app).await;
        let response = send(&app, post_form("/make-reservation", body, Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", body);

        // Nothing was staged for the summary.
        let response = send(&app, get("/reservation-summary", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    let response = send(
        &app,
        post_form("/search-availability", "start=%zz&end=2024-01-05", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_about_reads_remote_ip_from_session() {
    let app = test_app();

    let mut request = get("/", None);
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
    let response = send(&app, request).await;
    let cookie = session_cookie(&response);

    let html = body_text(send(&app, get("/about", Some(&cookie))).await).await;
    assert!(html.contains("hello again"));
    assert!(html.contains("Your remote IP address is 127.0.0.1"));
}

#[tokio::test]
async fn test_post_availability_echoes_dates() {
    let app = test_app();

    let response = send(
        &app,
        post_form("/search-availability", "start=2024-01-01&end=2024-01-05", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "start date is 2024-01-01 end date is 2024-01-05"
    );
}

#[tokio::test]
async fn test_availability_json_stub() {
    let app = test_app();

    let response = send(&app, post_form("/search-availability-json", "", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["message"], "available");
}

#[tokio::test]
async fn test_static_pages_render() {
    let app = test_app();

    for uri in [
        "/",
        "/about",
        "/generals-quarters",
        "/majors-suite",
        "/contact",
        "/search-availability",
    ] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
    }

    let response = send(&app, get("/static/css/styles.css", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
