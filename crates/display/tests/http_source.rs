//! Tests for `HttpConfigSource` against a local Axum server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use vox_display::client::{ConfigSource, FetchError, HttpConfigSource};
use vox_display::poller::Poller;
use vox_display::render::{DisplayView, Renderer};

/// What the fake server answers on `GET /api/config`.
#[derive(Clone)]
enum Reply {
    Json(&'static str),
    Status(StatusCode),
    Slow(Duration),
}

type Shared = Arc<Mutex<Reply>>;

async fn config(State(reply): State<Shared>) -> Response {
    let reply = reply.lock().unwrap().clone();
    match reply {
        Reply::Json(body) => ([("content-type", "application/json")], body).into_response(),
        Reply::Status(status) => status.into_response(),
        Reply::Slow(delay) => {
            tokio::time::sleep(delay).await;
            "{}".into_response()
        }
    }
}

async fn serve(reply: Reply) -> (SocketAddr, Shared) {
    let shared = Arc::new(Mutex::new(reply));
    let app = Router::new()
        .route("/api/config", get(config))
        .with_state(Arc::clone(&shared));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, shared)
}

fn source(addr: SocketAddr) -> HttpConfigSource {
    HttpConfigSource::new(&format!("http://{addr}"), Duration::from_millis(500)).unwrap()
}

const SNAPSHOT: &str = r#"{
    "serviceName": "Sunday",
    "serviceDate": "2026-10-25T09:00:00Z",
    "vocalists": [
        {"number": 1, "label": "Lead", "anglePhotoFilename": null, "operatorName": "Alice",
         "operatorPhotoFilename": "p.jpg", "backgroundPhotoFilename": "p.jpg"},
        {"number": 2, "label": null, "anglePhotoFilename": null, "operatorName": null,
         "operatorPhotoFilename": null}
    ]
}"#;

#[tokio::test]
async fn parses_a_published_snapshot() {
    let (addr, _) = serve(Reply::Json(SNAPSHOT)).await;

    let snapshot = source(addr).fetch_config().await.expect("snapshot");

    assert_eq!(snapshot.service_name, "Sunday");
    assert_eq!(snapshot.vocalists.len(), 2);
    assert_eq!(snapshot.vocalists[0].background_photo_filename.as_deref(), Some("p.jpg"));
    // Older servers omit the resolved background.
    assert_eq!(snapshot.vocalists[1].background_photo_filename, None);
}

#[tokio::test]
async fn empty_object_is_no_update() {
    let (addr, _) = serve(Reply::Json("{}")).await;
    assert_matches!(source(addr).try_fetch().await, Ok(None));
}

#[tokio::test]
async fn server_error_is_reported_and_soft() {
    let (addr, _) = serve(Reply::Status(StatusCode::INTERNAL_SERVER_ERROR)).await;
    let source = source(addr);

    assert_matches!(source.try_fetch().await, Err(FetchError::HttpStatus(500)));
    assert!(source.fetch_config().await.is_none());
}

#[tokio::test]
async fn garbage_body_is_a_json_error() {
    let (addr, _) = serve(Reply::Json("<html>")).await;
    assert_matches!(source(addr).try_fetch().await, Err(FetchError::Json(_)));
}

#[tokio::test]
async fn wrong_shape_is_a_json_error() {
    let (addr, _) = serve(Reply::Json(r#"{"vocalists": "nope"}"#)).await;
    assert_matches!(source(addr).try_fetch().await, Err(FetchError::Json(_)));
}

#[tokio::test]
async fn slow_server_times_out() {
    let (addr, _) = serve(Reply::Slow(Duration::from_secs(5))).await;
    assert_matches!(source(addr).try_fetch().await, Err(FetchError::Request(e)) if e.is_timeout());
}

#[tokio::test]
async fn unreachable_server_is_a_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert_matches!(source(addr).try_fetch().await, Err(FetchError::Request(_)));
}

// ---------------------------------------------------------------------------
// Poller over HTTP: outage between two identical payloads
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Counting {
    views: Mutex<Vec<DisplayView>>,
}

impl Renderer for Counting {
    fn render(&self, view: &DisplayView) {
        self.views.lock().unwrap().push(view.clone());
    }

    fn show_clock(&self, _time: &str) {}
}

#[tokio::test]
async fn poller_survives_an_outage_without_redrawing() {
    let (addr, reply) = serve(Reply::Json(SNAPSHOT)).await;
    let renderer = Arc::new(Counting::default());
    let mut poller = Poller::new(source(addr), Arc::clone(&renderer));

    assert!(poller.poll_once().await);
    *reply.lock().unwrap() = Reply::Status(StatusCode::SERVICE_UNAVAILABLE);
    assert!(!poller.poll_once().await);
    *reply.lock().unwrap() = Reply::Json("{}");
    assert!(!poller.poll_once().await);
    *reply.lock().unwrap() = Reply::Json(SNAPSHOT);
    assert!(!poller.poll_once().await);

    assert_eq!(renderer.views.lock().unwrap().len(), 1);
}
