#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use vox_api::config::ServerConfig;
use vox_api::router::build_app_router;
use vox_api::state::AppState;
use vox_core::publish::PublishSink;
use vox_storage::ImageStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(data_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8080".to_string()],
        request_timeout_secs: 30,
        data_dir: data_dir.to_path_buf(),
    }
}

/// Everything a test needs to drive the server: the router inputs plus the
/// temp directory keeping the image store alive.
pub struct TestServer {
    pub dir: tempfile::TempDir,
    pub sink: Arc<PublishSink>,
    pub images: Arc<ImageStore>,
}

impl TestServer {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let images = Arc::new(ImageStore::open(dir.path().join("images")).unwrap());
        Self {
            dir,
            sink: Arc::new(PublishSink::new()),
            images,
        }
    }

    /// Build the full application router with the production middleware
    /// stack.
    pub fn app(&self) -> Router {
        let config = test_config(self.dir.path());
        let state = AppState {
            sink: Arc::clone(&self.sink),
            images: Arc::clone(&self.images),
        };
        build_app_router(state, &config)
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
