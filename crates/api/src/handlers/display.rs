//! Handlers polled by display clients.

use std::io::ErrorKind;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio_util::io::ReaderStream;
use vox_core::error::CoreError;
use vox_core::photos::content_type_for_name;
use vox_core::publish::Published;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/config
///
/// Returns the latest published snapshot, or `{}` if nothing has been
/// published yet. Reads never block on the editor.
pub async fn get_config(State(state): State<AppState>) -> Response {
    match state.sink.current() {
        Published::Empty => Json(serde_json::json!({})).into_response(),
        Published::Snapshot(snapshot) => Json(&*snapshot).into_response(),
    }
}

/// GET /api/images/{filename}
///
/// Streams a stored photo. Names that fail validation and files that do not
/// exist are both 404.
pub async fn get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Image",
            id: filename.clone(),
        })
    };

    let path = state.images.path_for(&filename).ok_or_else(not_found)?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(AppError::InternalError(e.to_string())),
    };
    let file_size = file
        .metadata()
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for_name(&filename))
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(e.to_string()))
}
