//! Route definitions for the display poll endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::display;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(display::get_config))
        .route("/images/{filename}", get(display::get_image))
}
