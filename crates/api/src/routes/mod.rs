pub mod display;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /config                 latest published snapshot, or {} (GET)
/// /images/{filename}      stored photo bytes (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(display::router())
}
