use std::time::Duration;

/// Display client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Base URL of the display server, without a trailing slash.
    pub server_url: String,
    /// Per-request timeout for `GET /api/config`.
    pub fetch_timeout: Duration,
}

impl DisplayConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                   |
    /// |----------------------------|---------------------------|
    /// | `DISPLAY_SERVER_URL`       | `http://127.0.0.1:8080`   |
    /// | `DISPLAY_FETCH_TIMEOUT_MS` | `2000`                    |
    pub fn from_env() -> Self {
        let server_url = std::env::var("DISPLAY_SERVER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".into())
            .trim_end_matches('/')
            .to_string();

        let fetch_timeout_ms: u64 = std::env::var("DISPLAY_FETCH_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("DISPLAY_FETCH_TIMEOUT_MS must be a valid u64");

        Self {
            server_url,
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
        }
    }
}
