use std::{sync::OnceLock, time::Duration};

use axum::http;
use reqwest::Client;

/// Shared HTTP client so upload, submit and polling reuse connections
///
/// The per-request timeout bounds a single call; the overall transcription
/// deadline is enforced by the polling loop.
pub fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            let mut headers = http::HeaderMap::new();
            headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

            Client::builder()
                .timeout(Duration::from_secs(300))
                .pool_idle_timeout(Some(Duration::from_secs(30)))
                .tcp_nodelay(true)
                .tcp_keepalive(Some(Duration::from_secs(60)))
                .user_agent(concat!("scribe/", env!("CARGO_PKG_VERSION")))
                .default_headers(headers)
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!("Falling back to default HTTP client: {e}");
                    Client::new()
                })
        })
        .clone()
}
