use std::net::SocketAddr;

use serde::Deserialize;

use crate::health::HealthConfig;

/// Default upper bound for request bodies (64 MiB)
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 << 20;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind, defaults to `0.0.0.0:8080`
    pub listen_address: Option<SocketAddr>,
    /// Maximum accepted size of a transcription request body
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    #[serde(default)]
    pub health: HealthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            health: HealthConfig::default(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT_BYTES
}
