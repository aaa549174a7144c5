//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use scribe_config::{AssemblyAiConfig, Config, HealthConfig, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder pointed at a mock AssemblyAI API
    ///
    /// Polling is fast so pending jobs resolve within a test's lifetime.
    pub fn new(assemblyai_base_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                assemblyai: AssemblyAiConfig {
                    base_url: assemblyai_base_url.parse().expect("valid URL"),
                    poll_interval: "10ms".to_owned(),
                    timeout: "5s".to_owned(),
                },
                telemetry: None,
            },
        }
    }

    /// Give up on transcripts after this long (duration-str syntax)
    pub fn with_timeout(mut self, timeout: &str) -> Self {
        self.config.assemblyai.timeout = timeout.to_owned();
        self
    }

    /// Wait this long between status checks (duration-str syntax)
    pub fn with_poll_interval(mut self, interval: &str) -> Self {
        self.config.assemblyai.poll_interval = interval.to_owned();
        self
    }

    /// Limit accepted request bodies
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.config.server.body_limit_bytes = bytes;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
