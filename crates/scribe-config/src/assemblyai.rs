use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Upstream AssemblyAI API configuration
///
/// Credentials are not configured here: every request forwards the
/// caller's own key.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssemblyAiConfig {
    /// Base URL of the v2 REST API
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Delay between transcript status checks (e.g. "3s")
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Give up waiting for a transcript after this long (e.g. "10m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for AssemblyAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval: default_poll_interval(),
            timeout: default_timeout(),
        }
    }
}

impl AssemblyAiConfig {
    /// Parsed polling interval
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration
    pub fn poll_interval(&self) -> anyhow::Result<Duration> {
        parse_duration("assemblyai.poll_interval", &self.poll_interval)
    }

    /// Parsed overall transcription timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration
    pub fn timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("assemblyai.timeout", &self.timeout)
    }
}

fn parse_duration(field: &str, s: &str) -> anyhow::Result<Duration> {
    duration_str::parse(s).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{s}': {e}"))
}

fn default_base_url() -> Url {
    Url::parse("https://api.assemblyai.com/v2").expect("default base URL must parse")
}

fn default_poll_interval() -> String {
    "3s".to_string()
}

fn default_timeout() -> String {
    "10m".to_string()
}
