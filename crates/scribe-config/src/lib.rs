#![allow(clippy::must_use_candidate)]

pub mod assemblyai;
mod env;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use assemblyai::*;
pub use health::*;
pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level Scribe configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream AssemblyAI API configuration
    #[serde(default)]
    pub assemblyai: AssemblyAiConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
