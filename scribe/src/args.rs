use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Scribe transcription proxy
#[derive(Debug, Parser)]
#[command(name = "scribe", about = "OpenAI-compatible audio transcription proxy for AssemblyAI")]
pub struct Args {
    /// Path to configuration file; built-in defaults are used when omitted
    #[arg(short, long, env = "SCRIBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "SCRIBE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Override the listen port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Log filter directive (e.g. "info" or "transcription=debug,info")
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Args {
    /// Listen address after applying CLI overrides to the configured one
    pub fn listen_address(&self, configured: Option<SocketAddr>) -> Option<SocketAddr> {
        let mut address = self.listen.or(configured);

        if let Some(port) = self.port {
            let mut overridden = address.unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], port)));
            overridden.set_port(port);
            address = Some(overridden);
        }

        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        temp_env::with_vars_unset(["SCRIBE_CONFIG", "SCRIBE_LISTEN", "PORT", "LOG_LEVEL"], || {
            Args::try_parse_from(std::iter::once("scribe").chain(args.iter().copied())).unwrap()
        })
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);

        assert!(args.config.is_none());
        assert_eq!(args.log_level, "info");
        assert_eq!(args.listen_address(None), None);
    }

    #[test]
    fn port_overrides_configured_address() {
        let args = parse(&["--port", "9000"]);
        let configured = "127.0.0.1:8080".parse().ok();

        assert_eq!(args.listen_address(configured), "127.0.0.1:9000".parse().ok());
    }

    #[test]
    fn port_alone_binds_all_interfaces() {
        let args = parse(&["--port", "9000"]);
        assert_eq!(args.listen_address(None), "0.0.0.0:9000".parse().ok());
    }

    #[test]
    fn listen_overrides_config() {
        let args = parse(&["--listen", "127.0.0.1:7000", "-c", "scribe.toml"]);

        assert_eq!(args.config, Some(PathBuf::from("scribe.toml")));
        assert_eq!(
            args.listen_address("0.0.0.0:8080".parse().ok()),
            "127.0.0.1:7000".parse().ok()
        );
    }
}
