use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if durations, URLs, limits, or sampling settings
    /// are out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server_config()?;
        self.validate_assemblyai_config()?;
        self.validate_telemetry_config()?;
        Ok(())
    }

    fn validate_server_config(&self) -> anyhow::Result<()> {
        if self.server.body_limit_bytes == 0 {
            anyhow::bail!("server.body_limit_bytes must be greater than 0");
        }

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/': {}", self.server.health.path);
        }

        Ok(())
    }

    fn validate_assemblyai_config(&self) -> anyhow::Result<()> {
        let assemblyai = &self.assemblyai;

        if !matches!(assemblyai.base_url.scheme(), "http" | "https") {
            anyhow::bail!("assemblyai.base_url must use http or https: {}", assemblyai.base_url);
        }

        let poll_interval = assemblyai.poll_interval()?;
        let timeout = assemblyai.timeout()?;

        if poll_interval.is_zero() {
            anyhow::bail!("assemblyai.poll_interval must be greater than 0");
        }

        if timeout.is_zero() {
            anyhow::bail!("assemblyai.timeout must be greater than 0");
        }

        if poll_interval > timeout {
            anyhow::bail!("assemblyai.poll_interval must not exceed assemblyai.timeout");
        }

        Ok(())
    }

    fn validate_telemetry_config(&self) -> anyhow::Result<()> {
        let Some(ref telemetry) = self.telemetry else {
            return Ok(());
        };

        if let Some(ref tracing) = telemetry.tracing
            && !(0.0..=1.0).contains(&tracing.sampling_rate)
        {
            anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use crate::{Config, LogFormat};

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.server.listen_address.is_none());
        assert!(config.server.health.enabled);
        assert_eq!(config.server.health.path, "/health");
        assert_eq!(config.assemblyai.poll_interval().unwrap(), Duration::from_secs(3));
        assert!(config.telemetry.is_none());
    }

    #[test]
    fn full_document() {
        let raw = r#"
            [server]
            listen_address = "127.0.0.1:9000"
            body_limit_bytes = 1024

            [server.health]
            path = "/healthz"

            [assemblyai]
            base_url = "http://localhost:8089/v2"
            poll_interval = "250ms"
            timeout = "30s"

            [telemetry]
            service_name = "scribe-test"
            log_format = "json"
        "#;

        let config = Config::from_toml(raw).unwrap();
        assert_eq!(config.server.listen_address.unwrap().port(), 9000);
        assert_eq!(config.server.body_limit_bytes, 1024);
        assert_eq!(config.server.health.path, "/healthz");
        assert_eq!(config.assemblyai.base_url.as_str(), "http://localhost:8089/v2");
        assert_eq!(config.assemblyai.poll_interval().unwrap(), Duration::from_millis(250));
        let telemetry = config.telemetry.unwrap();
        assert_eq!(telemetry.service_name, "scribe-test");
        assert_eq!(telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml("[server]\nport = 8080\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn poll_interval_longer_than_timeout_is_rejected() {
        let raw = "[assemblyai]\npoll_interval = \"2m\"\ntimeout = \"1m\"\n";
        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let raw = "[assemblyai]\npoll_interval = \"0s\"\n";
        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("poll_interval must be greater than 0"));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let raw = "[assemblyai]\nbase_url = \"ftp://example.com/v2\"\n";
        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn relative_health_path_is_rejected() {
        let raw = "[server.health]\npath = \"health\"\n";
        assert!(Config::from_toml(raw).is_err());
    }

    #[test]
    fn sampling_rate_out_of_range_is_rejected() {
        let raw = "[telemetry.tracing]\nsampling_rate = 1.5\n";
        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("sampling_rate"));
    }

    #[test]
    fn load_expands_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[assemblyai]\nbase_url = \"{{{{ env.SCRIBE_TEST_UPSTREAM }}}}\"").unwrap();

        temp_env::with_var("SCRIBE_TEST_UPSTREAM", Some("http://upstream.test/v2"), || {
            let config = Config::load(file.path()).unwrap();
            assert_eq!(config.assemblyai.base_url.as_str(), "http://upstream.test/v2");
        });
    }

    #[test]
    fn load_missing_file_fails() {
        let err = Config::load(std::path::Path::new("/nonexistent/scribe.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
