//! Layered configuration: defaults -> YAML file -> environment -> CLI flags.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read environment overrides: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Optional mutual-TLS configuration for the Docker client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerTlsConfig {
    pub ca: Option<String>,
    pub cert: Option<String>,
    pub key: Option<String>,
    #[serde(default)]
    pub verify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "compact")]
    Compact,
    #[serde(rename = "json")]
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Compact
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid(format!("unknown log format: {other}"))),
        }
    }
}

/// Process-wide immutable configuration, resolved once at startup and
/// shared read-only by every component via `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub listen_addr: String,
    pub access_token: String,
    pub docker_host: Option<String>,
    pub docker_tls: Option<DockerTlsConfig>,
    pub max_concurrent_docker_calls: usize,
    pub fanout_max_parallel: usize,
    pub default_deadline_ms: u64,
    pub max_deadline_ms: u64,
    pub max_request_bytes: usize,
    pub log_format: LogFormat,
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            access_token: String::new(),
            docker_host: None,
            docker_tls: None,
            max_concurrent_docker_calls: 64,
            fanout_max_parallel: 16,
            default_deadline_ms: 10_000,
            max_deadline_ms: 300_000,
            max_request_bytes: 1_048_576,
            log_format: LogFormat::Compact,
            log_level: "info".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn default_deadline(&self) -> Duration {
        Duration::from_millis(self.default_deadline_ms)
    }

    pub fn max_deadline(&self) -> Duration {
        Duration::from_millis(self.max_deadline_ms)
    }

    /// `timeout_ms` from a tool call, clamped to the configured ceiling.
    pub fn clamp_deadline(&self, requested_ms: Option<u64>) -> Duration {
        let ms = requested_ms.unwrap_or(self.default_deadline_ms).min(self.max_deadline_ms);
        Duration::from_millis(ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token.is_empty() {
            return Err(ConfigError::Invalid(
                "MCP_ACCESS_TOKEN (or access_token) must be set".to_string(),
            ));
        }
        if let Some(host) = &self.docker_host {
            let looks_valid = host.starts_with("unix://")
                || host.starts_with("tcp://")
                || host.starts_with("http://")
                || host.starts_with("https://")
                || host.starts_with('/');
            if !looks_valid {
                return Err(ConfigError::Invalid(format!(
                    "docker_host '{host}' is not a recognized unix socket path or TCP URL"
                )));
            }
        }
        if self.max_concurrent_docker_calls == 0 || self.fanout_max_parallel == 0 {
            return Err(ConfigError::Invalid(
                "concurrency limits must be positive".to_string(),
            ));
        }
        if self.default_deadline_ms == 0 || self.max_deadline_ms == 0 {
            return Err(ConfigError::Invalid("deadlines must be positive".to_string()));
        }
        if self.default_deadline_ms > self.max_deadline_ms {
            return Err(ConfigError::Invalid(
                "default_deadline_ms cannot exceed max_deadline_ms".to_string(),
            ));
        }
        if self.max_request_bytes == 0 {
            return Err(ConfigError::Invalid("max_request_bytes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Partial overrides deserialized from a YAML file; every field optional so
/// an unset field keeps whatever the defaults layer already produced.
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    listen_addr: Option<String>,
    access_token: Option<String>,
    docker_host: Option<String>,
    docker_tls: Option<DockerTlsConfig>,
    max_concurrent_docker_calls: Option<usize>,
    fanout_max_parallel: Option<usize>,
    default_deadline_ms: Option<u64>,
    max_deadline_ms: Option<u64>,
    max_request_bytes: Option<usize>,
    log_format: Option<String>,
    log_level: Option<String>,
}

/// `envy`-deserializable overrides read from `MCP_*` environment variables.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    access_token: Option<String>,
    listen_addr: Option<String>,
    max_concurrent_docker_calls: Option<usize>,
    fanout_max_parallel: Option<usize>,
    default_deadline_ms: Option<u64>,
    max_deadline_ms: Option<u64>,
    max_request_bytes: Option<usize>,
    log_level: Option<String>,
    log_format: Option<String>,
}

/// CLI-supplied overrides, the highest-precedence layer (see `cli.rs`).
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub config_path: Option<String>,
    pub listen_addr: Option<String>,
    pub docker_host: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Assemble a `GatewayConfig` from defaults, an optional file, `MCP_*`
    /// environment variables, and CLI flags, in ascending precedence.
    pub fn load(cli: &CliOverrides) -> Result<GatewayConfig, ConfigError> {
        let mut config = GatewayConfig::default();

        if let Some(path) = &cli.config_path {
            Self::apply_file(&mut config, path)?;
        }

        Self::apply_env(&mut config)?;
        Self::apply_cli(&mut config, cli)?;

        config.validate()?;
        Ok(config)
    }

    fn apply_file(config: &mut GatewayConfig, path: &str) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::ReadFile {
            path: path.to_string(),
            source,
        })?;
        let overrides: FileOverrides = serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseFile {
            path: path.to_string(),
            source,
        })?;

        if let Some(v) = overrides.listen_addr {
            config.listen_addr = v;
        }
        if let Some(v) = overrides.access_token {
            config.access_token = v;
        }
        if overrides.docker_host.is_some() {
            config.docker_host = overrides.docker_host;
        }
        if overrides.docker_tls.is_some() {
            config.docker_tls = overrides.docker_tls;
        }
        if let Some(v) = overrides.max_concurrent_docker_calls {
            config.max_concurrent_docker_calls = v;
        }
        if let Some(v) = overrides.fanout_max_parallel {
            config.fanout_max_parallel = v;
        }
        if let Some(v) = overrides.default_deadline_ms {
            config.default_deadline_ms = v;
        }
        if let Some(v) = overrides.max_deadline_ms {
            config.max_deadline_ms = v;
        }
        if let Some(v) = overrides.max_request_bytes {
            config.max_request_bytes = v;
        }
        if let Some(v) = overrides.log_format {
            config.log_format = v.parse()?;
        }
        if let Some(v) = overrides.log_level {
            config.log_level = v;
        }

        Ok(())
    }

    fn apply_env(config: &mut GatewayConfig) -> Result<(), ConfigError> {
        let overrides: EnvOverrides = envy::prefixed("MCP_").from_env()?;

        if let Some(v) = overrides.access_token {
            config.access_token = v;
        }
        if let Some(v) = overrides.listen_addr {
            config.listen_addr = v;
        }
        if let Some(v) = overrides.max_concurrent_docker_calls {
            config.max_concurrent_docker_calls = v;
        }
        if let Some(v) = overrides.fanout_max_parallel {
            config.fanout_max_parallel = v;
        }
        if let Some(v) = overrides.default_deadline_ms {
            config.default_deadline_ms = v;
        }
        if let Some(v) = overrides.max_deadline_ms {
            config.max_deadline_ms = v;
        }
        if let Some(v) = overrides.max_request_bytes {
            config.max_request_bytes = v;
        }
        if let Some(v) = overrides.log_level {
            config.log_level = v;
        }
        if let Some(v) = overrides.log_format {
            config.log_format = v.parse()?;
        }

        if let Ok(docker_host) = std::env::var("DOCKER_HOST") {
            config.docker_host = Some(docker_host);
        }

        Ok(())
    }

    fn apply_cli(config: &mut GatewayConfig, cli: &CliOverrides) -> Result<(), ConfigError> {
        if let Some(v) = &cli.listen_addr {
            config.listen_addr = v.clone();
        }
        if let Some(v) = &cli.docker_host {
            config.docker_host = Some(v.clone());
        }
        if let Some(v) = &cli.log_level {
            config.log_level = v.clone();
        }
        if let Some(v) = &cli.log_format {
            config.log_format = v.parse()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_access_token_is_fatal() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = GatewayConfig::default();
        config.access_token = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unrecognized_docker_host() {
        let mut config = GatewayConfig::default();
        config.access_token = "secret".to_string();
        config.docker_host = Some("not-a-host".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_deadline_bounds_to_configured_max() {
        let config = GatewayConfig::default();
        let deadline = config.clamp_deadline(Some(10_000_000));
        assert_eq!(deadline, config.max_deadline());
    }

    #[test]
    fn test_clamp_deadline_falls_back_to_default() {
        let config = GatewayConfig::default();
        let deadline = config.clamp_deadline(None);
        assert_eq!(deadline, config.default_deadline());
    }
}
