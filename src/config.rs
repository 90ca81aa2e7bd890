use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated. Unset allows any origin.
    pub cors_origins: Option<String>,

    /// Log level of this crate and tower_http when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum inline clipboard text, in characters
    #[serde(default = "default_max_clip_chars")]
    pub max_clip_chars: usize,

    /// Maximum WebSocket message size, in bytes
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Maximum upload body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Per-session outbound queue capacity, in frames
    #[serde(default = "default_outbound_queue_size")]
    pub outbound_queue_size: usize,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Heartbeat intervals without inbound traffic before the transport is dropped
    #[serde(default = "default_max_missed_pongs")]
    pub max_missed_pongs: u32,

    /// How long a disconnected session may resume
    #[serde(default = "default_grace_window_ms")]
    pub grace_window_ms: u64,

    #[serde(default = "default_blob_ttl_secs")]
    pub blob_ttl_secs: u64,

    /// Maximum number of stored files
    #[serde(default = "default_blob_capacity")]
    pub blob_capacity: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file.
    /// Runs before tracing is set up, so the caller reports the outcome.
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            dotenvy::dotenv().ok();
        }

        let config = envy::from_env::<Config>().map_err(ConfigError::EnvError)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.max_clip_chars == 0, "max_clip_chars"),
            (self.max_frame_bytes == 0, "max_frame_bytes"),
            (self.outbound_queue_size == 0, "outbound_queue_size"),
            (self.heartbeat_interval_ms == 0, "heartbeat_interval_ms"),
            (self.blob_capacity == 0, "blob_capacity"),
        ];
        match checks.iter().find(|(zero, _)| *zero) {
            Some((_, field)) => Err(ConfigError::Invalid(format!("{} must be greater than zero", field))),
            None => Ok(()),
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Fallback `EnvFilter` directives built from `log_level`.
    pub fn log_filter(&self) -> String {
        format!(
            "clipme_sync={0},tower_http={0},axum::rejection=trace,info",
            self.log_level
        )
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn grace_window(&self) -> Duration {
        Duration::from_millis(self.grace_window_ms)
    }

    pub fn blob_ttl(&self) -> Duration {
        Duration::from_secs(self.blob_ttl_secs)
    }

    /// Parsed `cors_origins`, empty when any origin is allowed.
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            cors_origins: None,
            log_level: default_log_level(),
            max_clip_chars: default_max_clip_chars(),
            max_frame_bytes: default_max_frame_bytes(),
            max_upload_bytes: default_max_upload_bytes(),
            outbound_queue_size: default_outbound_queue_size(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            max_missed_pongs: default_max_missed_pongs(),
            grace_window_ms: default_grace_window_ms(),
            blob_ttl_secs: default_blob_ttl_secs(),
            blob_capacity: default_blob_capacity(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_max_clip_chars() -> usize {
    10_000
}

fn default_max_frame_bytes() -> usize {
    1024 * 1024
}

fn default_max_upload_bytes() -> usize {
    1024 * 1024 * 1024
}

fn default_outbound_queue_size() -> usize {
    64
}

fn default_heartbeat_interval_ms() -> u64 {
    15_000
}

fn default_max_missed_pongs() -> u32 {
    2
}

fn default_grace_window_ms() -> u64 {
    30_000
}

fn default_blob_ttl_secs() -> u64 {
    600
}

fn default_blob_capacity() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server_address(), "0.0.0.0:5000");
        assert_eq!(config.grace_window(), Duration::from_secs(30));
        assert_eq!(
            config.log_filter(),
            "clipme_sync=info,tower_http=info,axum::rejection=trace,info"
        );
    }

    #[test]
    fn log_level_drives_the_fallback_filter() {
        let config = Config {
            log_level: "trace".to_string(),
            ..Config::default()
        };
        let filter = config.log_filter();
        assert!(filter.starts_with("clipme_sync=trace,tower_http=trace,"));
        assert!(filter.parse::<tracing_subscriber::EnvFilter>().is_ok());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let config = Config {
            outbound_queue_size: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("outbound_queue_size"));
    }

    #[test]
    fn parses_cors_origins() {
        let config = Config {
            cors_origins: Some("https://a.example, https://b.example,".to_string()),
            ..Config::default()
        };
        assert_eq!(config.cors_origin_list(), vec!["https://a.example", "https://b.example"]);
        assert!(Config::default().cors_origin_list().is_empty());
    }
}
