/// Engine configuration
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix; keys use `__` as separator
/// (e.g. `TUNEBRIDGE__POLL_INTERVAL_MS`).
pub const ENV_PREFIX: &str = "TUNEBRIDGE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Transfer server API base, e.g. `https://tunebridge.example.com/api`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Grace delay before a successful job leaves the active set
    #[serde(default = "default_retire_delay_ms")]
    pub retire_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            poll_interval_ms: default_poll_interval_ms(),
            retire_delay_ms: default_retire_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl EngineConfig {
    /// Load `tunebridge.toml` (if present) overlaid by environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(Some(Path::new("tunebridge.toml")))
    }

    /// Load from an optional TOML file overlaid by environment variables
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::build(path, environment())
    }

    fn build(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path.filter(|p| p.exists()) {
            settings = settings.add_source(config::File::from(path));
        }

        let config: Self = settings.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(EngineError::Config(format!(
                "api_url must start with http:// or https:// (got {:?})",
                self.api_url
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(EngineError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(EngineError::Config(
                "request and connect timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retire_delay(&self) -> Duration {
        Duration::from_millis(self.retire_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

// Default value functions
fn default_api_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_retire_delay_ms() -> u64 {
    4_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
